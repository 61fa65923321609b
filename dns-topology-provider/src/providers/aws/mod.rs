//! AWS provider: Route 53, Elastic Load Balancing v2 and EC2

mod error;
mod http;
mod provider;
mod sign;
/// Route 53 / ELBv2 / EC2 XML response types.
pub(crate) mod types;

use hickory_resolver::TokioResolver;
use reqwest::Client;

use crate::dns::build_system_resolver;
use crate::error::Result;
use crate::providers::common::create_http_client;
use crate::types::AwsCredentials;

/// Route 53 is a global service signed against `us-east-1`.
pub(crate) const ROUTE53_HOST: &str = "route53.amazonaws.com";
pub(crate) const ROUTE53_SIGNING_REGION: &str = "us-east-1";
pub(crate) const ROUTE53_API_VERSION: &str = "2013-04-01";
pub(crate) const ROUTE53_XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";
pub(crate) const ELB_API_VERSION: &str = "2015-12-01";
pub(crate) const EC2_API_VERSION: &str = "2016-11-15";
/// Largest page `DescribeLoadBalancers` accepts.
pub(crate) const ELB_MAX_PAGE_SIZE: u32 = 400;

/// AWS implementation of [`ResourceClient`](crate::ResourceClient).
///
/// Requests are signed with Signature Version 4 using static credentials.
/// Route 53 calls go to the global endpoint; ELBv2 and EC2 calls go to the
/// configured region.
///
/// # Construction
///
/// ```rust,no_run
/// use dns_topology_provider::{AwsCredentials, AwsProvider};
///
/// # fn main() -> dns_topology_provider::Result<()> {
/// let provider = AwsProvider::builder(
///     AwsCredentials {
///         access_key_id: "AKIDEXAMPLE".to_string(),
///         secret_access_key: "secret".to_string(),
///         session_token: None,
///     },
///     "us-east-1",
/// )
/// .max_retries(3)
/// .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AwsProvider {
    pub(crate) client: Client,
    pub(crate) credentials: AwsCredentials,
    pub(crate) region: String,
    pub(crate) max_retries: u32,
    pub(crate) resolver: TokioResolver,
}

/// Builder for [`AwsProvider`] with configurable retry behavior.
pub struct AwsProviderBuilder {
    credentials: AwsCredentials,
    region: String,
    max_retries: u32,
}

impl AwsProviderBuilder {
    fn new(credentials: AwsCredentials, region: String) -> Self {
        Self {
            credentials,
            region,
            max_retries: 2,
        }
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`AwsProvider`] instance.
    pub fn build(self) -> Result<AwsProvider> {
        Ok(AwsProvider {
            client: create_http_client("aws")?,
            credentials: self.credentials,
            region: self.region,
            max_retries: self.max_retries,
            resolver: build_system_resolver(),
        })
    }
}

impl AwsProvider {
    /// Creates a provider with default settings (2 retries).
    pub fn new(credentials: AwsCredentials, region: impl Into<String>) -> Result<Self> {
        Self::builder(credentials, region).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(credentials: AwsCredentials, region: impl Into<String>) -> AwsProviderBuilder {
        AwsProviderBuilder::new(credentials, region.into())
    }

    /// Region used for ELBv2 and EC2 calls.
    pub fn region(&self) -> &str {
        &self.region
    }
}
