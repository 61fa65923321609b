//! # dns-topology-provider
//!
//! Resource client abstraction over the DNS, load-balancing and compute control
//! planes that back a public website.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Services | Auth Method |
//! |----------|-------------|----------|-------------|
//! | [AWS](https://aws.amazon.com/) | `aws` | Route 53, ELBv2, EC2 | Signature Version 4 |
//!
//! ## Feature Flags
//!
//! - **`aws`** *(default)*: Enable the AWS provider.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation and static binaries.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dns_topology_provider::{
//!     create_client, AwsCredentials, ProviderCredentials, RecordQueryParams,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_client(ProviderCredentials::Aws {
//!         credentials: AwsCredentials {
//!             access_key_id: "AKIDEXAMPLE".to_string(),
//!             secret_access_key: "secret".to_string(),
//!             session_token: None,
//!         },
//!         region: "us-east-1".to_string(),
//!     })?;
//!
//!     for zone in client.list_zones_by_name("example.com").await? {
//!         let page = client
//!             .list_records(&zone.id, &RecordQueryParams::default())
//!             .await?;
//!         for record in &page.items {
//!             println!("{} {} -> {:?}", record.name, record.record_type, record.target_host());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ProviderError>`](ProviderError). Lookups
//! that find nothing return `Ok(None)` or an empty `Vec` instead of an error.
//!
//! - [`ProviderError::InvalidCredentials`]: signature or key rejected
//! - [`ProviderError::ZoneNotFound`]: the addressed hosted zone does not exist
//! - [`ProviderError::RateLimited`]: API throttling (retryable)
//! - [`ProviderError::NetworkError`]: network connectivity issue (retryable)
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are automatically
//! retried with exponential backoff. See [`ProviderError`] for the full list.

mod dns;
mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

#[cfg(test)]
mod test_utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_client;

// Re-export the client trait only (internal traits are not exported)
pub use traits::ResourceClient;

// Re-export types
pub use types::{
    AliasTarget, AwsCredentials, ChangeAction, ChangeRequest, ChangeState, ChangeStatus,
    ComputeInstance, DnsRecord, DnsRecordType, DnsZone, Listener, LoadBalancer,
    LoadBalancerKind, MAX_RECORD_PAGE_SIZE, ProviderCredentials, RecordCursor, RecordPage,
    RecordQueryParams, TargetGroup, TargetHealthEntry, TargetHealthState,
};

// Re-export utils modules
pub use utils::{datetime, log_sanitizer};

// Re-export concrete providers (behind feature flags)
#[cfg(feature = "aws")]
pub use providers::{AwsProvider, AwsProviderBuilder};
