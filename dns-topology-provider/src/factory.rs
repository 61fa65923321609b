//! Provider factory functions.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::ResourceClient;
use crate::types::ProviderCredentials;

#[cfg(feature = "aws")]
use crate::providers::AwsProvider;

/// Creates a [`ResourceClient`] from the given credentials.
///
/// The concrete provider is selected by the [`ProviderCredentials`] variant.
/// The client is wrapped in `Arc<dyn ResourceClient>` so it can be shared
/// across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use dns_topology_provider::{create_client, AwsCredentials, ProviderCredentials};
///
/// let client = create_client(ProviderCredentials::Aws {
///     credentials: AwsCredentials {
///         access_key_id: "AKIDEXAMPLE".to_string(),
///         secret_access_key: "secret".to_string(),
///         session_token: None,
///     },
///     region: "eu-west-1".to_string(),
/// });
/// assert!(client.is_ok());
/// ```
pub fn create_client(credentials: ProviderCredentials) -> Result<Arc<dyn ResourceClient>> {
    match credentials {
        #[cfg(feature = "aws")]
        ProviderCredentials::Aws {
            credentials,
            region,
        } => {
            log::debug!(
                "Creating aws client for region {region} with key {}",
                crate::utils::log_sanitizer::mask_secret(&credentials.access_key_id)
            );
            Ok(Arc::new(AwsProvider::new(credentials, region)?))
        }
    }
}
