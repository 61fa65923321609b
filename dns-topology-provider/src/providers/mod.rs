//! Provider implementations

/// Shared utilities used by provider implementations.
pub(crate) mod common;

#[cfg(feature = "aws")]
mod aws;

#[cfg(feature = "aws")]
pub use aws::{AwsProvider, AwsProviderBuilder};
