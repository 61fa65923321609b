//! Hostname resolution shared by providers.

use std::net::IpAddr;

use hickory_resolver::{
    TokioResolver,
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
};

use crate::error::{ProviderError, Result};

/// Build a resolver from the host system DNS configuration.
///
/// Falls back to Hickory's default upstream set when the system configuration
/// cannot be read.
pub(crate) fn build_system_resolver() -> TokioResolver {
    match TokioResolver::builder_tokio() {
        Ok(builder) => builder.build(),
        Err(e) => {
            log::warn!("Failed to load system DNS configuration, falling back to defaults: {e}");
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
            .with_options(ResolverOpts::default())
            .build()
        }
    }
}

/// Resolve `hostname` to its A/AAAA addresses.
///
/// The result keeps resolver order with duplicates removed.
pub(crate) async fn lookup_host(
    resolver: &TokioResolver,
    provider: &str,
    hostname: &str,
) -> Result<Vec<IpAddr>> {
    let lookup = resolver
        .lookup_ip(hostname)
        .await
        .map_err(|e| ProviderError::HostResolution {
            provider: provider.to_string(),
            host: hostname.to_string(),
            detail: e.to_string(),
        })?;

    let mut addresses: Vec<IpAddr> = Vec::new();
    for ip in lookup.iter() {
        if !addresses.contains(&ip) {
            addresses.push(ip);
        }
    }
    log::debug!("[{provider}] {hostname} -> {addresses:?}");
    Ok(addresses)
}
