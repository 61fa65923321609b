//! Business logic service layer

mod record_reconciler;
mod topology_resolver;

pub use record_reconciler::{LoggingObserver, ReconcileObserver, RecordReconciler};
pub use topology_resolver::TopologyResolver;

use crate::txt::unescape_name;
use crate::types::DnsZone;

/// Lowercase a DNS name and give it exactly one trailing dot.
pub(crate) fn fqdn(name: &str) -> String {
    format!("{}.", name.trim().trim_end_matches('.').to_ascii_lowercase())
}

/// Strip the trailing dot and decode octal escapes for display.
pub(crate) fn display_name(name: &str) -> String {
    unescape_name(name.trim_end_matches('.'))
}

/// The zone named exactly `wanted` (already an [`fqdn`]).
///
/// A public zone wins over a private zone of the same name.
pub(crate) fn select_zone(zones: Vec<DnsZone>, wanted: &str) -> Option<DnsZone> {
    let mut matching: Vec<DnsZone> = zones
        .into_iter()
        .filter(|z| fqdn(&z.name) == wanted)
        .collect();
    if matching.len() > 1 {
        log::warn!(
            "{} hosted zones named {wanted}, preferring the public one",
            matching.len()
        );
    }
    let index = matching.iter().position(|z| !z.private_zone).unwrap_or(0);
    (index < matching.len()).then(|| matching.swap_remove(index))
}
