//! Type definitions

mod reconcile;
mod topology;

pub use reconcile::{Outcome, ReconcileState};
pub use topology::{NOT_AVAILABLE, ResolveReport, SkipReason, SkippedRecord, WebsiteRow};

// Re-export provider types that appear in core signatures
pub use dns_topology_provider::{
    ChangeAction, ChangeState, ChangeStatus, DnsRecord, DnsRecordType, DnsZone, LoadBalancerKind,
    TargetHealthState,
};
