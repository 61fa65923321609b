//! DNS Topology Core Library
//!
//! Two services over a [`ResourceClient`](dns_topology_provider::ResourceClient):
//! - [`TopologyResolver`] joins a domain's alias records to the load balancers,
//!   target groups and instances behind them
//! - [`RecordReconciler`] writes TXT records and waits until they are served
//!
//! Neither service keeps state between calls; everything is fetched per request.

pub mod config;
pub mod error;
pub mod services;
pub mod txt;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{ReconcilerConfig, ResolverConfig, TargetGroupTieBreak};
pub use error::{CoreError, CoreResult};
pub use services::{LoggingObserver, ReconcileObserver, RecordReconciler, TopologyResolver};
pub use types::{Outcome, ReconcileState, ResolveReport, SkipReason, SkippedRecord, WebsiteRow};

pub use tokio_util::sync::CancellationToken;
