//! Website topology rows and skip bookkeeping

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use dns_topology_provider::{DnsRecordType, LoadBalancerKind, TargetHealthState};

/// Placeholder for values that could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

/// One public hostname joined to the infrastructure serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteRow {
    /// Record name without the trailing dot
    pub hostname: String,
    /// Zone the record lives in, without the trailing dot
    pub zone_name: String,
    pub record_type: DnsRecordType,
    pub lb_name: String,
    /// Normalized load balancer DNS name
    pub lb_dns_name: String,
    /// Addresses the load balancer name resolved to; empty when resolution failed
    pub lb_public_addresses: Vec<IpAddr>,
    pub lb_scheme: String,
    pub lb_kind: LoadBalancerKind,
    /// Target group the row was built from
    pub target_group_name: String,
    /// Number of target groups attached to the load balancer
    pub target_group_count: usize,
    /// First TLS policy among the listeners, or `N/A`
    pub security_policy: String,
    /// `<name> (<private ip>)` of the first target, or a placeholder
    pub instance_summary: String,
    pub target_ports: Vec<u16>,
    pub target_health: Vec<TargetHealthState>,
}

impl WebsiteRow {
    /// Public addresses joined with `", "`, or `N/A` when there are none.
    pub fn addresses_display(&self) -> String {
        if self.lb_public_addresses.is_empty() {
            return NOT_AVAILABLE.to_string();
        }
        self.lb_public_addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether more than one target group competed for this row.
    pub fn has_ambiguous_target_group(&self) -> bool {
        self.target_group_count > 1
    }
}

/// Why a domain or record produced no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkipReason {
    /// No hosted zone with exactly the domain's name
    ZoneNotFound,
    /// The record does not point at a load balancer
    NotLoadBalancerTarget { target: Option<String> },
    /// No load balancer carries the record's target name
    LoadBalancerNotFound { dns_name: String },
    /// The load balancer has no target groups
    NoTargetGroups,
    /// Several target groups and the tie-break policy is `skip`
    AmbiguousTargetGroups { count: usize },
    /// A lookup the row depends on failed
    LookupFailed { step: String, detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneNotFound => write!(f, "hosted zone not found"),
            Self::NotLoadBalancerTarget { target: Some(t) } => {
                write!(f, "target {t} is not a load balancer")
            }
            Self::NotLoadBalancerTarget { target: None } => write!(f, "record has no alias target"),
            Self::LoadBalancerNotFound { dns_name } => {
                write!(f, "no load balancer named {dns_name}")
            }
            Self::NoTargetGroups => write!(f, "load balancer has no target groups"),
            Self::AmbiguousTargetGroups { count } => {
                write!(f, "load balancer has {count} target groups")
            }
            Self::LookupFailed { step, detail } => write!(f, "{step} failed: {detail}"),
        }
    }
}

/// A domain or record the resolver passed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub domain: String,
    /// `None` when the whole domain was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,
    pub reason: SkipReason,
}

impl SkippedRecord {
    pub(crate) fn domain(domain: &str, reason: SkipReason) -> Self {
        Self {
            domain: domain.to_string(),
            record_name: None,
            reason,
        }
    }

    pub(crate) fn record(domain: &str, record_name: &str, reason: SkipReason) -> Self {
        Self {
            domain: domain.to_string(),
            record_name: Some(record_name.to_string()),
            reason,
        }
    }
}

/// Everything one resolver run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    pub rows: Vec<WebsiteRow>,
    pub skipped: Vec<SkippedRecord>,
}

impl ResolveReport {
    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }

    /// Skips other than plain non-load-balancer records.
    pub fn notable_skips(&self) -> impl Iterator<Item = &SkippedRecord> {
        self.skipped
            .iter()
            .filter(|s| !matches!(s.reason, SkipReason::NotLoadBalancerTarget { .. }))
    }

    pub(crate) fn extend(&mut self, other: Self) {
        self.rows.extend(other.rows);
        self.skipped.extend(other.skipped);
    }
}
