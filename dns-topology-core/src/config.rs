//! Resolver and reconciler settings
//!
//! Both structs deserialize from TOML tables; every field is optional and falls
//! back to [`Default`]. Durations are written in (fractional) seconds.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dns_topology_provider::{DnsRecordType, MAX_RECORD_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Suffix shared by every ELB DNS name.
pub const DEFAULT_LOAD_BALANCER_SUFFIX: &str = ".elb.amazonaws.com";

/// Which target group to use when a load balancer has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetGroupTieBreak {
    /// First group in API order.
    #[default]
    First,
    /// Group whose name sorts lowest.
    LowestName,
    /// Emit no row for the record.
    Skip,
}

impl TargetGroupTieBreak {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::LowestName => "lowest-name",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for TargetGroupTieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetGroupTieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "lowest-name" => Ok(Self::LowestName),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown tie-break '{other}' (expected first, lowest-name or skip)"
            )),
        }
    }
}

/// Settings for [`TopologyResolver`](crate::TopologyResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Record sets per `list_records` call (1..=300).
    pub page_size: u32,
    /// Stop paging a zone after this many record sets; `None` reads the whole zone.
    pub max_records_per_zone: Option<usize>,
    /// Record types considered for alias resolution.
    pub record_types: Vec<DnsRecordType>,
    /// Target host suffixes that identify a load balancer.
    pub load_balancer_suffixes: Vec<String>,
    /// Policy for load balancers with several target groups.
    pub tie_break: TargetGroupTieBreak,
    /// Domains resolved at once.
    pub domain_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_RECORD_PAGE_SIZE,
            max_records_per_zone: None,
            record_types: vec![DnsRecordType::A, DnsRecordType::Cname],
            load_balancer_suffixes: vec![DEFAULT_LOAD_BALANCER_SUFFIX.to_string()],
            tie_break: TargetGroupTieBreak::First,
            domain_concurrency: 1,
        }
    }
}

/// Settings for [`RecordReconciler`](crate::RecordReconciler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerConfig {
    /// TTL of written TXT records, in seconds.
    pub ttl: u32,
    /// Delay before each status poll.
    #[serde(rename = "poll_interval_secs", with = "secs")]
    pub poll_interval: Duration,
    /// Give up after this many polls.
    pub max_poll_attempts: Option<u32>,
    /// Give up when polling takes longer than this.
    #[serde(rename = "timeout_secs", with = "opt_secs")]
    pub timeout: Option<Duration>,
    /// Records reconciled at once by `reconcile_many`.
    pub concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            ttl: 60,
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: None,
            timeout: Some(Duration::from_secs(600)),
            concurrency: 1,
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        d: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.page_size, 300);
        assert_eq!(config.max_records_per_zone, None);
        assert_eq!(
            config.record_types,
            vec![DnsRecordType::A, DnsRecordType::Cname]
        );
        assert_eq!(config.tie_break, TargetGroupTieBreak::First);
    }

    #[test]
    fn reconciler_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.ttl, 60);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.max_poll_attempts, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ReconcilerConfig =
            serde_json::from_str(r#"{"poll_interval_secs": 0.5, "max_poll_attempts": 10}"#)
                .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_poll_attempts, Some(10));
        assert_eq!(config.ttl, 60);

        let resolver: ResolverConfig =
            serde_json::from_str(r#"{"tie_break": "lowest-name", "record_types": ["A"]}"#)
                .unwrap();
        assert_eq!(resolver.tie_break, TargetGroupTieBreak::LowestName);
        assert_eq!(resolver.record_types, vec![DnsRecordType::A]);
        assert_eq!(resolver.domain_concurrency, 1);
    }

    #[test]
    fn negative_duration_rejected() {
        let result = serde_json::from_str::<ReconcilerConfig>(r#"{"poll_interval_secs": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn tie_break_from_str() {
        assert_eq!("skip".parse(), Ok(TargetGroupTieBreak::Skip));
        assert!("random".parse::<TargetGroupTieBreak>().is_err());
        assert_eq!(TargetGroupTieBreak::LowestName.to_string(), "lowest-name");
    }
}
