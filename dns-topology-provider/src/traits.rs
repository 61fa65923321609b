use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    ChangeRequest, ChangeStatus, ComputeInstance, DnsRecordType, DnsZone, Listener, LoadBalancer,
    RecordPage, RecordQueryParams, TargetGroup, TargetHealthEntry,
};

/// Raw API error (internal use)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (e.g. `Throttling`, `NoSuchHostedZone`)
    pub code: Option<String>,
    /// Original error message
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Context for error mapping (internal use)
///
/// Names the resource a request addressed so not-found errors can say which one.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Hosted zone id or name
    pub zone: Option<String>,
    /// Kind of resource addressed (`"load balancer"`, `"change"`, ...)
    pub resource_type: Option<&'static str>,
    /// Identifier of the addressed resource
    pub resource_id: Option<String>,
}

impl ErrorContext {
    pub fn zone(zone: impl Into<String>) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Default::default()
        }
    }

    pub fn resource(resource_type: &'static str, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type),
            resource_id: Some(resource_id.into()),
            ..Default::default()
        }
    }
}

/// Provider error mapping trait (internal use)
///
/// Each provider maps its raw API error codes onto [`ProviderError`].
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Read/write access to the DNS, load-balancing and compute control planes.
///
/// Lookups that find nothing return `Ok(None)` or an empty `Vec`; errors are
/// reserved for transport, permission, throttling and validation failures.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &'static str;

    /// List hosted zones whose name sorts at or after `domain`.
    ///
    /// Callers pick the exact match themselves; the list may contain neighbours.
    async fn list_zones_by_name(&self, domain: &str) -> Result<Vec<DnsZone>>;

    /// Fetch one page of record sets in a zone.
    async fn list_records(&self, zone_id: &str, params: &RecordQueryParams) -> Result<RecordPage>;

    /// Resolve a hostname to its current addresses.
    async fn resolve_host(&self, hostname: &str) -> Result<Vec<IpAddr>>;

    /// Find the load balancer whose DNS name equals `dns_name` (case-insensitive).
    async fn find_load_balancer_by_dns_name(&self, dns_name: &str)
    -> Result<Option<LoadBalancer>>;

    /// List target groups attached to a load balancer.
    async fn list_target_groups(&self, load_balancer_arn: &str) -> Result<Vec<TargetGroup>>;

    /// List registered targets and their health for a target group.
    async fn describe_target_health(&self, target_group_arn: &str)
    -> Result<Vec<TargetHealthEntry>>;

    /// Look up a compute instance by id.
    async fn get_instance(&self, instance_id: &str) -> Result<Option<ComputeInstance>>;

    /// List listeners of a load balancer.
    async fn list_listeners(&self, load_balancer_arn: &str) -> Result<Vec<Listener>>;

    /// Current values of the record set with exactly this name and type.
    ///
    /// Values are returned in wire presentation form (TXT values keep their quotes).
    async fn lookup_record_values(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: DnsRecordType,
    ) -> Result<Option<Vec<String>>>;

    /// Submit a single-change batch to a zone.
    async fn submit_change(&self, zone_id: &str, change: &ChangeRequest) -> Result<ChangeStatus>;

    /// Fetch the propagation status of a submitted change.
    async fn get_change(&self, change_id: &str) -> Result<ChangeStatus>;
}
