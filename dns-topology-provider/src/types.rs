use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Pagination ============

/// Route 53 refuses `maxitems` above this value for record listings.
pub const MAX_RECORD_PAGE_SIZE: u32 = 300;

/// Position inside a zone's record listing.
///
/// Route 53 paginates record sets by `(name, type, set identifier)` rather than by
/// page number, so the cursor carries whatever the previous page handed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCursor {
    /// Name of the first record set on the next page.
    pub name: String,
    /// Type of the first record set on the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    /// Set identifier for weighted/latency/failover records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Query parameters for one page of a zone's records.
///
/// # Default
///
/// The default is the first page with the maximum page size (300).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQueryParams {
    /// Number of record sets per page.
    pub page_size: u32,
    /// Where to start; `None` means the beginning of the zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<RecordCursor>,
}

impl Default for RecordQueryParams {
    fn default() -> Self {
        Self {
            page_size: MAX_RECORD_PAGE_SIZE,
            cursor: None,
        }
    }
}

impl RecordQueryParams {
    /// Clamp `page_size` to `1..=max_page_size`.
    #[must_use]
    pub fn validated(&self, max_page_size: u32) -> Self {
        Self {
            page_size: self.page_size.clamp(1, max_page_size),
            cursor: self.cursor.clone(),
        }
    }

    /// Parameters for the page that follows `cursor`.
    #[must_use]
    pub fn next(&self, cursor: RecordCursor) -> Self {
        Self {
            page_size: self.page_size,
            cursor: Some(cursor),
        }
    }
}

/// One page of DNS records plus the cursor for the next page, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage {
    /// Records on this page, in the order the API returned them.
    pub items: Vec<DnsRecord>,
    /// Cursor for the next page; `None` when the listing is complete.
    pub next: Option<RecordCursor>,
}

impl RecordPage {
    /// Whether there are more pages after this one.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

// ============ DNS Types ============

/// A hosted DNS zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsZone {
    /// Zone identifier without the `/hostedzone/` prefix (e.g. `"Z0123456789"`).
    pub id: String,
    /// Zone name exactly as served, including the trailing root dot.
    pub name: String,
    /// Whether this is a private (VPC-scoped) zone.
    pub private_zone: bool,
    /// Number of record sets in the zone, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
}

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Start of authority record.
    Soa,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
    /// Pointer record.
    Ptr,
    /// Any type this crate does not model.
    Other,
}

impl DnsRecordType {
    /// Wire name of the type, as used in API requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Soa => "SOA",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Ptr => "PTR",
            Self::Other => "OTHER",
        }
    }

    /// Parse a wire type name; unknown names map to [`DnsRecordType::Other`].
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            "NS" => Self::Ns,
            "SOA" => Self::Soa,
            "SRV" => Self::Srv,
            "CAA" => Self::Caa,
            "PTR" => Self::Ptr,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirection of a record toward another named resource instead of literal data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTarget {
    /// Hostname the alias points at, as served (may carry a `dualstack.` prefix and trailing dot).
    pub dns_name: String,
    /// Hosted zone of the target resource.
    pub hosted_zone_id: String,
    /// Whether the alias inherits the target's health.
    pub evaluate_target_health: bool,
}

/// A single DNS resource record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    /// Fully qualified name as served, including the trailing dot.
    pub name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// TTL in seconds; alias records have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Literal record values (empty for alias records).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Alias target, if the record is an alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
}

impl DnsRecord {
    /// The host this record redirects to.
    ///
    /// For alias records this is the alias DNS name; for plain CNAME records it is
    /// the first value. Other records point nowhere.
    pub fn target_host(&self) -> Option<&str> {
        if let Some(alias) = &self.alias_target {
            return Some(alias.dns_name.as_str());
        }
        if self.record_type == DnsRecordType::Cname {
            return self.values.first().map(String::as_str);
        }
        None
    }
}

// ============ Load Balancing Types ============

/// Flavour of an ELBv2 load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancerKind {
    /// Application (layer 7) load balancer.
    Application,
    /// Network (layer 4) load balancer.
    Network,
    /// Gateway load balancer.
    Gateway,
    /// Anything else the API reports.
    Unknown,
}

impl LoadBalancerKind {
    /// Parse the API's `Type` field.
    pub fn parse(value: &str) -> Self {
        match value {
            "application" => Self::Application,
            "network" => Self::Network,
            "gateway" => Self::Gateway,
            _ => Self::Unknown,
        }
    }

    /// Lowercase display name, matching the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Network => "network",
            Self::Gateway => "gateway",
            Self::Unknown => "unknown",
        }
    }
}

/// A load balancer fronting traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    /// Load balancer ARN.
    pub arn: String,
    /// Load balancer name.
    pub name: String,
    /// Public DNS name assigned by the cloud provider.
    pub dns_name: String,
    /// `internet-facing` or `internal`.
    pub scheme: String,
    /// Load balancer flavour.
    pub kind: LoadBalancerKind,
    /// Hosted zone that alias records to this balancer must reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_hosted_zone_id: Option<String>,
    /// Provisioning state (`active`, `provisioning`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A routing target group attached to a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    /// Target group ARN.
    pub arn: String,
    /// Target group name.
    pub name: String,
    /// Protocol (`HTTP`, `HTTPS`, `TCP`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Default port for registered targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// `instance`, `ip`, `lambda` or `alb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

/// Health of one registered target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetHealthState {
    /// Passing health checks.
    Healthy,
    /// Failing health checks.
    Unhealthy,
    /// Registration in progress.
    Initial,
    /// Not in use by any listener.
    Unused,
    /// Deregistration in progress.
    Draining,
    /// Health checks disabled.
    Unavailable,
    /// Any other state.
    Unknown,
}

impl TargetHealthState {
    /// Parse the API's `TargetHealth.State` field.
    pub fn parse(value: &str) -> Self {
        match value {
            "healthy" => Self::Healthy,
            "unhealthy" => Self::Unhealthy,
            "initial" => Self::Initial,
            "unused" => Self::Unused,
            "draining" => Self::Draining,
            "unavailable" => Self::Unavailable,
            _ => Self::Unknown,
        }
    }

    /// Lowercase display name, matching the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Initial => "initial",
            Self::Unused => "unused",
            Self::Draining => "draining",
            Self::Unavailable => "unavailable",
            Self::Unknown => "unknown",
        }
    }
}

/// One registered target in a target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetHealthEntry {
    /// Instance id, IP address or Lambda ARN depending on the target type.
    pub target_id: String,
    /// Port the target receives traffic on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Current health.
    pub health_state: TargetHealthState,
    /// Reason code accompanying a non-healthy state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A listener on a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Listener ARN.
    pub arn: String,
    /// Listening port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Listener protocol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// TLS security policy name, for HTTPS/TLS listeners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_policy: Option<String>,
}

// ============ Compute Types ============

/// Backing compute instance of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeInstance {
    /// Instance id (e.g. `"i-0abc"`).
    pub instance_id: String,
    /// Value of the `Name` tag, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_tag: Option<String>,
    /// Primary private IPv4 address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_address: Option<String>,
    /// Lifecycle state (`running`, `stopped`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Instance type (e.g. `"t3.micro"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

// ============ Change Types ============

/// Action of a DNS record mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create a record that must not exist yet.
    Create,
    /// Create or overwrite.
    Upsert,
}

impl ChangeAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Upsert => "UPSERT",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired DNS record mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    /// Change action.
    pub action: ChangeAction,
    /// Fully qualified record name.
    pub record_name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// Record value in wire presentation form (TXT values already quoted).
    pub value: String,
    /// TTL in seconds.
    pub ttl: u32,
    /// Audit comment attached to the change batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Propagation state of a submitted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeState {
    /// Not yet served by all authoritative name servers.
    Pending,
    /// Served by all authoritative name servers.
    Insync,
}

impl ChangeState {
    /// Parse the API's `Status` field. Anything but `INSYNC` is still pending.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("INSYNC") {
            Self::Insync
        } else {
            Self::Pending
        }
    }
}

/// Asynchronous propagation status of a submitted change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatus {
    /// Change id without the `/change/` prefix.
    pub id: String,
    /// Current state.
    pub state: ChangeState,
    /// When the change was accepted.
    #[serde(
        default,
        with = "crate::utils::datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ChangeStatus {
    /// Whether the change reached its terminal state.
    pub fn is_insync(&self) -> bool {
        self.state == ChangeState::Insync
    }
}

// ============ Credentials ============

/// Static credentials for signing requests.
///
/// Acquiring them (profiles, SSO, instance metadata) is out of scope; callers pass
/// whatever they already hold.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field(
                "access_key_id",
                &crate::utils::log_sanitizer::mask_secret(&self.access_key_id),
            )
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Provider selection plus the credentials it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderCredentials {
    /// Amazon Web Services. Requires feature `aws`.
    #[cfg(feature = "aws")]
    Aws {
        /// Signing credentials.
        credentials: AwsCredentials,
        /// Region for ELBv2 and EC2 calls (Route 53 is global).
        region: String,
    },
}
