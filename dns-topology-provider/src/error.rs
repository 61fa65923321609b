use serde::{Deserialize, Serialize};

/// Unified error type for all resource client operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// "Not found" during a lookup is *not* an error: lookups return `Ok(None)` or an
/// empty `Vec`. [`ZoneNotFound`](Self::ZoneNotFound) and
/// [`ResourceNotFound`](Self::ResourceNotFound) only surface when an operation
/// addresses a resource by id that must exist (e.g. listing records of a deleted zone).
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues, 5xx responses
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API throttling
///
/// The built-in HTTP client automatically retries these with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (connection refused, 5xx response, etc.).
    ///
    /// This is a transient error and is automatically retried.
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provided credentials are invalid, expired, or the signature was rejected.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The credentials lack permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The API throttled the request.
    ///
    /// This is a transient error; the request should succeed after waiting.
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    ///
    /// This is a transient error and is automatically retried.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The addressed hosted zone does not exist.
    ZoneNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Zone id or name.
        zone: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The addressed resource (load balancer, target group, change, ...) does not exist.
    ResourceNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Kind of resource (`"load balancer"`, `"change"`, ...).
        resource_type: String,
        /// Identifier that was looked up.
        resource_id: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected (malformed change batch, bad id, ...).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Resolving a hostname to addresses failed.
    HostResolution {
        /// Provider that produced the error.
        provider: String,
        /// Hostname that was looked up.
        host: String,
        /// Resolver error details.
        detail: String,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// An unrecognized error from the provider API.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Whether this is expected behavior (bad input, missing resource, ...), used for log levels.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::ZoneNotFound { .. }
                | Self::ResourceNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::HostResolution { .. }
        )
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Network errors, timeouts and throttling are transient; authentication,
    /// validation and not-found errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Whether this error means the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ZoneNotFound { .. } | Self::ResourceNotFound { .. }
        )
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::ZoneNotFound {
                provider,
                zone,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Zone '{zone}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Zone '{zone}' not found")
                }
            }
            Self::ResourceNotFound {
                provider,
                resource_type,
                resource_id,
                ..
            } => {
                write!(f, "[{provider}] {resource_type} '{resource_id}' not found")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::HostResolution {
                provider,
                host,
                detail,
            } => {
                write!(f, "[{provider}] Failed to resolve '{host}': {detail}")
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_code,
                raw_message,
            } => {
                if let Some(code) = raw_code {
                    write!(f, "[{provider}] {code}: {raw_message}")
                } else {
                    write!(f, "[{provider}] {raw_message}")
                }
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
