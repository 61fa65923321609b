//! AWS error mapping
//!
//! Route 53, ELBv2 and EC2 share the Query-style error body, so one table
//! covers all three.
//!
//! References:
//! - <https://docs.aws.amazon.com/Route53/latest/APIReference/CommonErrors.html>
//! - <https://docs.aws.amazon.com/elasticloadbalancing/latest/APIReference/CommonErrors.html>
//! - <https://docs.aws.amazon.com/AWSEC2/latest/APIReference/errors-overview.html>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::AwsProvider;

impl ProviderErrorMapper for AwsProvider {
    fn provider_name(&self) -> &'static str {
        "aws"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        map_aws_error(self.provider_name(), raw, context)
    }
}

pub(crate) fn map_aws_error(
    provider: &'static str,
    raw: RawApiError,
    context: ErrorContext,
) -> ProviderError {
    match raw.code.as_deref() {
        // ============ Throttling ============
        Some(
            "Throttling"
            | "ThrottlingException"
            | "RequestLimitExceeded"
            | "RequestThrottled"
            | "TooManyRequestsException"
            | "PriorRequestNotComplete", // Route 53: previous change to the zone still running
        ) => ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after: None,
            raw_message: Some(raw.message),
        },

        // ============ Authentication ============
        Some(
            "SignatureDoesNotMatch"
            | "InvalidClientTokenId"
            | "IncompleteSignature"
            | "InvalidSignatureException"
            | "MissingAuthenticationToken"
            | "UnrecognizedClientException"
            | "AuthFailure"
            | "ExpiredToken"
            | "ExpiredTokenException"
            | "RequestExpired",
        ) => ProviderError::InvalidCredentials {
            provider: provider.to_string(),
            raw_message: Some(raw.message),
        },

        // ============ Authorization ============
        Some("AccessDenied" | "AccessDeniedException" | "UnauthorizedOperation" | "OptInRequired") => {
            ProviderError::PermissionDenied {
                provider: provider.to_string(),
                raw_message: Some(raw.message),
            }
        }

        // ============ Zone not found ============
        Some("NoSuchHostedZone" | "HostedZoneNotFound") => ProviderError::ZoneNotFound {
            provider: provider.to_string(),
            zone: context.zone.unwrap_or_default(),
            raw_message: Some(raw.message),
        },

        // ============ Other resources not found ============
        Some("NoSuchChange") => ProviderError::ResourceNotFound {
            provider: provider.to_string(),
            resource_type: "change".to_string(),
            resource_id: context.resource_id.unwrap_or_default(),
            raw_message: Some(raw.message),
        },
        // LoadBalancerNotFound, TargetGroupNotFound, ListenerNotFound, InvalidInstanceID.NotFound, ...
        Some(code) if code.ends_with("NotFound") => ProviderError::ResourceNotFound {
            provider: provider.to_string(),
            resource_type: context.resource_type.unwrap_or("resource").to_string(),
            resource_id: context.resource_id.unwrap_or_default(),
            raw_message: Some(raw.message),
        },

        // ============ Invalid parameters ============
        Some("InvalidChangeBatch") => ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "change_batch".to_string(),
            detail: raw.message,
        },
        Some("InvalidDomainName") => ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "domain_name".to_string(),
            detail: raw.message,
        },
        Some("InvalidPaginationToken") => ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "marker".to_string(),
            detail: raw.message,
        },
        Some("InvalidInstanceID.Malformed") => ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "instance_id".to_string(),
            detail: raw.message,
        },
        Some(
            "InvalidInput"
            | "ValidationError"
            | "InvalidParameterValue"
            | "InvalidParameterCombination"
            | "MissingParameter"
            | "MalformedQueryString"
            | "InvalidAction",
        ) => ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "input".to_string(),
            detail: raw.message,
        },

        // ============ Service side ============
        Some("InternalFailure" | "InternalError" | "ServiceUnavailable" | "Unavailable") => {
            ProviderError::NetworkError {
                provider: provider.to_string(),
                detail: raw.message,
            }
        }

        // ============ Fallback ============
        _ => ProviderError::Unknown {
            provider: provider.to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        },
    }
}
