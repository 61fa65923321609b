//! Signed HTTP calls against Route 53 (REST-XML) and ELBv2 / EC2 (Query)

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::{sanitize_authorization, truncate_for_log};

use super::sign::{CanonicalParts, SigningScope, sign_v4};
use super::types::ErrorEnvelope;
use super::{
    AwsProvider, EC2_API_VERSION, ELB_API_VERSION, ROUTE53_HOST, ROUTE53_SIGNING_REGION,
};

/// Services reachable through the Query protocol.
#[derive(Debug, Clone, Copy)]
pub(crate) enum QueryService {
    Elb,
    Ec2,
}

impl QueryService {
    fn signing_name(self) -> &'static str {
        match self {
            Self::Elb => "elasticloadbalancing",
            Self::Ec2 => "ec2",
        }
    }

    fn api_version(self) -> &'static str {
        match self {
            Self::Elb => ELB_API_VERSION,
            Self::Ec2 => EC2_API_VERSION,
        }
    }

    fn host(self, region: &str) -> String {
        format!("{}.{region}.amazonaws.com", self.signing_name())
    }
}

/// One outgoing request before signing.
struct Outgoing<'a> {
    method: &'a str,
    host: &'a str,
    region: &'a str,
    service: &'a str,
    path: &'a str,
    query: String,
    content_type: Option<&'a str>,
    body: String,
    /// What shows up in logs instead of the full URL.
    label: &'a str,
}

/// Encode `(key, value)` pairs as `k=v&k=v` with RFC 3986 escaping.
pub(crate) fn encode_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k.as_ref()),
                urlencoding::encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

impl AwsProvider {
    // ==================== Helpers ====================

    /// Turn a non-2xx response into a mapped error
    ///
    /// Runs inside the retry loop, so a throttling code in the body is retried.
    pub(crate) fn handle_response_error(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        if let Ok(envelope) = quick_xml::de::from_str::<ErrorEnvelope>(response_text)
            && let Some((code, message)) = envelope.into_code_and_message()
        {
            let raw = match code {
                Some(code) => RawApiError::with_code(code, message),
                None => RawApiError::new(message),
            };
            return Err(self.map_error(raw, ctx));
        }

        if status >= 500 {
            return Err(ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(response_text)),
            });
        }

        Err(self.unknown_error(RawApiError::new(format!("HTTP {status}: {response_text}"))))
    }

    /// Sign, send (with retries) and check one request, returning the body
    async fn send(&self, req: Outgoing<'_>, ctx: ErrorContext) -> Result<String> {
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("Host".to_string(), req.host.to_string()),
            ("X-Amz-Date".to_string(), amz_date.clone()),
        ];
        if let Some(content_type) = req.content_type {
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        if let Some(token) = &self.credentials.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }

        let authorization = sign_v4(
            &self.credentials,
            &SigningScope {
                region: req.region,
                service: req.service,
                amz_date: &amz_date,
            },
            &CanonicalParts {
                method: req.method,
                uri: req.path,
                query: &req.query,
                headers: &headers,
                payload: &req.body,
            },
        );
        log::trace!("Authorization: {}", sanitize_authorization(&authorization));

        let url = if req.query.is_empty() {
            format!("https://{}{}", req.host, req.path)
        } else {
            format!("https://{}{}?{}", req.host, req.path, req.query)
        };

        let mut request = match req.method {
            "POST" => self.client.post(&url).body(req.body),
            _ => self.client.get(&url),
        };
        // reqwest sets Host itself from the URL
        for (name, value) in headers.iter().filter(|(name, _)| name != "Host") {
            request = request.header(name.as_str(), value.as_str());
        }
        request = request.header("Authorization", authorization);

        HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            req.method,
            req.label,
            self.max_retries,
            |status, body| self.handle_response_error(status, body, ctx.clone()),
        )
        .await
    }

    // ==================== Route 53 ====================

    /// GET a Route 53 resource
    pub(crate) async fn route53_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        ctx: ErrorContext,
    ) -> Result<T> {
        let body = self
            .send(
                Outgoing {
                    method: "GET",
                    host: ROUTE53_HOST,
                    region: ROUTE53_SIGNING_REGION,
                    service: "route53",
                    path,
                    query: encode_pairs(query),
                    content_type: None,
                    body: String::new(),
                    label: path,
                },
                ctx,
            )
            .await?;
        HttpUtils::parse_xml(&body, self.provider_name())
    }

    /// POST an XML document to a Route 53 resource
    pub(crate) async fn route53_post<T: DeserializeOwned>(
        &self,
        path: &str,
        xml: String,
        ctx: ErrorContext,
    ) -> Result<T> {
        log::debug!("[{}] Request Body: {xml}", self.provider_name());
        let body = self
            .send(
                Outgoing {
                    method: "POST",
                    host: ROUTE53_HOST,
                    region: ROUTE53_SIGNING_REGION,
                    service: "route53",
                    path,
                    query: String::new(),
                    content_type: Some("text/xml"),
                    body: xml,
                    label: path,
                },
                ctx,
            )
            .await?;
        HttpUtils::parse_xml(&body, self.provider_name())
    }

    // ==================== Query API (ELBv2 / EC2) ====================

    /// Call a Query API action in the provider's region
    pub(crate) async fn query_api<T: DeserializeOwned>(
        &self,
        service: QueryService,
        action: &str,
        params: &[(String, String)],
        ctx: ErrorContext,
    ) -> Result<T> {
        let mut form: Vec<(&str, &str)> = vec![("Action", action), ("Version", service.api_version())];
        form.extend(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let host = service.host(&self.region);
        let body = self
            .send(
                Outgoing {
                    method: "POST",
                    host: &host,
                    region: &self.region,
                    service: service.signing_name(),
                    path: "/",
                    query: String::new(),
                    content_type: Some("application/x-www-form-urlencoded; charset=utf-8"),
                    body: encode_pairs(&form),
                    label: action,
                },
                ctx,
            )
            .await?;
        HttpUtils::parse_xml(&body, self.provider_name())
    }
}
