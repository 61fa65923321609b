//! Generic HTTP client tools
//!
//! Each provider signs and builds its own `RequestBuilder`; this module sends
//! it, logs the exchange and retries transient failures.
//!
//! The transport layer only knows HTTP 429 and 502-504. Every other non-2xx
//! response is classified by the caller's check, since AWS reports throttling
//! as `400` with an error document.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns response text
    ///
    /// Unified processing: sending requests, logging, error handling
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (including URL, headers, body, etc.)
    /// * `provider_name` - Provider name (for logging)
    /// * `method_name` - request method name (such as "GET", "POST", used for logs)
    /// * `url_or_action` - URL or Action name (for logging)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - returns status code and response text on success
    /// * `Err(ProviderError::NetworkError)` - Network error
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        // Send request
        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        // Returns RateLimited error for HTTP 429
        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        // Return NetworkError for 502/503/504 (can be retried)
        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {body}"),
            });
        }

        // Read response body
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse an XML response body
    ///
    /// The root element name is ignored; fields map by element name.
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ProviderError::ParseError)` - parsing failed
    pub fn parse_xml<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        quick_xml::de::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] XML parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Send a request, then run `check` over the status and body.
    ///
    /// `check` turns provider error documents into [`ProviderError`]s, so the
    /// classification happens before the retry decision.
    async fn execute_checked<F>(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
        check: &F,
    ) -> Result<String, ProviderError>
    where
        F: Fn(u16, &str) -> Result<(), ProviderError>,
    {
        let (status, response_text) =
            Self::execute_request(request_builder, provider_name, method_name, url_or_action)
                .await?;
        check(status, &response_text)?;
        Ok(response_text)
    }

    /// Performs an HTTP request with retries and returns the response text
    ///
    /// # Arguments
    /// * `request_builder` - signed request
    /// * `provider_name` - Provider name (for logging)
    /// * `method_name` - request method name (for logging)
    /// * `url_or_action` - URL or Action name (for logging)
    /// * `max_retries` - Maximum number of retries (0 means no retries)
    /// * `check` - maps a `(status, body)` pair to `Ok(())` or the provider's error
    ///
    /// # Retry strategy
    /// - Retries errors where [`ProviderError::is_retryable`] holds, whether they come
    ///   from the transport (timeouts, 429, 502-504) or from `check` (e.g. a `400`
    ///   carrying a `Throttling` error code)
    /// - Exponential backoff: 100ms, 200ms, 400ms, 800ms, ... (maximum 10 seconds)
    /// - `Retry-After` from a throttled response wins over the backoff (capped at 30s)
    pub async fn execute_request_with_retry<F>(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
        max_retries: u32,
        check: F,
    ) -> Result<String, ProviderError>
    where
        F: Fn(u16, &str) -> Result<(), ProviderError>,
    {
        let mut attempt = 0;

        loop {
            // RequestBuilder can only be sent once
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{provider_name}] Cannot clone request, disabling retry");
                return Self::execute_checked(
                    request_builder,
                    provider_name,
                    method_name,
                    url_or_action,
                    &check,
                )
                .await;
            };

            match Self::execute_checked(req, provider_name, method_name, url_or_action, &check)
                .await
            {
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        url_or_action,
                        attempt + 1,
                        max_retries + 1,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Calculate retry delay
///
/// Use this value (capped at 30s) when the error is `RateLimited` and contains `retry_after`.
/// Otherwise exponential backoff is used.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Calculate exponential backoff delay
///
/// Backoff strategy: 100ms, 200ms, 400ms, 800ms, 1.6s, ...
/// Maximum delay limit is 10 seconds
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000); // Maximum 10 seconds
    Duration::from_millis(delay_ms)
}
