//! AWS Signature Version 4

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::providers::common::hmac_sha256;
use crate::types::AwsCredentials;
use crate::utils::log_sanitizer::truncate_for_log;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Credential scope of a signature: `<date>/<region>/<service>/aws4_request`.
pub(crate) struct SigningScope<'a> {
    pub region: &'a str,
    pub service: &'a str,
    /// `YYYYMMDD'T'HHMMSS'Z'`, identical to the `X-Amz-Date` header.
    pub amz_date: &'a str,
}

impl SigningScope<'_> {
    fn date(&self) -> &str {
        self.amz_date.get(..8).unwrap_or(self.amz_date)
    }

    fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            self.date(),
            self.region,
            self.service
        )
    }
}

/// The parts of a request that go into the canonical request.
pub(crate) struct CanonicalParts<'a> {
    pub method: &'a str,
    /// Absolute path, already URI-encoded.
    pub uri: &'a str,
    /// `k=v` pairs joined by `&`, already URI-encoded, in any order.
    pub query: &'a str,
    /// Every header that is sent and signed.
    pub headers: &'a [(String, String)],
    pub payload: &'a str,
}

/// Build the `Authorization` header value for a request.
pub(crate) fn sign_v4(
    credentials: &AwsCredentials,
    scope: &SigningScope<'_>,
    parts: &CanonicalParts<'_>,
) -> String {
    // 1. Canonical query: sort by key, then value
    let mut params: Vec<(&str, &str)> = parts
        .query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split_once('=').unwrap_or((p, "")))
        .collect();
    params.sort_unstable();
    let canonical_query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    // 2. Canonical headers: lowercase names, trimmed values, sorted
    let mut headers: Vec<(String, &str)> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers = headers.iter().fold(String::new(), |mut acc, (k, v)| {
        let _ = writeln!(acc, "{k}:{v}");
        acc
    });
    let signed_headers = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // 3. Canonical request
    let hashed_payload = hex::encode(Sha256::digest(parts.payload.as_bytes()));
    let canonical_request = format!(
        "{}\n{}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}",
        parts.method, parts.uri
    );
    log::trace!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

    // 4. String to sign
    let credential_scope = scope.credential_scope();
    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{credential_scope}\n{}",
        scope.amz_date,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );
    log::trace!("StringToSign:\n{string_to_sign}");

    // 5. Derived signing key
    let secret = format!("AWS4{}", credentials.secret_access_key);
    let k_date = hmac_sha256(secret.as_bytes(), scope.date().as_bytes());
    let k_region = hmac_sha256(&k_date, scope.region.as_bytes());
    let k_service = hmac_sha256(&k_region, scope.service.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");

    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_credentials() -> AwsCredentials {
        AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
        }
    }

    fn vanilla_headers() -> Vec<(String, String)> {
        vec![
            ("Host".to_string(), "example.amazonaws.com".to_string()),
            ("X-Amz-Date".to_string(), "20150830T123600Z".to_string()),
        ]
    }

    fn scope() -> SigningScope<'static> {
        SigningScope {
            region: "us-east-1",
            service: "service",
            amz_date: "20150830T123600Z",
        }
    }

    fn sign(method: &str, query: &str, headers: &[(String, String)]) -> String {
        sign_v4(
            &example_credentials(),
            &scope(),
            &CanonicalParts {
                method,
                uri: "/",
                query,
                headers,
                payload: "",
            },
        )
    }

    fn extract_signature(auth: &str) -> Option<&str> {
        auth.split("Signature=").nth(1)
    }

    #[test]
    fn get_vanilla_test_vector() {
        let auth = sign("GET", "", &vanilla_headers());
        assert_eq!(
            auth,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
    }

    #[test]
    fn query_order_does_not_matter() {
        let headers = vanilla_headers();
        let a = sign("GET", "Param2=value2&Param1=value1", &headers);
        let b = sign("GET", "Param1=value1&Param2=value2", &headers);
        assert_eq!(extract_signature(&a), extract_signature(&b));
    }

    #[test]
    fn query_sorted_by_key_not_by_pair() {
        // "name2=" sorts before "name=" bytewise; keys must still order name < name2.
        let headers = vanilla_headers();
        let a = sign("GET", "name2=x&name=y", &headers);
        let b = sign("GET", "name=y&name2=x", &headers);
        assert_eq!(extract_signature(&a), extract_signature(&b));
    }

    #[test]
    fn header_names_lowercased_and_sorted() {
        let headers = vec![
            ("X-Amz-Date".to_string(), "20150830T123600Z".to_string()),
            ("X-Amz-Security-Token".to_string(), "token".to_string()),
            ("Host".to_string(), "example.amazonaws.com".to_string()),
        ];
        let auth = sign("GET", "", &headers);
        assert!(
            auth.contains("SignedHeaders=host;x-amz-date;x-amz-security-token,"),
            "unexpected header list: {auth}"
        );
    }

    #[test]
    fn method_changes_signature() {
        let headers = vanilla_headers();
        let get = sign("GET", "", &headers);
        let post = sign("POST", "", &headers);
        assert_ne!(extract_signature(&get), extract_signature(&post));
    }

    #[test]
    fn header_values_are_trimmed() {
        let padded = vec![
            ("Host".to_string(), "  example.amazonaws.com ".to_string()),
            ("X-Amz-Date".to_string(), "20150830T123600Z".to_string()),
        ];
        assert_eq!(sign("GET", "", &padded), sign("GET", "", &vanilla_headers()));
    }
}
