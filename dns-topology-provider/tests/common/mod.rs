//! Shared helpers for the live integration tests

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use dns_topology_provider::{
    AwsCredentials, DnsZone, ProviderCredentials, ResourceClient, create_client,
};

/// Skip the test when any of the given environment variables is missing
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping test: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Assert that an `Option` is `Some` and unwrap it (failing the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert that a `Result` is `Ok` and unwrap it (failing the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Unique label for a throwaway TXT record
pub fn generate_test_record_name(domain: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}.{domain}", &uuid.to_string()[..8])
}

/// Live client plus the zone the tests may write to
pub struct TestContext {
    pub client: Arc<dyn ResourceClient>,
    pub domain: String,
}

impl TestContext {
    /// Build an AWS context from `AWS_*` and `TEST_DOMAIN`
    pub fn aws() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let session_token = env::var("AWS_SESSION_TOKEN").ok();
        let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let domain = env::var("TEST_DOMAIN").ok()?;

        let client = create_client(ProviderCredentials::Aws {
            credentials: AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token,
            },
            region,
        })
        .ok()?;

        Some(Self { client, domain })
    }

    /// The hosted zone named exactly `TEST_DOMAIN`
    pub async fn find_zone(&self) -> Option<DnsZone> {
        let wanted = format!("{}.", self.domain.trim_end_matches('.'));
        self.client
            .list_zones_by_name(&self.domain)
            .await
            .ok()?
            .into_iter()
            .find(|z| z.name.eq_ignore_ascii_case(&wanted))
    }
}
