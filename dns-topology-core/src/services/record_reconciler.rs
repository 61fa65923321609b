//! TXT record reconciliation
//!
//! Drives one record through `Deciding -> Submitting -> Polling -> Verifying`
//! and reports each transition to a [`ReconcileObserver`]. Polling is bounded
//! by an attempt limit, a deadline and the caller's cancellation token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use dns_topology_provider::{
    ChangeAction, ChangeRequest, ChangeStatus, DnsRecordType, DnsZone, ResourceClient,
};

use crate::config::ReconcilerConfig;
use crate::error::{CoreError, CoreResult};
use crate::services::{fqdn, select_zone};
use crate::txt::{quote_txt, unquote_txt};
use crate::types::{Outcome, ReconcileState};

/// Receives progress of a reconciliation.
pub trait ReconcileObserver: Send + Sync {
    /// Called on entering each state, terminal states included.
    fn on_state(&self, record_name: &str, state: ReconcileState) {
        let _ = (record_name, state);
    }

    /// Called after every successful status poll; `attempt` starts at 1.
    fn on_poll(&self, record_name: &str, attempt: u32, status: &ChangeStatus) {
        let _ = (record_name, attempt, status);
    }
}

/// Observer that writes transitions to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ReconcileObserver for LoggingObserver {
    fn on_state(&self, record_name: &str, state: ReconcileState) {
        match state {
            ReconcileState::Done => log::info!("{record_name}: reconciled"),
            ReconcileState::Failed => log::debug!("{record_name}: reconciliation failed"),
            _ => log::debug!("{record_name}: {state}"),
        }
    }

    fn on_poll(&self, record_name: &str, attempt: u32, status: &ChangeStatus) {
        log::debug!(
            "{record_name}: change {} is {:?} (poll {attempt})",
            status.id,
            status.state
        );
    }
}

/// Creates or updates TXT records and waits for them to propagate.
pub struct RecordReconciler {
    client: Arc<dyn ResourceClient>,
    config: ReconcilerConfig,
    observer: Arc<dyn ReconcileObserver>,
}

impl RecordReconciler {
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self::with_config(client, ReconcilerConfig::default())
    }

    #[must_use]
    pub fn with_config(client: Arc<dyn ResourceClient>, config: ReconcilerConfig) -> Self {
        Self {
            client,
            config,
            observer: Arc::new(LoggingObserver),
        }
    }

    /// Replace the default [`LoggingObserver`].
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Make `record_name` hold exactly the TXT content `value`.
    pub async fn reconcile(&self, record_name: &str, value: &str) -> Outcome {
        self.reconcile_with_cancel(record_name, value, &CancellationToken::new())
            .await
    }

    /// Like [`reconcile`](Self::reconcile), stopping early once `cancel` fires.
    pub async fn reconcile_with_cancel(
        &self,
        record_name: &str,
        value: &str,
        cancel: &CancellationToken,
    ) -> Outcome {
        let name = record_name.trim().trim_end_matches('.');
        let mut outcome = Outcome::new(name);

        match self.run(name, value, cancel, &mut outcome).await {
            Ok(()) => {
                outcome.applied = true;
                self.observer.on_state(name, ReconcileState::Done);
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("{name}: {e}");
                } else {
                    log::error!("{name}: {e}");
                }
                outcome.error = Some(e);
                self.observer.on_state(name, ReconcileState::Failed);
            }
        }
        outcome
    }

    /// Reconcile several `(name, value)` pairs, `concurrency` at a time.
    ///
    /// Outcomes are returned in input order.
    pub async fn reconcile_many<N, V>(&self, items: &[(N, V)]) -> Vec<Outcome>
    where
        N: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        self.reconcile_many_with_cancel(items, &CancellationToken::new())
            .await
    }

    pub async fn reconcile_many_with_cancel<N, V>(
        &self,
        items: &[(N, V)],
        cancel: &CancellationToken,
    ) -> Vec<Outcome>
    where
        N: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        stream::iter(items)
            .map(|(name, value)| self.reconcile_with_cancel(name.as_ref(), value.as_ref(), cancel))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    async fn run(
        &self,
        name: &str,
        value: &str,
        cancel: &CancellationToken,
        outcome: &mut Outcome,
    ) -> CoreResult<()> {
        self.observer.on_state(name, ReconcileState::Deciding);
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled { change_id: None });
        }
        let record_fqdn = fqdn(name);
        let (zone, existing) = self.decide(name, &record_fqdn).await?;
        let action = if existing.is_some() {
            ChangeAction::Upsert
        } else {
            ChangeAction::Create
        };
        outcome.action = Some(action);

        self.observer.on_state(name, ReconcileState::Submitting);
        let request = ChangeRequest {
            action,
            record_name: record_fqdn.clone(),
            record_type: DnsRecordType::Txt,
            value: quote_txt(value),
            ttl: self.config.ttl,
            comment: Some(audit_comment(action, name, Utc::now())),
        };
        let status = self
            .client
            .submit_change(&zone.id, &request)
            .await
            .map_err(|source| CoreError::Submission {
                record_name: name.to_string(),
                source,
            })?;
        log::info!("{name}: {action} accepted as change {}", status.id);
        outcome.change_id = Some(status.id.clone());

        if !status.is_insync() {
            self.observer.on_state(name, ReconcileState::Polling);
            self.wait_for_insync(name, &status.id, cancel, &mut outcome.polls)
                .await?;
        }

        self.observer.on_state(name, ReconcileState::Verifying);
        let actual = self
            .client
            .lookup_record_values(&zone.id, &record_fqdn, DnsRecordType::Txt)
            .await
            .map_err(|source| CoreError::Lookup {
                record_name: name.to_string(),
                source,
            })?
            .map(|values| {
                values
                    .iter()
                    .map(|v| unquote_txt(v))
                    .collect::<Vec<_>>()
                    .join(", ")
            });
        outcome.final_value.clone_from(&actual);

        if actual.as_deref() == Some(value) {
            Ok(())
        } else {
            Err(CoreError::VerificationMismatch {
                expected: value.to_string(),
                actual,
            })
        }
    }

    /// Locate the parent zone and the record's current values.
    async fn decide(
        &self,
        name: &str,
        record_fqdn: &str,
    ) -> CoreResult<(DnsZone, Option<Vec<String>>)> {
        let zone_name =
            parent_zone(record_fqdn).ok_or_else(|| CoreError::InvalidRecordName(name.to_string()))?;
        let lookup_error = |source| CoreError::Lookup {
            record_name: name.to_string(),
            source,
        };

        let zones = self
            .client
            .list_zones_by_name(&zone_name)
            .await
            .map_err(lookup_error)?;
        let zone = select_zone(zones, &zone_name).ok_or(CoreError::ZoneNotFound(zone_name))?;

        let existing = self
            .client
            .lookup_record_values(&zone.id, record_fqdn, DnsRecordType::Txt)
            .await
            .map_err(lookup_error)?;
        log::debug!(
            "{name}: zone {} ({}), existing values {existing:?}",
            zone.name,
            zone.id
        );
        Ok((zone, existing))
    }

    async fn wait_for_insync(
        &self,
        name: &str,
        change_id: &str,
        cancel: &CancellationToken,
        polls: &mut u32,
    ) -> CoreResult<()> {
        let finished = {
            let poll = self.poll_loop(name, change_id, &mut *polls);
            tokio::select! {
                biased;
                () = cancel.cancelled() => Some(Err(CoreError::Cancelled {
                    change_id: Some(change_id.to_string()),
                })),
                result = within(self.config.timeout, poll) => result,
            }
        };

        finished.unwrap_or_else(|| {
            Err(CoreError::PollTimeout {
                change_id: change_id.to_string(),
                polls: *polls,
            })
        })
    }

    async fn poll_loop(&self, name: &str, change_id: &str, polls: &mut u32) -> CoreResult<()> {
        loop {
            if self
                .config
                .max_poll_attempts
                .is_some_and(|max| *polls >= max)
            {
                return Err(CoreError::PollTimeout {
                    change_id: change_id.to_string(),
                    polls: *polls,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
            *polls += 1;

            match self.client.get_change(change_id).await {
                Ok(status) => {
                    self.observer.on_poll(name, *polls, &status);
                    if status.is_insync() {
                        return Ok(());
                    }
                }
                Err(e) if e.is_retryable() => {
                    log::warn!("{name}: polling change {change_id} failed, will retry: {e}");
                }
                Err(source) => {
                    return Err(CoreError::Polling {
                        change_id: change_id.to_string(),
                        source,
                    });
                }
            }
        }
    }
}

/// Run `fut` to completion, or give up after `limit` and return `None`.
async fn within<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// `a.b.example.com.` lives in `b.example.com.`; single labels have no parent.
fn parent_zone(record_fqdn: &str) -> Option<String> {
    let (_, rest) = record_fqdn.trim_end_matches('.').split_once('.')?;
    if rest.is_empty() {
        None
    } else {
        Some(format!("{rest}."))
    }
}

fn audit_comment(action: ChangeAction, name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{action} {name} at {}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
