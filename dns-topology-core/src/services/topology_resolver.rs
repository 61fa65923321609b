//! Website topology resolution
//!
//! Joins each alias record of a domain to the load balancer it targets, that
//! balancer's target group, the first backend instance and the TLS policy of
//! its listeners. The control planes share no foreign keys, so every join step
//! is best-effort: a missing link either skips the record or substitutes a
//! placeholder, and nothing short of a broken zone listing surfaces as a skip
//! of the whole domain.

use std::sync::Arc;

use futures::{Stream, StreamExt, future, stream};

use dns_topology_provider::{
    DnsRecord, DnsZone, MAX_RECORD_PAGE_SIZE, ProviderError, RecordQueryParams, ResourceClient,
    TargetGroup, TargetHealthEntry,
};

use crate::config::{ResolverConfig, TargetGroupTieBreak};
use crate::services::{display_name, fqdn, select_zone};
use crate::types::{NOT_AVAILABLE, ResolveReport, SkipReason, SkippedRecord, WebsiteRow};

/// Resolves domains into [`WebsiteRow`]s.
pub struct TopologyResolver {
    client: Arc<dyn ResourceClient>,
    config: ResolverConfig,
}

impl TopologyResolver {
    #[must_use]
    pub fn new(client: Arc<dyn ResourceClient>) -> Self {
        Self::with_config(client, ResolverConfig::default())
    }

    #[must_use]
    pub fn with_config(client: Arc<dyn ResourceClient>, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every domain and collect rows and skips.
    ///
    /// Domains are processed `domain_concurrency` at a time; the report keeps
    /// input order regardless.
    pub async fn resolve<S: AsRef<str>>(&self, domains: &[S]) -> ResolveReport {
        let reports: Vec<ResolveReport> = stream::iter(domains)
            .map(|domain| self.resolve_domain(domain.as_ref()))
            .buffered(self.config.domain_concurrency.max(1))
            .collect()
            .await;

        reports
            .into_iter()
            .fold(ResolveReport::default(), |mut acc, report| {
                acc.extend(report);
                acc
            })
    }

    /// Lazily yield rows, zone by zone and record by record.
    ///
    /// Skips are logged but not reported; use [`resolve`](Self::resolve) to
    /// collect them.
    pub fn stream(&self, domains: Vec<String>) -> impl Stream<Item = WebsiteRow> + '_ {
        stream::iter(domains)
            .then(move |domain| async move {
                let loaded = self.load_domain(&domain).await;
                (domain, loaded)
            })
            .flat_map(move |(domain, loaded)| match loaded {
                Ok((zone, records)) => stream::iter(records)
                    .then(move |record| {
                        let domain = domain.clone();
                        let zone = zone.clone();
                        async move { self.resolve_record(&domain, &zone, &record).await.ok() }
                    })
                    .filter_map(future::ready)
                    .left_stream(),
                Err(_) => stream::empty().right_stream(),
            })
    }

    async fn resolve_domain(&self, domain: &str) -> ResolveReport {
        let mut report = ResolveReport::default();
        let (zone, records) = match self.load_domain(domain).await {
            Ok(loaded) => loaded,
            Err(skip) => {
                report.skipped.push(skip);
                return report;
            }
        };

        for record in &records {
            match self.resolve_record(domain, &zone, record).await {
                Ok(row) => report.rows.push(row),
                Err(skip) => report.skipped.push(skip),
            }
        }

        log::info!(
            "Resolved {domain}: {} rows from {} records",
            report.rows.len(),
            records.len()
        );
        report
    }

    /// Find the domain's zone and list its candidate records in name order.
    async fn load_domain(&self, domain: &str) -> Result<(DnsZone, Vec<DnsRecord>), SkippedRecord> {
        let wanted = fqdn(domain);
        let zones = self
            .client
            .list_zones_by_name(&wanted)
            .await
            .map_err(|e| lookup_failed(domain, None, "list_zones_by_name", &e))?;

        let Some(zone) = select_zone(zones, &wanted) else {
            log::warn!("No hosted zone named {wanted}, skipping {domain}");
            return Err(SkippedRecord::domain(domain, SkipReason::ZoneNotFound));
        };

        let mut records = self
            .list_all_records(&zone)
            .await
            .map_err(|e| lookup_failed(domain, None, "list_records", &e))?;
        records.retain(|r| self.config.record_types.contains(&r.record_type));
        records.sort_by(|a, b| a.name.cmp(&b.name));

        log::debug!(
            "Zone {} ({}) has {} candidate records",
            zone.name,
            zone.id,
            records.len()
        );
        Ok((zone, records))
    }

    async fn list_all_records(&self, zone: &DnsZone) -> Result<Vec<DnsRecord>, ProviderError> {
        let mut params = RecordQueryParams {
            page_size: self.config.page_size.clamp(1, MAX_RECORD_PAGE_SIZE),
            cursor: None,
        };
        let mut records = Vec::new();

        loop {
            let page = self.client.list_records(&zone.id, &params).await?;
            records.extend(page.items);

            if let Some(max) = self.config.max_records_per_zone {
                if records.len() >= max {
                    records.truncate(max);
                    log::debug!("Stopped listing {} at {max} records", zone.name);
                    break;
                }
            }

            match page.next {
                Some(cursor) if params.cursor.as_ref() == Some(&cursor) => {
                    log::warn!("Record cursor for {} did not advance, stopping", zone.name);
                    break;
                }
                Some(cursor) => params = params.next(cursor),
                None => break,
            }
        }

        Ok(records)
    }

    /// Normalized load balancer host of a record, if it targets one.
    fn load_balancer_host(&self, record: &DnsRecord) -> Option<String> {
        let host = normalize_target_host(record.target_host()?);
        self.config
            .load_balancer_suffixes
            .iter()
            .map(|suffix| suffix.trim_end_matches('.').to_ascii_lowercase())
            .any(|suffix| host.ends_with(&suffix))
            .then_some(host)
    }

    async fn resolve_record(
        &self,
        domain: &str,
        zone: &DnsZone,
        record: &DnsRecord,
    ) -> Result<WebsiteRow, SkippedRecord> {
        let name = record.name.as_str();
        let skip = |reason| SkippedRecord::record(domain, name, reason);

        let Some(lb_host) = self.load_balancer_host(record) else {
            return Err(skip(SkipReason::NotLoadBalancerTarget {
                target: record.target_host().map(str::to_string),
            }));
        };

        let addresses = self.client.resolve_host(&lb_host).await.unwrap_or_else(|e| {
            log::warn!("{name}: {e}");
            Vec::new()
        });

        let lb = match self.client.find_load_balancer_by_dns_name(&lb_host).await {
            Ok(Some(lb)) => lb,
            Ok(None) => {
                log::debug!("{name}: no load balancer named {lb_host}");
                return Err(skip(SkipReason::LoadBalancerNotFound { dns_name: lb_host }));
            }
            Err(e) => return Err(lookup_failed(domain, Some(name), "find_load_balancer", &e)),
        };

        let groups = match self.client.list_target_groups(&lb.arn).await {
            Ok(groups) if groups.is_empty() => {
                log::debug!("{name}: load balancer {} has no target groups", lb.name);
                return Err(skip(SkipReason::NoTargetGroups));
            }
            Ok(groups) => groups,
            Err(e) => return Err(lookup_failed(domain, Some(name), "list_target_groups", &e)),
        };
        let target_group_count = groups.len();
        let Some(group) = self.pick_target_group(groups, name, &lb.name) else {
            return Err(skip(SkipReason::AmbiguousTargetGroups {
                count: target_group_count,
            }));
        };

        let targets = self
            .client
            .describe_target_health(&group.arn)
            .await
            .unwrap_or_else(|e| {
                log::warn!("{name}: target health of {} unavailable: {e}", group.name);
                Vec::new()
            });
        let instance_summary = self.instance_summary(name, &targets).await;
        let security_policy = self.security_policy(name, &lb.arn).await;

        Ok(WebsiteRow {
            hostname: display_name(name),
            zone_name: display_name(&zone.name),
            record_type: record.record_type.clone(),
            lb_name: lb.name,
            lb_dns_name: lb_host,
            lb_public_addresses: addresses,
            lb_scheme: lb.scheme,
            lb_kind: lb.kind,
            target_group_name: group.name,
            target_group_count,
            security_policy,
            instance_summary,
            target_ports: targets.iter().filter_map(|t| t.port).collect(),
            target_health: targets.into_iter().map(|t| t.health_state).collect(),
        })
    }

    fn pick_target_group(
        &self,
        groups: Vec<TargetGroup>,
        record_name: &str,
        lb_name: &str,
    ) -> Option<TargetGroup> {
        let count = groups.len();
        if count > 1 {
            log::warn!(
                "{record_name}: load balancer {lb_name} has {count} target groups, tie-break {}",
                self.config.tie_break
            );
        }

        match self.config.tie_break {
            TargetGroupTieBreak::Skip if count > 1 => None,
            TargetGroupTieBreak::First | TargetGroupTieBreak::Skip => groups.into_iter().next(),
            TargetGroupTieBreak::LowestName => {
                groups.into_iter().min_by(|a, b| a.name.cmp(&b.name))
            }
        }
    }

    async fn instance_summary(&self, record_name: &str, targets: &[TargetHealthEntry]) -> String {
        let Some(first) = targets.first() else {
            return NOT_AVAILABLE.to_string();
        };

        match self.client.get_instance(&first.target_id).await {
            Ok(Some(instance)) => {
                let label = instance
                    .name_tag
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(instance.instance_id.as_str());
                let address = instance.private_address.as_deref().unwrap_or(NOT_AVAILABLE);
                format!("{label} ({address})")
            }
            Ok(None) => format!("{} (instance not found)", first.target_id),
            Err(e) => {
                log::warn!("{record_name}: instance {} lookup failed: {e}", first.target_id);
                format!("{} (instance not found)", first.target_id)
            }
        }
    }

    async fn security_policy(&self, record_name: &str, lb_arn: &str) -> String {
        match self.client.list_listeners(lb_arn).await {
            Ok(listeners) => listeners
                .into_iter()
                .filter_map(|l| l.ssl_policy)
                .find(|p| !p.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            Err(e) => {
                log::warn!("{record_name}: listeners unavailable: {e}");
                NOT_AVAILABLE.to_string()
            }
        }
    }
}

/// Lowercase, drop the trailing dot and the `dualstack.` prefix.
fn normalize_target_host(target: &str) -> String {
    let host = target.trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("dualstack.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

fn lookup_failed(
    domain: &str,
    record_name: Option<&str>,
    step: &str,
    error: &ProviderError,
) -> SkippedRecord {
    log::warn!(
        "{}: {step} failed: {error}",
        record_name.unwrap_or(domain)
    );
    SkippedRecord {
        domain: domain.to_string(),
        record_name: record_name.map(str::to_string),
        reason: SkipReason::LookupFailed {
            step: step.to_string(),
            detail: error.to_string(),
        },
    }
}
