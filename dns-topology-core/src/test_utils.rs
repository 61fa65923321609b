//! Test helpers
//!
//! Scripted [`ResourceClient`] plus factories for the provider types it serves.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use dns_topology_provider::{
    AliasTarget, ChangeAction, ChangeRequest, ChangeState, ChangeStatus, ComputeInstance,
    DnsRecord, DnsRecordType, DnsZone, Listener, LoadBalancer, LoadBalancerKind, ProviderError,
    RecordCursor, RecordPage, RecordQueryParams, ResourceClient, Result, TargetGroup,
    TargetHealthEntry, TargetHealthState,
};
use tokio::sync::RwLock;

/// Operations whose failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListZones,
    ListRecords,
    ResolveHost,
    FindLoadBalancer,
    ListTargetGroups,
    DescribeTargetHealth,
    GetInstance,
    ListListeners,
    LookupRecordValues,
    SubmitChange,
    GetChange,
}

#[derive(Default)]
struct MockState {
    zones: Vec<DnsZone>,
    records: HashMap<String, Vec<DnsRecord>>,
    hosts: HashMap<String, Vec<IpAddr>>,
    load_balancers: Vec<LoadBalancer>,
    target_groups: HashMap<String, Vec<TargetGroup>>,
    target_health: HashMap<String, Vec<TargetHealthEntry>>,
    instances: HashMap<String, ComputeInstance>,
    listeners: HashMap<String, Vec<Listener>>,
    failures: HashMap<Op, ProviderError>,
    change_script: VecDeque<Result<ChangeState>>,
    drop_submissions: bool,
    calls: Vec<Op>,
    submitted: Vec<ChangeRequest>,
    next_change: u32,
}

// ===== MockResourceClient =====

pub struct MockResourceClient {
    state: RwLock<MockState>,
}

impl MockResourceClient {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
        }
    }

    pub fn with_zone(mut self, id: &str, name: &str) -> Self {
        self.state.get_mut().zones.push(DnsZone {
            id: id.to_string(),
            name: name.to_string(),
            private_zone: false,
            record_count: None,
        });
        self
    }

    pub fn with_private_zone(mut self, id: &str, name: &str) -> Self {
        self.state.get_mut().zones.push(DnsZone {
            id: id.to_string(),
            name: name.to_string(),
            private_zone: true,
            record_count: None,
        });
        self
    }

    pub fn with_record(mut self, zone_id: &str, record: DnsRecord) -> Self {
        self.state
            .get_mut()
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
        self
    }

    pub fn with_host(mut self, hostname: &str, addresses: &[&str]) -> Self {
        let parsed = addresses.iter().filter_map(|a| a.parse().ok()).collect();
        self.state
            .get_mut()
            .hosts
            .insert(hostname.to_string(), parsed);
        self
    }

    pub fn with_load_balancer(mut self, lb: LoadBalancer) -> Self {
        self.state.get_mut().load_balancers.push(lb);
        self
    }

    pub fn with_target_group(mut self, lb_arn: &str, group: TargetGroup) -> Self {
        self.state
            .get_mut()
            .target_groups
            .entry(lb_arn.to_string())
            .or_default()
            .push(group);
        self
    }

    pub fn with_target(mut self, group_arn: &str, target: TargetHealthEntry) -> Self {
        self.state
            .get_mut()
            .target_health
            .entry(group_arn.to_string())
            .or_default()
            .push(target);
        self
    }

    pub fn with_instance(mut self, instance: ComputeInstance) -> Self {
        self.state
            .get_mut()
            .instances
            .insert(instance.instance_id.clone(), instance);
        self
    }

    pub fn with_listener(mut self, lb_arn: &str, listener: Listener) -> Self {
        self.state
            .get_mut()
            .listeners
            .entry(lb_arn.to_string())
            .or_default()
            .push(listener);
        self
    }

    /// Every call of `op` fails with `error`.
    pub fn with_failure(mut self, op: Op, error: ProviderError) -> Self {
        self.state.get_mut().failures.insert(op, error);
        self
    }

    /// Responses of successive `get_change` calls; INSYNC once exhausted.
    pub fn with_change_script(mut self, script: Vec<Result<ChangeState>>) -> Self {
        self.state.get_mut().change_script = script.into();
        self
    }

    /// Accept changes without applying them to the stored records.
    pub fn dropping_submissions(mut self) -> Self {
        self.state.get_mut().drop_submissions = true;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn calls(&self) -> Vec<Op> {
        self.state.read().await.calls.clone()
    }

    pub async fn call_count(&self, op: Op) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| **c == op)
            .count()
    }

    pub async fn submitted(&self) -> Vec<ChangeRequest> {
        self.state.read().await.submitted.clone()
    }

    /// Record and check for an injected failure.
    async fn enter(&self, op: Op) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(op);
        match state.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn list_zones_by_name(&self, domain: &str) -> Result<Vec<DnsZone>> {
        self.enter(Op::ListZones).await?;
        let state = self.state.read().await;
        let wanted = domain.trim_end_matches('.').to_ascii_lowercase();
        let mut zones: Vec<DnsZone> = state
            .zones
            .iter()
            .filter(|z| z.name.trim_end_matches('.').to_ascii_lowercase() >= wanted)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(zones)
    }

    async fn list_records(&self, zone_id: &str, params: &RecordQueryParams) -> Result<RecordPage> {
        self.enter(Op::ListRecords).await?;
        let state = self.state.read().await;
        let Some(records) = state.records.get(zone_id) else {
            if state.zones.iter().any(|z| z.id == zone_id) {
                return Ok(RecordPage {
                    items: Vec::new(),
                    next: None,
                });
            }
            return Err(ProviderError::ZoneNotFound {
                provider: "mock".into(),
                zone: zone_id.to_string(),
                raw_message: None,
            });
        };

        let start = params.cursor.as_ref().map_or(0, |cursor| {
            records
                .iter()
                .position(|r| {
                    r.name == cursor.name
                        && cursor
                            .record_type
                            .as_deref()
                            .is_none_or(|t| t == r.record_type.as_str())
                })
                .unwrap_or(records.len())
        });
        let end = (start + params.page_size.max(1) as usize).min(records.len());
        let next = records.get(end).map(|r| RecordCursor {
            name: r.name.clone(),
            record_type: Some(r.record_type.as_str().to_string()),
            identifier: None,
        });
        Ok(RecordPage {
            items: records[start..end].to_vec(),
            next,
        })
    }

    async fn resolve_host(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        self.enter(Op::ResolveHost).await?;
        self.state
            .read()
            .await
            .hosts
            .get(hostname)
            .cloned()
            .ok_or_else(|| ProviderError::HostResolution {
                provider: "mock".into(),
                host: hostname.to_string(),
                detail: "no record found".into(),
            })
    }

    async fn find_load_balancer_by_dns_name(
        &self,
        dns_name: &str,
    ) -> Result<Option<LoadBalancer>> {
        self.enter(Op::FindLoadBalancer).await?;
        Ok(self
            .state
            .read()
            .await
            .load_balancers
            .iter()
            .find(|lb| lb.dns_name.eq_ignore_ascii_case(dns_name))
            .cloned())
    }

    async fn list_target_groups(&self, load_balancer_arn: &str) -> Result<Vec<TargetGroup>> {
        self.enter(Op::ListTargetGroups).await?;
        Ok(self
            .state
            .read()
            .await
            .target_groups
            .get(load_balancer_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn describe_target_health(
        &self,
        target_group_arn: &str,
    ) -> Result<Vec<TargetHealthEntry>> {
        self.enter(Op::DescribeTargetHealth).await?;
        Ok(self
            .state
            .read()
            .await
            .target_health
            .get(target_group_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Option<ComputeInstance>> {
        self.enter(Op::GetInstance).await?;
        Ok(self.state.read().await.instances.get(instance_id).cloned())
    }

    async fn list_listeners(&self, load_balancer_arn: &str) -> Result<Vec<Listener>> {
        self.enter(Op::ListListeners).await?;
        Ok(self
            .state
            .read()
            .await
            .listeners
            .get(load_balancer_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn lookup_record_values(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: DnsRecordType,
    ) -> Result<Option<Vec<String>>> {
        self.enter(Op::LookupRecordValues).await?;
        Ok(self.state.read().await.records.get(zone_id).and_then(|records| {
            records
                .iter()
                .find(|r| same_name(&r.name, record_name) && r.record_type == record_type)
                .map(|r| r.values.clone())
        }))
    }

    async fn submit_change(&self, zone_id: &str, change: &ChangeRequest) -> Result<ChangeStatus> {
        self.enter(Op::SubmitChange).await?;
        let mut state = self.state.write().await;
        state.submitted.push(change.clone());

        if !state.drop_submissions {
            let records = state.records.entry(zone_id.to_string()).or_default();
            let existing = records.iter_mut().find(|r| {
                same_name(&r.name, &change.record_name) && r.record_type == change.record_type
            });
            match (change.action, existing) {
                (ChangeAction::Create, Some(_)) => {
                    return Err(ProviderError::InvalidParameter {
                        provider: "mock".into(),
                        param: "ChangeBatch".into(),
                        detail: format!("record {} already exists", change.record_name),
                    });
                }
                (_, Some(record)) => {
                    record.values = vec![change.value.clone()];
                    record.ttl = Some(change.ttl);
                }
                (_, None) => records.push(DnsRecord {
                    name: change.record_name.clone(),
                    record_type: change.record_type.clone(),
                    ttl: Some(change.ttl),
                    values: vec![change.value.clone()],
                    alias_target: None,
                }),
            }
        }

        state.next_change += 1;
        Ok(ChangeStatus {
            id: format!("C{:04}", state.next_change),
            state: ChangeState::Pending,
            submitted_at: None,
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeStatus> {
        self.enter(Op::GetChange).await?;
        let next = self
            .state
            .write()
            .await
            .change_script
            .pop_front()
            .unwrap_or(Ok(ChangeState::Insync))?;
        Ok(ChangeStatus {
            id: change_id.to_string(),
            state: next,
            submitted_at: None,
        })
    }
}

// ===== Factories =====

pub fn alias_record(name: &str, record_type: DnsRecordType, target: &str) -> DnsRecord {
    DnsRecord {
        name: name.to_string(),
        record_type,
        ttl: None,
        values: Vec::new(),
        alias_target: Some(AliasTarget {
            dns_name: target.to_string(),
            hosted_zone_id: "Z35SXDOTRQ7X7K".to_string(),
            evaluate_target_health: false,
        }),
    }
}

pub fn plain_record(name: &str, record_type: DnsRecordType, value: &str) -> DnsRecord {
    DnsRecord {
        name: name.to_string(),
        record_type,
        ttl: Some(300),
        values: vec![value.to_string()],
        alias_target: None,
    }
}

pub fn load_balancer(name: &str, dns_name: &str) -> LoadBalancer {
    LoadBalancer {
        arn: lb_arn(name),
        name: name.to_string(),
        dns_name: dns_name.to_string(),
        scheme: "internet-facing".to_string(),
        kind: LoadBalancerKind::Application,
        canonical_hosted_zone_id: Some("Z35SXDOTRQ7X7K".to_string()),
        state: Some("active".to_string()),
    }
}

pub fn lb_arn(name: &str) -> String {
    format!("arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/{name}/50dc6c495c0c9188")
}

pub fn target_group(name: &str) -> TargetGroup {
    TargetGroup {
        arn: tg_arn(name),
        name: name.to_string(),
        protocol: Some("HTTP".to_string()),
        port: Some(80),
        target_type: Some("instance".to_string()),
    }
}

pub fn tg_arn(name: &str) -> String {
    format!("arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/{name}/73e2d6bc24d8a067")
}

pub fn target(id: &str, port: u16, health: TargetHealthState) -> TargetHealthEntry {
    TargetHealthEntry {
        target_id: id.to_string(),
        port: Some(port),
        health_state: health,
        reason: None,
    }
}

pub fn instance(id: &str, name: Option<&str>, private_address: Option<&str>) -> ComputeInstance {
    ComputeInstance {
        instance_id: id.to_string(),
        name_tag: name.map(str::to_string),
        private_address: private_address.map(str::to_string),
        state: Some("running".to_string()),
        instance_type: Some("t3.micro".to_string()),
    }
}

pub fn https_listener(policy: &str) -> Listener {
    Listener {
        arn: "arn:aws:elasticloadbalancing:us-east-1:123456789012:listener/app/lb/1/2".to_string(),
        port: Some(443),
        protocol: Some("HTTPS".to_string()),
        ssl_policy: Some(policy.to_string()),
    }
}

pub fn network_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "mock".into(),
        detail: "connection reset".into(),
    }
}

pub fn throttled() -> ProviderError {
    ProviderError::RateLimited {
        provider: "mock".into(),
        retry_after: None,
        raw_message: Some("Rate exceeded".into()),
    }
}

pub fn access_denied() -> ProviderError {
    ProviderError::PermissionDenied {
        provider: "mock".into(),
        raw_message: Some("not authorized".into()),
    }
}
