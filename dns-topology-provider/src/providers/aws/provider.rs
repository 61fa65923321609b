//! AWS `ResourceClient` implementation

use std::net::IpAddr;

use async_trait::async_trait;
use quick_xml::escape::escape;

use crate::dns::lookup_host;
use crate::error::Result;
use crate::providers::common::{fully_qualified, normalize_domain_name};
use crate::traits::{ErrorContext, ProviderErrorMapper, ResourceClient};
use crate::types::{
    AliasTarget, ChangeRequest, ChangeState, ChangeStatus, ComputeInstance, DnsRecord,
    DnsRecordType, DnsZone, Listener, LoadBalancer, LoadBalancerKind, MAX_RECORD_PAGE_SIZE,
    RecordCursor, RecordPage, RecordQueryParams, TargetGroup, TargetHealthEntry,
    TargetHealthState,
};
use crate::utils::datetime::parse_timestamp;

use super::http::QueryService;
use super::types::{
    ChangeInfo, ChangeInfoResponse, DescribeInstancesResponse, DescribeListenersResponse,
    DescribeLoadBalancersResponse, DescribeTargetGroupsResponse, DescribeTargetHealthResponse,
    ListHostedZonesByNameResponse, ListResourceRecordSetsResponse, ResourceRecordSet, items,
    members,
};
use super::{AwsProvider, ELB_MAX_PAGE_SIZE, ROUTE53_API_VERSION, ROUTE53_XMLNS};

impl AwsProvider {
    /// `/hostedzone/Z123` -> `Z123`
    pub(crate) fn bare_zone_id(id: &str) -> &str {
        id.trim_start_matches("/hostedzone/")
    }

    /// `/change/C123` -> `C123`
    pub(crate) fn bare_change_id(id: &str) -> &str {
        id.trim_start_matches("/change/")
    }

    fn convert_record(set: ResourceRecordSet) -> DnsRecord {
        DnsRecord {
            name: set.name,
            record_type: DnsRecordType::parse(&set.record_type),
            ttl: set.ttl,
            values: set
                .resource_records
                .map(|r| r.items.into_iter().map(|v| v.value).collect())
                .unwrap_or_default(),
            alias_target: set.alias_target.map(|a| AliasTarget {
                dns_name: a.dns_name,
                hosted_zone_id: a.hosted_zone_id,
                evaluate_target_health: a.evaluate_target_health,
            }),
        }
    }

    fn convert_change(info: ChangeInfo) -> ChangeStatus {
        ChangeStatus {
            id: Self::bare_change_id(&info.id).to_string(),
            state: ChangeState::parse(&info.status),
            submitted_at: info.submitted_at.as_deref().and_then(parse_timestamp),
        }
    }

    /// `ChangeResourceRecordSetsRequest` document for a single change.
    pub(crate) fn change_batch_xml(change: &ChangeRequest) -> String {
        let comment = change
            .comment
            .as_deref()
            .map(|c| format!("<Comment>{}</Comment>", escape(c)))
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><ChangeResourceRecordSetsRequest xmlns="{ROUTE53_XMLNS}"><ChangeBatch>{comment}<Changes><Change><Action>{action}</Action><ResourceRecordSet><Name>{name}</Name><Type>{record_type}</Type><TTL>{ttl}</TTL><ResourceRecords><ResourceRecord><Value>{value}</Value></ResourceRecord></ResourceRecords></ResourceRecordSet></Change></Changes></ChangeBatch></ChangeResourceRecordSetsRequest>"#,
            action = change.action.as_str(),
            name = escape(&fully_qualified(&change.record_name)),
            record_type = change.record_type.as_str(),
            ttl = change.ttl,
            value = escape(&change.value),
        )
    }

    fn instance_ctx(instance_id: &str) -> ErrorContext {
        ErrorContext::resource("instance", instance_id)
    }
}

#[async_trait]
impl ResourceClient for AwsProvider {
    fn id(&self) -> &'static str {
        "aws"
    }

    async fn list_zones_by_name(&self, domain: &str) -> Result<Vec<DnsZone>> {
        let path = format!("/{ROUTE53_API_VERSION}/hostedzonesbyname");
        let query = [("dnsname", normalize_domain_name(domain))];
        let response: ListHostedZonesByNameResponse = self
            .route53_get(&path, &query, ErrorContext::zone(domain))
            .await?;

        Ok(response
            .hosted_zones
            .map(|z| z.items)
            .unwrap_or_default()
            .into_iter()
            .map(|z| DnsZone {
                id: Self::bare_zone_id(&z.id).to_string(),
                name: z.name,
                private_zone: z.config.is_some_and(|c| c.private_zone),
                record_count: z.resource_record_set_count,
            })
            .collect())
    }

    async fn list_records(&self, zone_id: &str, params: &RecordQueryParams) -> Result<RecordPage> {
        let params = params.validated(MAX_RECORD_PAGE_SIZE);
        let mut query = vec![("maxitems", params.page_size.to_string())];
        if let Some(cursor) = &params.cursor {
            query.push(("name", cursor.name.clone()));
            if let Some(record_type) = &cursor.record_type {
                query.push(("type", record_type.clone()));
            }
            if let Some(identifier) = &cursor.identifier {
                query.push(("identifier", identifier.clone()));
            }
        }

        let zone_id = Self::bare_zone_id(zone_id);
        let path = format!("/{ROUTE53_API_VERSION}/hostedzone/{zone_id}/rrset");
        let response: ListResourceRecordSetsResponse = self
            .route53_get(&path, &query, ErrorContext::zone(zone_id))
            .await?;

        let next = match (response.is_truncated, response.next_record_name) {
            (true, Some(name)) => Some(RecordCursor {
                name,
                record_type: response.next_record_type,
                identifier: response.next_record_identifier,
            }),
            _ => None,
        };

        let items = response
            .resource_record_sets
            .map(|s| s.items)
            .unwrap_or_default()
            .into_iter()
            .map(Self::convert_record)
            .collect();

        Ok(RecordPage { items, next })
    }

    async fn resolve_host(&self, hostname: &str) -> Result<Vec<IpAddr>> {
        lookup_host(&self.resolver, self.provider_name(), hostname).await
    }

    async fn find_load_balancer_by_dns_name(
        &self,
        dns_name: &str,
    ) -> Result<Option<LoadBalancer>> {
        let wanted = normalize_domain_name(dns_name);
        let mut marker: Option<String> = None;

        loop {
            let mut params = vec![("PageSize".to_string(), ELB_MAX_PAGE_SIZE.to_string())];
            if let Some(m) = &marker {
                params.push(("Marker".to_string(), m.clone()));
            }

            let response: DescribeLoadBalancersResponse = self
                .query_api(
                    QueryService::Elb,
                    "DescribeLoadBalancers",
                    &params,
                    ErrorContext::default(),
                )
                .await?;

            let found = members(response.result.load_balancers)
                .into_iter()
                .find(|lb| normalize_domain_name(&lb.dns_name).eq_ignore_ascii_case(&wanted));
            if let Some(lb) = found {
                return Ok(Some(LoadBalancer {
                    arn: lb.load_balancer_arn,
                    name: lb.load_balancer_name,
                    dns_name: lb.dns_name,
                    scheme: lb.scheme.unwrap_or_default(),
                    kind: LoadBalancerKind::parse(lb.lb_type.as_deref().unwrap_or_default()),
                    canonical_hosted_zone_id: lb.canonical_hosted_zone_id,
                    state: lb.state.and_then(|s| s.code),
                }));
            }

            match response.result.next_marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => return Ok(None),
            }
        }
    }

    async fn list_target_groups(&self, load_balancer_arn: &str) -> Result<Vec<TargetGroup>> {
        let ctx = ErrorContext::resource("load balancer", load_balancer_arn);
        let mut groups = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut params = vec![("LoadBalancerArn".to_string(), load_balancer_arn.to_string())];
            if let Some(m) = &marker {
                params.push(("Marker".to_string(), m.clone()));
            }

            let response: DescribeTargetGroupsResponse = match self
                .query_api(QueryService::Elb, "DescribeTargetGroups", &params, ctx.clone())
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_not_found() => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };

            groups.extend(members(response.result.target_groups).into_iter().map(|tg| {
                TargetGroup {
                    arn: tg.target_group_arn,
                    name: tg.target_group_name,
                    protocol: tg.protocol,
                    port: tg.port,
                    target_type: tg.target_type,
                }
            }));

            match response.result.next_marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => return Ok(groups),
            }
        }
    }

    async fn describe_target_health(
        &self,
        target_group_arn: &str,
    ) -> Result<Vec<TargetHealthEntry>> {
        let params = vec![("TargetGroupArn".to_string(), target_group_arn.to_string())];
        let response: DescribeTargetHealthResponse = match self
            .query_api(
                QueryService::Elb,
                "DescribeTargetHealth",
                &params,
                ErrorContext::resource("target group", target_group_arn),
            )
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(members(response.result.descriptions)
            .into_iter()
            .map(|d| {
                let (state, reason) = d
                    .target_health
                    .map(|h| (h.state, h.reason))
                    .unwrap_or_default();
                TargetHealthEntry {
                    target_id: d.target.id,
                    port: d.target.port,
                    health_state: TargetHealthState::parse(state.as_deref().unwrap_or_default()),
                    reason,
                }
            })
            .collect())
    }

    async fn get_instance(&self, instance_id: &str) -> Result<Option<ComputeInstance>> {
        let params = vec![("InstanceId.1".to_string(), instance_id.to_string())];
        let response: DescribeInstancesResponse = match self
            .query_api(
                QueryService::Ec2,
                "DescribeInstances",
                &params,
                Self::instance_ctx(instance_id),
            )
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let instance = items(response.reservation_set)
            .into_iter()
            .flat_map(|r| items(r.instances_set))
            .find(|i| i.instance_id == instance_id);

        Ok(instance.map(|i| ComputeInstance {
            name_tag: items(i.tag_set)
                .into_iter()
                .find(|t| t.key == "Name")
                .and_then(|t| t.value)
                .filter(|v| !v.is_empty()),
            instance_id: i.instance_id,
            private_address: i.private_ip_address,
            state: i.instance_state.and_then(|s| s.name),
            instance_type: i.instance_type,
        }))
    }

    async fn list_listeners(&self, load_balancer_arn: &str) -> Result<Vec<Listener>> {
        let ctx = ErrorContext::resource("load balancer", load_balancer_arn);
        let mut listeners = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut params = vec![("LoadBalancerArn".to_string(), load_balancer_arn.to_string())];
            if let Some(m) = &marker {
                params.push(("Marker".to_string(), m.clone()));
            }

            let response: DescribeListenersResponse = match self
                .query_api(QueryService::Elb, "DescribeListeners", &params, ctx.clone())
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_not_found() => return Ok(Vec::new()),
                Err(e) => return Err(e),
            };

            listeners.extend(members(response.result.listeners).into_iter().map(|l| Listener {
                arn: l.listener_arn,
                port: l.port,
                protocol: l.protocol,
                ssl_policy: l.ssl_policy,
            }));

            match response.result.next_marker {
                Some(next) if !next.is_empty() => marker = Some(next),
                _ => return Ok(listeners),
            }
        }
    }

    async fn lookup_record_values(
        &self,
        zone_id: &str,
        record_name: &str,
        record_type: DnsRecordType,
    ) -> Result<Option<Vec<String>>> {
        let wanted = fully_qualified(record_name);
        let cursor = RecordCursor {
            name: wanted.clone(),
            record_type: Some(record_type.as_str().to_string()),
            identifier: None,
        };
        let params = RecordQueryParams {
            page_size: 1,
            cursor: Some(cursor),
        };

        // The listing starts at (name, type) and continues past it, so the first
        // record may belong to a different name.
        let page = self.list_records(zone_id, &params).await?;
        Ok(page
            .items
            .into_iter()
            .find(|r| fully_qualified(&r.name) == wanted && r.record_type == record_type)
            .map(|r| r.values))
    }

    async fn submit_change(&self, zone_id: &str, change: &ChangeRequest) -> Result<ChangeStatus> {
        let zone_id = Self::bare_zone_id(zone_id);
        let path = format!("/{ROUTE53_API_VERSION}/hostedzone/{zone_id}/rrset/");
        log::info!(
            "[{}] {} {} {} in zone {zone_id}",
            self.provider_name(),
            change.action,
            change.record_type,
            change.record_name
        );

        let response: ChangeInfoResponse = self
            .route53_post(&path, Self::change_batch_xml(change), ErrorContext::zone(zone_id))
            .await?;
        Ok(Self::convert_change(response.change_info))
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeStatus> {
        let change_id = Self::bare_change_id(change_id);
        let path = format!("/{ROUTE53_API_VERSION}/change/{change_id}");
        let response: ChangeInfoResponse = self
            .route53_get(&path, &[], ErrorContext::resource("change", change_id))
            .await?;
        Ok(Self::convert_change(response.change_info))
    }
}
