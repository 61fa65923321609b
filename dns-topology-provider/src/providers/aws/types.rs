//! Route 53 / ELBv2 / EC2 XML response types
//!
//! Only the elements this crate reads are modelled; everything else is ignored.
//! Root element names are not checked.

use serde::Deserialize;

// ============ List wrappers ============

/// `<Foo><member>..</member><member>..</member></Foo>` (Query APIs).
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MemberList<T> {
    #[serde(rename = "member", default)]
    pub items: Vec<T>,
}

/// `<fooSet><item>..</item></fooSet>` (EC2).
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ItemList<T> {
    #[serde(rename = "item", default)]
    pub items: Vec<T>,
}

/// Flatten an optional list wrapper.
pub fn members<T>(list: Option<MemberList<T>>) -> Vec<T> {
    list.map(|l| l.items).unwrap_or_default()
}

/// Flatten an optional EC2 item set.
pub fn items<T>(list: Option<ItemList<T>>) -> Vec<T> {
    list.map(|l| l.items).unwrap_or_default()
}

// ============ Errors ============

/// Error body of any of the three services.
///
/// - Route 53 / ELBv2: `<ErrorResponse><Error><Code/><Message/></Error></ErrorResponse>`
/// - EC2: `<Response><Errors><Error><Code/><Message/></Error></Errors></Response>`
/// - Route 53 change batches: `<InvalidChangeBatch><Messages><Message/></Messages></InvalidChangeBatch>`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Error")]
    pub error: Option<ApiError>,
    #[serde(rename = "Errors")]
    pub errors: Option<ApiErrorList>,
    #[serde(rename = "Messages")]
    pub messages: Option<MessageList>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(rename = "Code")]
    pub code: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorList {
    #[serde(rename = "Error", default)]
    pub items: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(rename = "Message", default)]
    pub items: Vec<String>,
}

impl ErrorEnvelope {
    /// The first `(code, message)` pair the body carries.
    pub fn into_code_and_message(self) -> Option<(Option<String>, String)> {
        if let Some(messages) = self.messages {
            return Some((
                Some("InvalidChangeBatch".to_string()),
                messages.items.join("; "),
            ));
        }
        let error = self
            .error
            .or_else(|| self.errors.and_then(|e| e.items.into_iter().next()))?;
        Some((error.code, error.message.unwrap_or_default()))
    }
}

// ============ Route 53 ============

#[derive(Debug, Deserialize)]
pub struct ListHostedZonesByNameResponse {
    #[serde(rename = "HostedZones")]
    pub hosted_zones: Option<HostedZoneList>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZoneList {
    #[serde(rename = "HostedZone", default)]
    pub items: Vec<HostedZone>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZone {
    /// `/hostedzone/Z...`
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Config")]
    pub config: Option<HostedZoneConfig>,
    #[serde(rename = "ResourceRecordSetCount")]
    pub resource_record_set_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct HostedZoneConfig {
    #[serde(rename = "PrivateZone", default)]
    pub private_zone: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListResourceRecordSetsResponse {
    #[serde(rename = "ResourceRecordSets")]
    pub resource_record_sets: Option<ResourceRecordSetList>,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextRecordName")]
    pub next_record_name: Option<String>,
    #[serde(rename = "NextRecordType")]
    pub next_record_type: Option<String>,
    #[serde(rename = "NextRecordIdentifier")]
    pub next_record_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecordSetList {
    #[serde(rename = "ResourceRecordSet", default)]
    pub items: Vec<ResourceRecordSet>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecordSet {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "TTL")]
    pub ttl: Option<u32>,
    #[serde(rename = "ResourceRecords")]
    pub resource_records: Option<ResourceRecordList>,
    #[serde(rename = "AliasTarget")]
    pub alias_target: Option<AliasTargetXml>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecordList {
    #[serde(rename = "ResourceRecord", default)]
    pub items: Vec<ResourceRecordValue>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceRecordValue {
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AliasTargetXml {
    #[serde(rename = "HostedZoneId")]
    pub hosted_zone_id: String,
    #[serde(rename = "DNSName")]
    pub dns_name: String,
    #[serde(rename = "EvaluateTargetHealth", default)]
    pub evaluate_target_health: bool,
}

/// Body of both `ChangeResourceRecordSets` and `GetChange` responses.
#[derive(Debug, Deserialize)]
pub struct ChangeInfoResponse {
    #[serde(rename = "ChangeInfo")]
    pub change_info: ChangeInfo,
}

#[derive(Debug, Deserialize)]
pub struct ChangeInfo {
    /// `/change/C...`
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "SubmittedAt")]
    pub submitted_at: Option<String>,
}

// ============ ELBv2 ============

#[derive(Debug, Deserialize)]
pub struct DescribeLoadBalancersResponse {
    #[serde(rename = "DescribeLoadBalancersResult")]
    pub result: DescribeLoadBalancersResult,
}

#[derive(Debug, Deserialize)]
pub struct DescribeLoadBalancersResult {
    #[serde(rename = "LoadBalancers")]
    pub load_balancers: Option<MemberList<LoadBalancerXml>>,
    #[serde(rename = "NextMarker")]
    pub next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoadBalancerXml {
    #[serde(rename = "LoadBalancerArn")]
    pub load_balancer_arn: String,
    #[serde(rename = "LoadBalancerName")]
    pub load_balancer_name: String,
    #[serde(rename = "DNSName")]
    pub dns_name: String,
    #[serde(rename = "Scheme")]
    pub scheme: Option<String>,
    #[serde(rename = "Type")]
    pub lb_type: Option<String>,
    #[serde(rename = "CanonicalHostedZoneId")]
    pub canonical_hosted_zone_id: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<LoadBalancerStateXml>,
}

#[derive(Debug, Deserialize)]
pub struct LoadBalancerStateXml {
    #[serde(rename = "Code")]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTargetGroupsResponse {
    #[serde(rename = "DescribeTargetGroupsResult")]
    pub result: DescribeTargetGroupsResult,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTargetGroupsResult {
    #[serde(rename = "TargetGroups")]
    pub target_groups: Option<MemberList<TargetGroupXml>>,
    #[serde(rename = "NextMarker")]
    pub next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TargetGroupXml {
    #[serde(rename = "TargetGroupArn")]
    pub target_group_arn: String,
    #[serde(rename = "TargetGroupName")]
    pub target_group_name: String,
    #[serde(rename = "Protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "Port")]
    pub port: Option<u16>,
    #[serde(rename = "TargetType")]
    pub target_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTargetHealthResponse {
    #[serde(rename = "DescribeTargetHealthResult")]
    pub result: DescribeTargetHealthResult,
}

#[derive(Debug, Deserialize)]
pub struct DescribeTargetHealthResult {
    #[serde(rename = "TargetHealthDescriptions")]
    pub descriptions: Option<MemberList<TargetHealthDescription>>,
}

#[derive(Debug, Deserialize)]
pub struct TargetHealthDescription {
    #[serde(rename = "Target")]
    pub target: TargetXml,
    #[serde(rename = "TargetHealth")]
    pub target_health: Option<TargetHealthXml>,
}

#[derive(Debug, Deserialize)]
pub struct TargetXml {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Port")]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct TargetHealthXml {
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "Reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DescribeListenersResponse {
    #[serde(rename = "DescribeListenersResult")]
    pub result: DescribeListenersResult,
}

#[derive(Debug, Deserialize)]
pub struct DescribeListenersResult {
    #[serde(rename = "Listeners")]
    pub listeners: Option<MemberList<ListenerXml>>,
    #[serde(rename = "NextMarker")]
    pub next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListenerXml {
    #[serde(rename = "ListenerArn")]
    pub listener_arn: String,
    #[serde(rename = "Port")]
    pub port: Option<u16>,
    #[serde(rename = "Protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "SslPolicy")]
    pub ssl_policy: Option<String>,
}

// ============ EC2 ============

#[derive(Debug, Deserialize)]
pub struct DescribeInstancesResponse {
    #[serde(rename = "reservationSet")]
    pub reservation_set: Option<ItemList<Reservation>>,
}

#[derive(Debug, Deserialize)]
pub struct Reservation {
    #[serde(rename = "instancesSet")]
    pub instances_set: Option<ItemList<InstanceXml>>,
}

#[derive(Debug, Deserialize)]
pub struct InstanceXml {
    #[serde(rename = "instanceId")]
    pub instance_id: String,
    #[serde(rename = "privateIpAddress")]
    pub private_ip_address: Option<String>,
    #[serde(rename = "instanceState")]
    pub instance_state: Option<InstanceStateXml>,
    #[serde(rename = "instanceType")]
    pub instance_type: Option<String>,
    #[serde(rename = "tagSet")]
    pub tag_set: Option<ItemList<TagXml>>,
}

#[derive(Debug, Deserialize)]
pub struct InstanceStateXml {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagXml {
    pub key: String,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpUtils;

    fn parse<T: serde::de::DeserializeOwned>(xml: &str) -> T {
        match HttpUtils::parse_xml(xml, "aws") {
            Ok(v) => v,
            Err(e) => panic!("failed to parse fixture: {e}"),
        }
    }

    #[test]
    fn hosted_zones_by_name() {
        let xml = r#"<?xml version="1.0"?>
<ListHostedZonesByNameResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <HostedZones>
    <HostedZone>
      <Id>/hostedzone/Z111111QQQQQQQ</Id>
      <Name>example.com.</Name>
      <CallerReference>ref-1</CallerReference>
      <Config><Comment>main</Comment><PrivateZone>false</PrivateZone></Config>
      <ResourceRecordSetCount>42</ResourceRecordSetCount>
    </HostedZone>
    <HostedZone>
      <Id>/hostedzone/Z222222VVVVVVV</Id>
      <Name>example.net.</Name>
      <CallerReference>ref-2</CallerReference>
      <Config><PrivateZone>true</PrivateZone></Config>
      <ResourceRecordSetCount>3</ResourceRecordSetCount>
    </HostedZone>
  </HostedZones>
  <DNSName>example.com.</DNSName>
  <IsTruncated>false</IsTruncated>
  <MaxItems>100</MaxItems>
</ListHostedZonesByNameResponse>"#;
        let resp: ListHostedZonesByNameResponse = parse(xml);
        let zones = resp.hosted_zones.map(|z| z.items).unwrap_or_default();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].id, "/hostedzone/Z111111QQQQQQQ");
        assert_eq!(zones[0].resource_record_set_count, Some(42));
        assert!(zones[1].config.as_ref().is_some_and(|c| c.private_zone));
    }

    #[test]
    fn record_sets_with_alias_and_cursor() {
        let xml = r#"<?xml version="1.0"?>
<ListResourceRecordSetsResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ResourceRecordSets>
    <ResourceRecordSet>
      <Name>app.example.com.</Name>
      <Type>A</Type>
      <AliasTarget>
        <HostedZoneId>Z35SXDOTRQ7X7K</HostedZoneId>
        <DNSName>dualstack.mylb-1.us-east-1.elb.amazonaws.com.</DNSName>
        <EvaluateTargetHealth>true</EvaluateTargetHealth>
      </AliasTarget>
    </ResourceRecordSet>
    <ResourceRecordSet>
      <Name>_acme-challenge.example.com.</Name>
      <Type>TXT</Type>
      <TTL>60</TTL>
      <ResourceRecords>
        <ResourceRecord><Value>"abc123"</Value></ResourceRecord>
        <ResourceRecord><Value>"def456"</Value></ResourceRecord>
      </ResourceRecords>
    </ResourceRecordSet>
  </ResourceRecordSets>
  <IsTruncated>true</IsTruncated>
  <NextRecordName>www.example.com.</NextRecordName>
  <NextRecordType>CNAME</NextRecordType>
  <MaxItems>2</MaxItems>
</ListResourceRecordSetsResponse>"#;
        let resp: ListResourceRecordSetsResponse = parse(xml);
        assert!(resp.is_truncated);
        assert_eq!(resp.next_record_name.as_deref(), Some("www.example.com."));
        assert_eq!(resp.next_record_type.as_deref(), Some("CNAME"));
        assert!(resp.next_record_identifier.is_none());

        let sets = resp.resource_record_sets.map(|s| s.items).unwrap_or_default();
        assert_eq!(sets.len(), 2);
        let alias = sets[0].alias_target.as_ref();
        assert_eq!(
            alias.map(|a| a.dns_name.as_str()),
            Some("dualstack.mylb-1.us-east-1.elb.amazonaws.com.")
        );
        assert!(sets[0].ttl.is_none());
        let values: Vec<&str> = sets[1]
            .resource_records
            .as_ref()
            .map(|r| r.items.iter().map(|v| v.value.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(values, vec!["\"abc123\"", "\"def456\""]);
    }

    #[test]
    fn change_info() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetChangeResponse xmlns="https://route53.amazonaws.com/doc/2013-04-01/">
  <ChangeInfo>
    <Id>/change/C2682N5HXP0BZ4</Id>
    <Status>INSYNC</Status>
    <SubmittedAt>2017-03-10T01:36:41.958Z</SubmittedAt>
  </ChangeInfo>
</GetChangeResponse>"#;
        let resp: ChangeInfoResponse = parse(xml);
        assert_eq!(resp.change_info.id, "/change/C2682N5HXP0BZ4");
        assert_eq!(resp.change_info.status, "INSYNC");
    }

    #[test]
    fn load_balancers_with_marker() {
        let xml = r#"<DescribeLoadBalancersResponse xmlns="http://elasticloadbalancing.amazonaws.com/doc/2015-12-01/">
  <DescribeLoadBalancersResult>
    <LoadBalancers>
      <member>
        <LoadBalancerArn>arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/mylb/50dc6c495c0c9188</LoadBalancerArn>
        <Scheme>internet-facing</Scheme>
        <LoadBalancerName>mylb</LoadBalancerName>
        <DNSName>mylb-1.us-east-1.elb.amazonaws.com</DNSName>
        <CanonicalHostedZoneId>Z35SXDOTRQ7X7K</CanonicalHostedZoneId>
        <Type>application</Type>
        <State><Code>active</Code></State>
        <AvailabilityZones>
          <member><ZoneName>us-east-1a</ZoneName><SubnetId>subnet-1</SubnetId></member>
        </AvailabilityZones>
      </member>
    </LoadBalancers>
    <NextMarker>abc</NextMarker>
  </DescribeLoadBalancersResult>
  <ResponseMetadata><RequestId>6581c0ac-f39f-11e5-bb98-57d8b3a7cf5d</RequestId></ResponseMetadata>
</DescribeLoadBalancersResponse>"#;
        let resp: DescribeLoadBalancersResponse = parse(xml);
        assert_eq!(resp.result.next_marker.as_deref(), Some("abc"));
        let lbs = members(resp.result.load_balancers);
        assert_eq!(lbs.len(), 1);
        assert_eq!(lbs[0].load_balancer_name, "mylb");
        assert_eq!(lbs[0].lb_type.as_deref(), Some("application"));
        assert_eq!(
            lbs[0].state.as_ref().and_then(|s| s.code.as_deref()),
            Some("active")
        );
    }

    #[test]
    fn target_health_descriptions() {
        let xml = r#"<DescribeTargetHealthResponse xmlns="http://elasticloadbalancing.amazonaws.com/doc/2015-12-01/">
  <DescribeTargetHealthResult>
    <TargetHealthDescriptions>
      <member>
        <HealthCheckPort>80</HealthCheckPort>
        <TargetHealth><State>healthy</State></TargetHealth>
        <Target><Port>80</Port><Id>i-0f76fade</Id></Target>
      </member>
      <member>
        <TargetHealth>
          <State>unhealthy</State>
          <Reason>Target.FailedHealthChecks</Reason>
        </TargetHealth>
        <Target><Port>8080</Port><Id>i-0f76fadf</Id></Target>
      </member>
    </TargetHealthDescriptions>
  </DescribeTargetHealthResult>
</DescribeTargetHealthResponse>"#;
        let resp: DescribeTargetHealthResponse = parse(xml);
        let entries = members(resp.result.descriptions);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].target.id, "i-0f76fade");
        assert_eq!(entries[1].target.port, Some(8080));
        assert_eq!(
            entries[1]
                .target_health
                .as_ref()
                .and_then(|h| h.reason.as_deref()),
            Some("Target.FailedHealthChecks")
        );
    }

    #[test]
    fn listeners_with_and_without_policy() {
        let xml = r#"<DescribeListenersResponse>
  <DescribeListenersResult>
    <Listeners>
      <member>
        <ListenerArn>arn:listener/80</ListenerArn>
        <Port>80</Port>
        <Protocol>HTTP</Protocol>
      </member>
      <member>
        <ListenerArn>arn:listener/443</ListenerArn>
        <Port>443</Port>
        <Protocol>HTTPS</Protocol>
        <SslPolicy>ELBSecurityPolicy-TLS13-1-2-2021-06</SslPolicy>
      </member>
    </Listeners>
  </DescribeListenersResult>
</DescribeListenersResponse>"#;
        let resp: DescribeListenersResponse = parse(xml);
        let listeners = members(resp.result.listeners);
        assert_eq!(listeners.len(), 2);
        assert!(listeners[0].ssl_policy.is_none());
        assert_eq!(
            listeners[1].ssl_policy.as_deref(),
            Some("ELBSecurityPolicy-TLS13-1-2-2021-06")
        );
    }

    #[test]
    fn ec2_instances() {
        let xml = r#"<DescribeInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>8f7724cf-496f-496e-8fe3-example</requestId>
  <reservationSet>
    <item>
      <reservationId>r-1234567890abcdef0</reservationId>
      <instancesSet>
        <item>
          <instanceId>i-0f76fade</instanceId>
          <instanceState><code>16</code><name>running</name></instanceState>
          <privateIpAddress>10.0.1.12</privateIpAddress>
          <instanceType>t3.micro</instanceType>
          <tagSet>
            <item><key>env</key><value>prod</value></item>
            <item><key>Name</key><value>web-1</value></item>
          </tagSet>
        </item>
      </instancesSet>
    </item>
  </reservationSet>
</DescribeInstancesResponse>"#;
        let resp: DescribeInstancesResponse = parse(xml);
        let reservations = items(resp.reservation_set);
        assert_eq!(reservations.len(), 1);
        let instances = reservations
            .into_iter()
            .flat_map(|r| items(r.instances_set))
            .collect::<Vec<_>>();
        assert_eq!(instances[0].private_ip_address.as_deref(), Some("10.0.1.12"));
        let tags = instances
            .into_iter()
            .flat_map(|i| items(i.tag_set))
            .collect::<Vec<_>>();
        assert_eq!(tags[1].key, "Name");
        assert_eq!(tags[1].value.as_deref(), Some("web-1"));
    }

    #[test]
    fn empty_ec2_reservations() {
        let xml = r"<DescribeInstancesResponse><requestId>x</requestId><reservationSet/></DescribeInstancesResponse>";
        let resp: DescribeInstancesResponse = parse(xml);
        assert!(items(resp.reservation_set).is_empty());
    }

    #[test]
    fn error_envelopes() {
        let route53 = r"<ErrorResponse><Error><Type>Sender</Type><Code>NoSuchHostedZone</Code><Message>No hosted zone found with ID: Z1</Message></Error><RequestId>r</RequestId></ErrorResponse>";
        let env: ErrorEnvelope = parse(route53);
        let (code, message) = env.into_code_and_message().unwrap_or((None, String::new()));
        assert_eq!(code.as_deref(), Some("NoSuchHostedZone"));
        assert_eq!(message, "No hosted zone found with ID: Z1");

        let ec2 = r"<Response><Errors><Error><Code>InvalidInstanceID.NotFound</Code><Message>The instance ID 'i-1' does not exist</Message></Error></Errors><RequestID>r</RequestID></Response>";
        let env: ErrorEnvelope = parse(ec2);
        let (code, _) = env.into_code_and_message().unwrap_or((None, String::new()));
        assert_eq!(code.as_deref(), Some("InvalidInstanceID.NotFound"));

        let batch = r"<InvalidChangeBatch><Messages><Message>Tried to create resource record set but it already exists</Message></Messages></InvalidChangeBatch>";
        let env: ErrorEnvelope = parse(batch);
        let (code, message) = env.into_code_and_message().unwrap_or((None, String::new()));
        assert_eq!(code.as_deref(), Some("InvalidChangeBatch"));
        assert!(message.contains("already exists"));
    }
}
