//! Load-balancer address resolution for the routing layer

use crate::error::{DiscoveryError, Result};
use k8s_openapi::api::core::v1::Service;
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOAD_BALANCER: &str = "LoadBalancer";

/// Identity label carried by the routing layer's services
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterLabel {
    pub key: String,
    pub value: String,
}

impl RouterLabel {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn matches(&self, service: &Service) -> bool {
        service.labels().get(&self.key) == Some(&self.value)
    }
}

impl Default for RouterLabel {
    fn default() -> Self {
        Self::new("app.kubernetes.io/name", "traefik")
    }
}

impl FromStr for RouterLabel {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                Ok(Self::new(key.trim(), value.trim()))
            }
            _ => Err(DiscoveryError::InvalidLabelSelector(s.to_string())),
        }
    }
}

impl fmt::Display for RouterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// ServiceIpResolver finds the load-balancer addresses of the routing layer
pub struct ServiceIpResolver {
    client: Client,
    label: RouterLabel,
}

impl ServiceIpResolver {
    pub fn new(client: Client, label: RouterLabel) -> Self {
        Self { client, label }
    }

    /// List matching LoadBalancer services across all namespaces and collect
    /// their ingress IPs, in listing order.
    ///
    /// The whole call is bounded by `timeout`. No matching service is not an error.
    pub async fn resolve(&self, timeout: Duration) -> Result<Vec<String>> {
        let services: Api<Service> = Api::all(self.client.clone());
        let params = ListParams::default().labels(&self.label.to_string());

        let list = tokio::time::timeout(timeout, services.list(&params))
            .await
            .map_err(|_| DiscoveryError::Timeout(timeout))??;
        debug!("Discovered {} services labelled {}", list.items.len(), self.label);

        let ips = load_balancer_ips(&list.items, &self.label);
        info!("Routing layer service IP addresses: {:?}", ips);
        Ok(ips)
    }
}

/// Ingress IPs of every LoadBalancer service carrying `label`.
///
/// Entries without an IP or with an unparsable one are skipped individually.
/// IPv4-mapped IPv6 addresses are reported in their IPv4 form.
pub fn load_balancer_ips(services: &[Service], label: &RouterLabel) -> Vec<String> {
    let mut ips = Vec::new();

    for service in services {
        if !label.matches(service) {
            continue;
        }

        let service_type = service.spec.as_ref().and_then(|spec| spec.type_.as_deref());
        if service_type != Some(LOAD_BALANCER) {
            continue;
        }

        let ingresses = service
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref());

        for ingress in ingresses.into_iter().flatten() {
            let Some(raw) = ingress.ip.as_deref() else {
                debug!(
                    "Skipping hostname-only ingress on service {}/{}",
                    service.namespace().unwrap_or_default(),
                    service.name_any()
                );
                continue;
            };

            match raw.parse::<IpAddr>() {
                Ok(ip) => ips.push(ip.to_canonical().to_string()),
                Err(_) => warn!("Unable to parse IP address {}", raw),
            }
        }
    }

    ips
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, ServiceSpec, ServiceStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn service(name: &str, app: &str, service_type: &str, ips: &[&str]) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("kube-system".to_string()),
                labels: Some(BTreeMap::from([(
                    "app.kubernetes.io/name".to_string(),
                    app.to_string(),
                )])),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some(service_type.to_string()),
                ..Default::default()
            }),
            status: Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(
                        ips.iter()
                            .map(|ip| LoadBalancerIngress {
                                ip: Some(ip.to_string()),
                                ..Default::default()
                            })
                            .collect(),
                    ),
                }),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_collects_ips_in_listing_order() {
        let services = vec![
            service("traefik", "traefik", "LoadBalancer", &["10.0.0.1"]),
            service("traefik-internal", "traefik", "LoadBalancer", &["10.0.0.2"]),
        ];
        assert_eq!(
            load_balancer_ips(&services, &RouterLabel::default()),
            vec!["10.0.0.1", "10.0.0.2"]
        );
    }

    #[test]
    fn test_skips_other_apps_and_types() {
        let services = vec![
            service("nginx", "nginx", "LoadBalancer", &["10.0.0.9"]),
            service("traefik", "traefik", "ClusterIP", &["10.0.0.8"]),
            service("traefik-lb", "traefik", "LoadBalancer", &["10.0.0.1"]),
        ];
        assert_eq!(
            load_balancer_ips(&services, &RouterLabel::default()),
            vec!["10.0.0.1"]
        );
    }

    #[test]
    fn test_skips_invalid_ips_individually() {
        let services = vec![service(
            "traefik",
            "traefik",
            "LoadBalancer",
            &["10.0.0.1", "not-an-ip", "", "fd00::1"],
        )];
        assert_eq!(
            load_balancer_ips(&services, &RouterLabel::default()),
            vec!["10.0.0.1", "fd00::1"]
        );
    }

    #[test]
    fn test_ipv4_mapped_addresses_are_canonical() {
        let services = vec![service(
            "traefik",
            "traefik",
            "LoadBalancer",
            &["::ffff:10.0.0.1", "FD00:0:0::1"],
        )];
        assert_eq!(
            load_balancer_ips(&services, &RouterLabel::default()),
            vec!["10.0.0.1", "fd00::1"]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        let services = vec![
            service("a", "traefik", "LoadBalancer", &["10.0.0.1"]),
            service("b", "traefik", "LoadBalancer", &["10.0.0.1"]),
        ];
        assert_eq!(load_balancer_ips(&services, &RouterLabel::default()).len(), 2);
    }

    #[test]
    fn test_hostname_only_ingress_and_missing_status() {
        let mut hostname_only = service("a", "traefik", "LoadBalancer", &[]);
        hostname_only.status = Some(ServiceStatus {
            load_balancer: Some(LoadBalancerStatus {
                ingress: Some(vec![LoadBalancerIngress {
                    hostname: Some("lb.example.com".to_string()),
                    ..Default::default()
                }]),
            }),
            ..Default::default()
        });
        let mut pending = service("b", "traefik", "LoadBalancer", &[]);
        pending.status = None;

        assert!(load_balancer_ips(&[hostname_only, pending], &RouterLabel::default()).is_empty());
    }

    #[test]
    fn test_no_matching_services_is_empty() {
        assert!(load_balancer_ips(&[], &RouterLabel::default()).is_empty());
    }

    #[test]
    fn test_custom_label() {
        let label: RouterLabel = "app.kubernetes.io/name=ingress-gateway".parse().unwrap();
        let services = vec![
            service("gw", "ingress-gateway", "LoadBalancer", &["192.168.1.10"]),
            service("traefik", "traefik", "LoadBalancer", &["10.0.0.1"]),
        ];
        assert_eq!(load_balancer_ips(&services, &label), vec!["192.168.1.10"]);
    }

    #[test]
    fn test_router_label_parsing() {
        assert_eq!(
            "app.kubernetes.io/name=traefik".parse::<RouterLabel>().unwrap(),
            RouterLabel::default()
        );
        assert!("traefik".parse::<RouterLabel>().is_err());
        assert!("=traefik".parse::<RouterLabel>().is_err());
        assert!("app=".parse::<RouterLabel>().is_err());
    }

    #[test]
    fn test_router_label_display() {
        assert_eq!(RouterLabel::default().to_string(), "app.kubernetes.io/name=traefik");
    }

    fn unresponsive_client() -> Client {
        let service = tower::service_fn(|_request: http::Request<kube::client::Body>| {
            std::future::pending::<std::result::Result<http::Response<kube::client::Body>, std::io::Error>>()
        });
        Client::new(service, "default")
    }

    fn refusing_client() -> Client {
        let service = tower::service_fn(|_request: http::Request<kube::client::Body>| async {
            Err::<http::Response<kube::client::Body>, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        });
        Client::new(service, "default")
    }

    #[tokio::test]
    async fn test_resolve_times_out() {
        let resolver = ServiceIpResolver::new(unresponsive_client(), RouterLabel::default());
        let timeout = Duration::from_millis(50);

        let err = resolver.resolve(timeout).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout(t) if t == timeout));
    }

    #[tokio::test]
    async fn test_resolve_propagates_transport_error() {
        let resolver = ServiceIpResolver::new(refusing_client(), RouterLabel::default());

        let err = resolver.resolve(Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::KubernetesError(_)));
    }

    #[test]
    fn test_timeout_error_message() {
        let err = DiscoveryError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Timed out after 30s listing routing-layer services");
    }
}
