use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::RouteObject;

/// IngressRoute is Traefik's HTTP router definition. Each route carries a rule
/// expression such as ``Host(`app.local`) && PathPrefix(`/api`)``.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "traefik.io",
    version = "v1alpha1",
    kind = "IngressRoute",
    plural = "ingressroutes",
    namespaced,
    derive = "Default",
)]
#[serde(rename_all = "camelCase")]
pub struct IngressRouteSpec {
    /// Entry points this route is bound to (e.g., "web", "websecure")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry_points: Vec<String>,

    /// Routes, evaluated in order
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// A single routing rule
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub struct Route {
    /// Rule expression selecting the requests this route handles
    pub r#match: String,

    /// Route kind, always "Rule" for HTTP routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Explicit priority used to disambiguate overlapping rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Backend services
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<RouteService>,
}

/// Backend service reference
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[derive(Default)]
pub struct RouteService {
    /// Name of the Kubernetes Service
    pub name: String,

    /// Namespace of the Service (defaults to the route's namespace)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl RouteObject for IngressRoute {
    const SOURCE_TYPE: &'static str = "ingress";

    fn rule_expressions(&self) -> Vec<&str> {
        self.spec.routes.iter().map(|route| route.r#match.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    #[test]
    fn test_deserialize_ingress_route() {
        let route: IngressRoute = serde_json::from_value(serde_json::json!({
            "apiVersion": "traefik.io/v1alpha1",
            "kind": "IngressRoute",
            "metadata": { "name": "whoami", "namespace": "apps" },
            "spec": {
                "entryPoints": ["web"],
                "routes": [
                    {
                        "match": "Host(`whoami.local`)",
                        "kind": "Rule",
                        "services": [{ "name": "whoami", "port": 80 }]
                    },
                    { "match": "Host(`api.whoami.local`) && PathPrefix(`/v1`)" }
                ]
            }
        }))
        .expect("valid IngressRoute");

        assert_eq!(route.name_any(), "whoami");
        assert_eq!(route.spec.entry_points, vec!["web".to_string()]);
        assert_eq!(route.spec.routes[0].kind.as_deref(), Some("Rule"));
        assert_eq!(route.spec.routes[0].services[0].name, "whoami");
    }

    #[test]
    fn test_rule_expressions_keep_route_order() {
        let mut route = IngressRoute::new(
            "whoami",
            IngressRouteSpec {
                routes: vec![
                    Route { r#match: "Host(`b.local`)".to_string(), ..Default::default() },
                    Route { r#match: "Host(`a.local`)".to_string(), ..Default::default() },
                ],
                ..Default::default()
            },
        );
        route.metadata.namespace = Some("apps".to_string());

        assert_eq!(route.rule_expressions(), vec!["Host(`b.local`)", "Host(`a.local`)"]);
        assert_eq!(route.route_namespace(), "apps");
        assert_eq!(IngressRoute::SOURCE_TYPE, "ingress");
    }

    #[test]
    fn test_missing_routes_defaults_to_empty() {
        let route: IngressRoute = serde_json::from_value(serde_json::json!({
            "apiVersion": "traefik.io/v1alpha1",
            "kind": "IngressRoute",
            "metadata": { "name": "empty" },
            "spec": {}
        }))
        .expect("valid IngressRoute");

        assert!(route.rule_expressions().is_empty());
        assert_eq!(route.route_namespace(), "");
    }
}
