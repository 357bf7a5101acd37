/// API version v1alpha1 of the Traefik CRDs

pub mod ingress_route;

pub use ingress_route::{IngressRoute, IngressRouteSpec, Route, RouteService};

/// API group for Traefik resources
pub const API_GROUP: &str = "traefik.io";
/// API version for Traefik resources
pub const API_VERSION: &str = "v1alpha1";
