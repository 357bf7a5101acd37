//! Kubernetes resource types watched by the mDNS controller
//!
//! This library defines the route kinds whose rule expressions are turned into
//! mDNS address records:
//! - IngressRoute: Traefik HTTP routes carrying a `match` rule expression
//!
//! Every watched kind implements [`RouteObject`], which is the only view the
//! record pipeline has of a cluster object.

pub mod v1alpha1;
pub mod route_object;

pub use v1alpha1::IngressRoute;
pub use route_object::RouteObject;
