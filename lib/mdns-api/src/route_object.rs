//! Typed capability shared by every watched route kind

use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// A cluster object that carries rule expressions worth advertising over mDNS.
///
/// Controllers are generic over this trait, so each watched kind is a distinct
/// type rather than something inspected at runtime.
pub trait RouteObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone + Debug + DeserializeOwned + Send + Sync + 'static
{
    /// Stable tag identifying the producing watcher kind on emitted records
    const SOURCE_TYPE: &'static str;

    /// Rule expressions of this object, one per route entry, in route order
    fn rule_expressions(&self) -> Vec<&str>;

    /// Namespace of the object, empty when unset
    fn route_namespace(&self) -> String {
        self.namespace().unwrap_or_default()
    }
}
