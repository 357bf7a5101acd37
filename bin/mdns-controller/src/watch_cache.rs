//! Last-seen object cache turning watcher events into lifecycle callbacks

use crate::error::ControllerError;
use crate::handler::RouteEventHandler;
use kube::ResourceExt;
use kube_runtime::reflector::ObjectRef;
use kube_runtime::watcher::Event;
use mdns_api::RouteObject;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// WatchCache remembers the last version of every object so that a watcher
/// `Apply` can be told apart as an add or an update, and a re-list can delete
/// objects that disappeared while the watch was down.
pub struct WatchCache<K: RouteObject> {
    objects: HashMap<ObjectRef<K>, K>,
    // Objects seen since the last `Init`, present only during a re-list
    relist: Option<HashSet<ObjectRef<K>>>,
    synced: bool,
}

impl<K: RouteObject> WatchCache<K> {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            relist: None,
            synced: false,
        }
    }

    /// Whether the initial listing has completed
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub async fn apply<H>(&mut self, event: Event<K>, handler: &H) -> Result<(), ControllerError>
    where
        H: RouteEventHandler<K> + ?Sized,
    {
        match event {
            Event::Apply(route) => self.upsert(route, handler).await,
            Event::Delete(route) => {
                let old = self.objects.remove(&ObjectRef::from_obj(&route)).unwrap_or(route);
                handler.on_delete(&old).await
            }
            Event::Init => {
                debug!("Watch (re)list started");
                self.relist = Some(HashSet::new());
                Ok(())
            }
            Event::InitApply(route) => {
                if let Some(seen) = self.relist.as_mut() {
                    seen.insert(ObjectRef::from_obj(&route));
                }
                self.upsert(route, handler).await
            }
            Event::InitDone => {
                if let Some(seen) = self.relist.take() {
                    let mut stale: Vec<ObjectRef<K>> = self
                        .objects
                        .keys()
                        .filter(|key| !seen.contains(*key))
                        .cloned()
                        .collect();
                    stale.sort_by_key(|key| key.to_string());

                    for key in stale {
                        if let Some(old) = self.objects.remove(&key) {
                            debug!("{} disappeared during re-list", key);
                            handler.on_delete(&old).await?;
                        }
                    }
                }
                self.synced = true;
                Ok(())
            }
        }
    }

    async fn upsert<H>(&mut self, route: K, handler: &H) -> Result<(), ControllerError>
    where
        H: RouteEventHandler<K> + ?Sized,
    {
        let key = ObjectRef::from_obj(&route);
        match self.objects.insert(key, route.clone()) {
            Some(old) if is_same_version(&old, &route) => {
                debug!("Skipping unchanged {}/{}", route.route_namespace(), route.name_any());
                Ok(())
            }
            Some(old) => handler.on_update(&old, &route).await,
            None => handler.on_add(&route).await,
        }
    }
}

impl<K: RouteObject> Default for WatchCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_same_version<K: RouteObject>(old: &K, new: &K) -> bool {
    match (old.resource_version(), new.resource_version()) {
        (Some(old), Some(new)) => old == new,
        _ => false,
    }
}
