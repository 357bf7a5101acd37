//! Watch-driven record synchronisation for one route kind

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::handler::{RecordPublisher, RouteEventHandler};
use crate::watch_cache::WatchCache;
use futures::{Stream, StreamExt};
use kube::{Api, Client};
use kube_runtime::watcher::{self, watcher, Event};
use kube_runtime::WatchStreamExt;
use mdns_api::RouteObject;
use mdns_core::{Record, RecordBuilder};
use mdns_discovery::ServiceIpResolver;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// RouteSyncController watches one route kind and publishes a record change
/// for every host its rules gain or lose.
pub struct RouteSyncController<K: RouteObject> {
    api: Api<K>,
    publisher: RecordPublisher,
    cache_sync_timeout: Duration,
}

impl<K: RouteObject> RouteSyncController<K> {
    /// Resolve the routing layer's addresses and prepare the watch.
    ///
    /// Address resolution happens exactly once here; every record this
    /// controller ever emits carries that snapshot. A resolution failure means
    /// the controller cannot be created.
    pub async fn new(
        client: Client,
        resolver: &ServiceIpResolver,
        notify: mpsc::Sender<Record>,
        config: &ControllerConfig,
    ) -> Result<Self, ControllerError> {
        let ips = resolver.resolve(config.resolve_timeout).await?;
        if ips.is_empty() {
            warn!(
                "No LoadBalancer addresses found for services labelled {}; {} records will carry no IPs",
                config.router_label,
                K::kind(&())
            );
        }

        let api = match &config.namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::all(client),
        };

        Ok(Self {
            api,
            publisher: RecordPublisher::new(RecordBuilder::new(ips), notify),
            cache_sync_timeout: config.cache_sync_timeout,
        })
    }

    /// Addresses attached to every record from this controller
    pub fn ips(&self) -> &[String] {
        self.publisher.builder().ips()
    }

    /// Watch until `stop` is raised or the record channel loses its consumer.
    ///
    /// Failing to sync within the configured timeout is only logged; the
    /// controller keeps running on whatever it has seen so far.
    pub async fn run(self, stop: watch::Receiver<bool>) -> Result<(), ControllerError> {
        info!("Starting {} controller", K::kind(&()));

        let events = watcher(self.api.clone(), watcher::Config::default())
            .default_backoff()
            .boxed();

        watch_loop(events, &self.publisher, stop, self.cache_sync_timeout).await
    }
}

/// Drive `handler` from a stream of watcher events until stopped
pub(crate) async fn watch_loop<K, S, H>(
    mut events: S,
    handler: &H,
    mut stop: watch::Receiver<bool>,
    cache_sync_timeout: Duration,
) -> Result<(), ControllerError>
where
    K: RouteObject,
    S: Stream<Item = Result<Event<K>, watcher::Error>> + Unpin,
    H: RouteEventHandler<K> + ?Sized,
{
    let kind = K::kind(&());
    let mut cache = WatchCache::<K>::new();
    let sync_deadline = tokio::time::sleep(cache_sync_timeout);
    tokio::pin!(sync_deadline);
    let mut deadline_passed = false;

    loop {
        tokio::select! {
            _ = async { let _ = stop.wait_for(|stopped| *stopped).await; } => {
                info!("Stopping {} controller", kind);
                return Ok(());
            }
            _ = &mut sync_deadline, if !deadline_passed => {
                deadline_passed = true;
                if !cache.is_synced() {
                    warn!("Timed out waiting for {} cache to sync, continuing unsynced", kind);
                }
            }
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let was_synced = cache.is_synced();
                    if let Err(e) = cache.apply(event, handler).await {
                        warn!("Stopping {} controller: {}", kind, e);
                        return Err(e);
                    }
                    if !was_synced && cache.is_synced() {
                        info!("{} cache synced with {} objects", kind, cache.object_count());
                    }
                }
                Some(Err(e)) => warn!("{} watch error: {}", kind, e),
                None => {
                    debug!("{} watch stream ended", kind);
                    return Ok(());
                }
            },
        }
    }
}
