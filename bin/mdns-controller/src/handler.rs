//! Lifecycle callbacks for watched route objects

use crate::error::ControllerError;
use async_trait::async_trait;
use mdns_api::RouteObject;
use mdns_core::{Action, Record, RecordBuilder};
use tokio::sync::mpsc;
use tracing::debug;

/// Receives add/update/delete callbacks for one route kind
#[async_trait]
pub trait RouteEventHandler<K: RouteObject>: Send + Sync {
    async fn on_add(&self, route: &K) -> Result<(), ControllerError>;

    async fn on_update(&self, old: &K, new: &K) -> Result<(), ControllerError>;

    async fn on_delete(&self, route: &K) -> Result<(), ControllerError>;
}

/// RecordPublisher builds records for route events and forwards them onto the
/// shared outbound channel.
///
/// Sending waits while the channel is full, so a slow consumer throttles every
/// producer sharing the channel.
pub struct RecordPublisher {
    builder: RecordBuilder,
    notify: mpsc::Sender<Record>,
}

impl RecordPublisher {
    pub fn new(builder: RecordBuilder, notify: mpsc::Sender<Record>) -> Self {
        Self { builder, notify }
    }

    pub fn builder(&self) -> &RecordBuilder {
        &self.builder
    }

    async fn forward(&self, records: Vec<Record>) -> Result<(), ControllerError> {
        for record in records {
            debug!("Forwarding {} record for {}", record.action, record.name);
            self.notify
                .send(record)
                .await
                .map_err(|_| ControllerError::ChannelClosed)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<K: RouteObject> RouteEventHandler<K> for RecordPublisher {
    async fn on_add(&self, route: &K) -> Result<(), ControllerError> {
        self.forward(self.builder.build(route, Action::Added)).await
    }

    /// Withdraw everything the old version advertised before announcing the new
    /// version. Each side is built on its own, so a broken rule on one side
    /// does not hold back the other.
    async fn on_update(&self, old: &K, new: &K) -> Result<(), ControllerError> {
        let withdrawn = self.builder.build(old, Action::Deleted);
        let announced = self.builder.build(new, Action::Added);

        self.forward(withdrawn).await?;
        self.forward(announced).await
    }

    async fn on_delete(&self, route: &K) -> Result<(), ControllerError> {
        self.forward(self.builder.build(route, Action::Deleted)).await
    }
}
