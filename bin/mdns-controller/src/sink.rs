//! Record consumer standing in for the mDNS advertiser

use mdns_core::Record;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Log every record until all producers are gone. Returns the number of
/// records that carried addresses.
pub async fn log_records(mut records: mpsc::Receiver<Record>) -> usize {
    let mut publishable = 0;

    while let Some(record) = records.recv().await {
        if !record.has_addresses() {
            warn!(
                source_type = %record.source_type,
                action = %record.action,
                namespace = %record.namespace,
                "Record for {} has no addresses to publish",
                record.name
            );
            continue;
        }

        publishable += 1;
        info!(
            source_type = %record.source_type,
            action = %record.action,
            namespace = %record.namespace,
            ips = ?record.ips,
            "mDNS record {}.local",
            record.name
        );
    }

    info!("Record channel closed after {} publishable records", publishable);
    publishable
}
