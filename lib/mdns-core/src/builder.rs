//! Turns route objects into records

use crate::hosts::{canonical_name, extract_hosts};
use crate::record::{Action, Record};
use crate::rule::parse;
use crate::Result;
use kube::ResourceExt;
use mdns_api::RouteObject;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds records for route objects, attaching a fixed snapshot of addresses.
///
/// The address list is captured once and never refreshed, so every record a
/// builder produces carries the same IPs.
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    ips: Arc<[String]>,
}

impl RecordBuilder {
    pub fn new(ips: Vec<String>) -> Self {
        Self { ips: ips.into() }
    }

    /// Addresses attached to every record
    pub fn ips(&self) -> &[String] {
        &self.ips
    }

    /// Build records for every route entry of `route`.
    ///
    /// An entry whose expression fails to parse or extract is logged and
    /// contributes nothing; the other entries are unaffected.
    pub fn build<K: RouteObject>(&self, route: &K, action: Action) -> Vec<Record> {
        let namespace = route.route_namespace();
        let mut records = Vec::new();

        for expression in route.rule_expressions() {
            match self.build_entry(K::SOURCE_TYPE, &namespace, expression, action) {
                Ok(entry_records) => records.extend(entry_records),
                Err(e) => warn!(
                    namespace = %namespace,
                    name = %route.name_any(),
                    rule = expression,
                    "Skipping route entry: {}",
                    e
                ),
            }
        }

        records
    }

    /// Build records for a single rule expression.
    ///
    /// Parse and extraction failures abort the whole entry. A host that cannot
    /// be canonicalized is logged and skipped without affecting its siblings.
    pub fn build_entry(
        &self,
        source_type: &str,
        namespace: &str,
        expression: &str,
        action: Action,
    ) -> Result<Vec<Record>> {
        let rule = parse(expression)?;
        let hosts = extract_hosts(&rule)?;

        let mut records = Vec::with_capacity(hosts.len());
        for host in hosts {
            let name = match canonical_name(&host) {
                Ok(name) => name,
                Err(e) => {
                    warn!("Unable to parse hostname {}: {}", host, e);
                    continue;
                }
            };

            debug!("Built {} record for {} in {}", action, name, namespace);
            records.push(Record {
                source_type: source_type.to_string(),
                action,
                name,
                namespace: namespace.to_string(),
                ips: self.ips.to_vec(),
            });
        }

        Ok(records)
    }
}
