mod firebase;
mod keys;
mod memory;

pub use firebase::FirebaseStore;
pub use keys::PushIdGenerator;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::cmp::Ordering;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("record is not bound to a store location")]
    Unbound,
    #[error(transparent)]
    Serialize(serde_json::Error),
}

/// Operations the persistence layer issues against the hosted hierarchical
/// store. Every call is a single round trip; there are no retries, no
/// transactions and no cross-call ordering guarantees beyond what the store
/// itself applies.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Write the full value at `path`, replacing whatever was there.
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merge the given top-level keys into the record at `path`. Keys not
    /// named in `fields` keep their stored values.
    async fn patch(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Point read. `None` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Point delete. Removing an absent path is a successful no-op.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Allocate a new unique, chronologically sortable child key under `path`.
    async fn push_key(&self, path: &str) -> Result<String, StoreError>;

    /// Children of `path` ordered ascending by the value of `order_child`,
    /// limited to the last `limit` entries. The ascending order is preserved
    /// in the returned sequence.
    async fn query_tail(
        &self,
        path: &str,
        order_child: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError>;

    /// Children of `path` whose `child` value equals `value`, limited to the
    /// first `limit` entries in key order.
    async fn query_equal(
        &self,
        path: &str,
        child: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError>;
}

/// Ordering used by the child-indexed queries. Timestamps are stored as
/// RFC 3339 strings, so both sides are parsed as instants when possible and
/// compared as JSON literals otherwise.
pub(crate) fn compare_index_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (parse_instant(a), parse_instant(b)) {
        return a.cmp(&b);
    }
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn parse_instant(value: &Value) -> Option<DateTime<FixedOffset>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}
