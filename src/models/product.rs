use crate::errors::AppError;
use crate::models::record::{Record, RecordMeta};
use crate::store::StoreClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A listing posted by a user. The price is stored as given; nothing here
/// rejects a negative amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub seller_id: String,
    #[serde(default)]
    pub image: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record for Product {
    const COLLECTION: &'static str = "products";

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

impl Product {
    pub fn new(
        seller_id: &str,
        image: String,
        title: String,
        description: String,
        price: f64,
        tags: Vec<String>,
    ) -> Self {
        Product {
            meta: RecordMeta::Draft,
            seller_id: seller_id.to_string(),
            image,
            title,
            description,
            price,
            tags,
        }
    }

    pub async fn find_by_id<S: StoreClient>(store: &S, product_id: &str) -> Result<Self, AppError> {
        let path = format!("{}/{}", Self::COLLECTION, product_id);
        let value = store
            .get(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Product doesn't exist".to_string()))?;
        Ok(Self::from_value(value)?)
    }

    /// Keyword search over title and description. The whole collection is
    /// loaded and filtered client side with a case-sensitive substring match,
    /// and `limit` is accepted but not applied on this path; every matching
    /// record comes back.
    pub async fn search<S: StoreClient>(
        store: &S,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<Self>, AppError> {
        let _ = limit;
        let mut results = Vec::new();
        if let Some(Value::Object(children)) = store.get(Self::COLLECTION).await? {
            for (_, value) in children {
                let product = Self::from_value(value)?;
                if product.title.contains(keyword) || product.description.contains(keyword) {
                    results.push(product);
                }
            }
        }
        Ok(results)
    }

    /// The last `limit` listings ordered by creation time. The store's
    /// ascending order is handed back as-is.
    pub async fn recent<S: StoreClient>(store: &S, limit: u32) -> Result<Vec<Self>, AppError> {
        let values = store.query_tail(Self::COLLECTION, "createdAt", limit).await?;
        values
            .into_iter()
            .map(|value| Self::from_value(value).map_err(AppError::from))
            .collect()
    }
}
