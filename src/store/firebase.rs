use super::{compare_index_values, keys::PushIdGenerator, StoreClient, StoreError};
use crate::configuration::StoreSettings;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::Instrument;

/// REST client for the hosted hierarchical database.
///
/// Every operation maps onto one HTTP request against `{base}/{path}.json`;
/// failures are surfaced unchanged and nothing is retried here.
pub struct FirebaseStore {
    base_url: String,
    auth_token: Option<String>,
    http_client: reqwest::Client,
    keygen: PushIdGenerator,
}

impl FirebaseStore {
    pub fn new(settings: &StoreSettings) -> Self {
        FirebaseStore {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth_token: settings.auth_token.clone(),
            http_client: reqwest::Client::new(),
            keygen: PushIdGenerator::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn auth_query(&self) -> Vec<(&'static str, String)> {
        match &self.auth_token {
            Some(token) => vec![("auth", token.clone())],
            None => Vec::new(),
        }
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(code = status.as_u16(), body = %body, "store request rejected");
        Err(StoreError::Status {
            code: status.as_u16(),
            body,
        })
    }

    /// The filtered REST reads return an unordered `{key: record}` object, so
    /// the requested child ordering is re-applied before handing results back.
    fn sorted_children(body: Value, order_child: &str) -> Vec<Value> {
        let children = match body {
            Value::Object(children) => children,
            _ => return Vec::new(),
        };
        let mut entries: Vec<(String, Value)> = children.into_iter().collect();
        entries.sort_by(|(a_key, a), (b_key, b)| {
            let a_index = a.get(order_child).unwrap_or(&Value::Null);
            let b_index = b.get(order_child).unwrap_or(&Value::Null);
            compare_index_values(a_index, b_index).then_with(|| a_key.cmp(b_key))
        });
        entries.into_iter().map(|(_, value)| value).collect()
    }
}

#[async_trait]
impl StoreClient for FirebaseStore {
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let span = tracing::info_span!("store_put", path = %path);
        let response = self
            .http_client
            .put(self.url(path))
            .query(&self.auth_query())
            .json(&value)
            .send()
            .instrument(span)
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn patch(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let span = tracing::info_span!("store_patch", path = %path);
        let response = self
            .http_client
            .patch(self.url(path))
            .query(&self.auth_query())
            .json(&Value::Object(fields))
            .send()
            .instrument(span)
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let span = tracing::info_span!("store_get", path = %path);
        let response = self
            .http_client
            .get(self.url(path))
            .query(&self.auth_query())
            .send()
            .instrument(span)
            .await?;
        let body: Value = Self::expect_success(response).await?.json().await?;
        Ok(if body.is_null() { None } else { Some(body) })
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let span = tracing::info_span!("store_remove", path = %path);
        let response = self
            .http_client
            .delete(self.url(path))
            .query(&self.auth_query())
            .send()
            .instrument(span)
            .await?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn push_key(&self, _path: &str) -> Result<String, StoreError> {
        // Child keys are minted locally, the same way the store's own SDK
        // does it; nothing is written until the record is saved.
        Ok(self.keygen.next_id())
    }

    async fn query_tail(
        &self,
        path: &str,
        order_child: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError> {
        let span = tracing::info_span!("store_query_tail", path = %path, order_child = %order_child);
        let mut query = self.auth_query();
        query.push(("orderBy", format!("\"{}\"", order_child)));
        query.push(("limitToLast", limit.to_string()));
        let response = self
            .http_client
            .get(self.url(path))
            .query(&query)
            .send()
            .instrument(span)
            .await?;
        let body: Value = Self::expect_success(response).await?.json().await?;
        Ok(Self::sorted_children(body, order_child))
    }

    async fn query_equal(
        &self,
        path: &str,
        child: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError> {
        let span = tracing::info_span!("store_query_equal", path = %path, child = %child);
        let mut query = self.auth_query();
        query.push(("orderBy", format!("\"{}\"", child)));
        query.push(("equalTo", format!("\"{}\"", value)));
        query.push(("limitToFirst", limit.to_string()));
        let response = self
            .http_client
            .get(self.url(path))
            .query(&query)
            .send()
            .instrument(span)
            .await?;
        let body: Value = Self::expect_success(response).await?.json().await?;
        Ok(Self::sorted_children(body, child))
    }
}
