use crate::store::{StoreClient, StoreError};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Persistence state shared by every entity. A record starts as a `Draft`
/// with no identity; the first successful save binds it to a store-issued id
/// and it never goes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordMeta {
    Draft,
    Persisted {
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl RecordMeta {
    pub fn is_draft(&self) -> bool {
        matches!(self, RecordMeta::Draft)
    }

    pub fn exists(&self) -> bool {
        matches!(self, RecordMeta::Persisted { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            RecordMeta::Persisted { id, .. } => Some(id),
            RecordMeta::Draft => None,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordMeta::Persisted { created_at, .. } => Some(*created_at),
            RecordMeta::Draft => None,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            RecordMeta::Persisted { updated_at, .. } => Some(*updated_at),
            RecordMeta::Draft => None,
        }
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        RecordMeta::Draft
    }
}

/// Flat wire shape of the shared fields: `{id?, exists, createdAt?, updatedAt?}`.
/// Entities embed `RecordMeta` with `#[serde(flatten)]`, which emits these
/// before the entity's own fields without any dispatch machinery.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Serialize for RecordMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            RecordMeta::Draft => MetaWire {
                id: None,
                exists: false,
                created_at: None,
                updated_at: None,
            },
            RecordMeta::Persisted {
                id,
                created_at,
                updated_at,
            } => MetaWire {
                id: Some(id.clone()),
                exists: true,
                created_at: Some(*created_at),
                updated_at: Some(*updated_at),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = MetaWire::deserialize(deserializer)?;
        match (wire.exists, wire.id, wire.created_at, wire.updated_at) {
            (true, Some(id), Some(created_at), Some(updated_at)) => Ok(RecordMeta::Persisted {
                id,
                created_at,
                updated_at,
            }),
            _ => Ok(RecordMeta::Draft),
        }
    }
}

/// The uniform persistence contract. Each entity names its collection and
/// exposes its shared metadata; `save`/`update`/`delete` below work the same
/// way for all of them.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn id(&self) -> Option<&str> {
        self.meta().id()
    }

    /// The bound store location. Drafts have none.
    fn path(&self) -> Result<String, StoreError> {
        match self.meta().id() {
            Some(id) => Ok(format!("{}/{}", Self::COLLECTION, id)),
            None => Err(StoreError::Unbound),
        }
    }

    /// Flat mapping handed to route handlers as the response body: the shared
    /// fields first, then the entity's own.
    fn serialized_data(&self) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(self).map_err(StoreError::Serialize)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Serialize(<serde_json::Error as serde::ser::Error>::custom(
                "record did not serialize to an object",
            ))),
        }
    }

    fn from_value(value: Value) -> Result<Self, StoreError> {
        serde_json::from_value(value).map_err(StoreError::Serialize)
    }
}

/// One-shot create, update-in-place thereafter.
///
/// A draft is bound to a freshly allocated child key and becomes `Persisted`
/// with `created_at == updated_at`; every save stamps `updated_at` and writes
/// the full serialized snapshot. Write failures propagate unchanged, and a
/// failed first write leaves the in-memory record already bound.
pub async fn save<R, S>(store: &S, record: &mut R) -> Result<(), StoreError>
where
    R: Record,
    S: StoreClient,
{
    let now = Utc::now();
    if record.meta().is_draft() {
        let id = store.push_key(R::COLLECTION).await?;
        *record.meta_mut() = RecordMeta::Persisted {
            id,
            created_at: now,
            updated_at: now,
        };
    } else if let RecordMeta::Persisted { updated_at, .. } = record.meta_mut() {
        *updated_at = now;
    }

    let data = record.serialized_data()?;
    let path = record.path()?;
    store.put(&path, Value::Object(data)).await
}

/// Merge only the given fields into the stored record, stamping `updatedAt`
/// in the same write. The in-memory record is deliberately left alone;
/// callers keep it consistent themselves.
pub async fn update<R, S>(store: &S, record: &R, mut patch: Map<String, Value>) -> Result<(), StoreError>
where
    R: Record,
    S: StoreClient,
{
    let stamp = serde_json::to_value(Utc::now()).map_err(StoreError::Serialize)?;
    patch.insert("updatedAt".to_string(), stamp);
    store.patch(&record.path()?, patch).await
}

/// Remove the record from the store. Consuming the record makes the handle
/// unusable for any further persistence call; there is no undelete.
pub async fn delete<R, S>(store: &S, record: R) -> Result<(), StoreError>
where
    R: Record,
    S: StoreClient,
{
    let path = record.path()?;
    store.remove(&path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Note {
        #[serde(flatten)]
        meta: RecordMeta,
        body: String,
    }

    impl Record for Note {
        const COLLECTION: &'static str = "notes";

        fn meta(&self) -> &RecordMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut RecordMeta {
            &mut self.meta
        }
    }

    #[test]
    fn draft_serializes_with_exists_false_and_no_id() {
        let note = Note {
            meta: RecordMeta::Draft,
            body: "hello".to_string(),
        };
        let data = note.serialized_data().unwrap();
        assert_eq!(data["exists"], json!(false));
        assert!(!data.contains_key("id"));
        assert!(!data.contains_key("createdAt"));
        assert_eq!(data["body"], json!("hello"));
    }

    #[test]
    fn persisted_meta_round_trips_through_the_wire_shape() {
        let now = Utc::now();
        let note = Note {
            meta: RecordMeta::Persisted {
                id: "-K123".to_string(),
                created_at: now,
                updated_at: now,
            },
            body: "hello".to_string(),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["exists"], json!(true));
        assert_eq!(value["id"], json!("-K123"));

        let back = Note::from_value(value).unwrap();
        assert_eq!(back.meta, note.meta);
        assert_eq!(back.body, "hello");
    }

    #[test]
    fn missing_exists_flag_deserializes_as_draft() {
        let note = Note::from_value(json!({"body": "x"})).unwrap();
        assert!(note.meta.is_draft());
    }

    #[test]
    fn drafts_have_no_path() {
        let note = Note {
            meta: RecordMeta::Draft,
            body: String::new(),
        };
        assert!(matches!(note.path(), Err(StoreError::Unbound)));
    }
}
