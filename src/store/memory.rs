use super::{compare_index_values, keys::PushIdGenerator, StoreClient, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Mutex, RwLock};

/// In-process store with the same contract as the hosted one. Entities take
/// the store client as an explicit capability, so the test suite substitutes
/// this fake for the real REST client.
#[derive(Default)]
pub struct MemoryStore {
    tree: RwLock<Map<String, Value>>,
    keygen: PushIdGenerator,
    fail_matching: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write (put/patch/remove) whose path contains `fragment`
    /// fail until cleared. Lets tests cut a multi-step flow at a chosen step.
    pub fn fail_writes_matching(&self, fragment: &str) {
        *self
            .fail_matching
            .lock()
            .expect("failure injection lock poisoned") = Some(fragment.to_string());
    }

    pub fn clear_failures(&self) {
        *self
            .fail_matching
            .lock()
            .expect("failure injection lock poisoned") = None;
    }

    /// Snapshot of the whole tree, for assertions on raw stored state.
    pub fn dump(&self) -> Value {
        Value::Object(self.tree.read().expect("store tree lock poisoned").clone())
    }

    fn check_write(&self, path: &str) -> Result<(), StoreError> {
        let guard = self
            .fail_matching
            .lock()
            .expect("failure injection lock poisoned");
        if let Some(fragment) = guard.as_ref() {
            if path.contains(fragment.as_str()) {
                return Err(StoreError::Status {
                    code: 500,
                    body: "injected store failure".to_string(),
                });
            }
        }
        Ok(())
    }

    fn children_of(&self, path: &str) -> Map<String, Value> {
        let tree = self.tree.read().expect("store tree lock poisoned");
        match node_at(&tree, path) {
            Some(Value::Object(children)) => children.clone(),
            _ => Map::new(),
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

fn node_at<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = segments(path).into_iter();
    let first = segments.next()?;
    let mut node = root.get(first)?;
    for segment in segments {
        node = node.get(segment)?;
    }
    Some(node)
}

/// Walk to the object at `path`, creating intermediate objects on the way.
fn object_at_mut<'a>(root: &'a mut Map<String, Value>, path: &str) -> &'a mut Map<String, Value> {
    let mut node = root;
    for segment in segments(path) {
        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        node = child
            .as_object_mut()
            .expect("child was just coerced to an object");
    }
    node
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn put(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_write(path)?;
        let mut tree = self.tree.write().expect("store tree lock poisoned");
        let all = segments(path);
        let (last, parents) = all.split_last().ok_or(StoreError::Unbound)?;
        let parent = object_at_mut(&mut tree, &parents.join("/"));
        parent.insert((*last).to_string(), value);
        Ok(())
    }

    async fn patch(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.check_write(path)?;
        let mut tree = self.tree.write().expect("store tree lock poisoned");
        let target = object_at_mut(&mut tree, path);
        for (key, value) in fields {
            target.insert(key, value);
        }
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let tree = self.tree.read().expect("store tree lock poisoned");
        Ok(node_at(&tree, path).cloned())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.check_write(path)?;
        let mut tree = self.tree.write().expect("store tree lock poisoned");
        let all = segments(path);
        if let Some((last, parents)) = all.split_last() {
            if parents.is_empty() {
                tree.remove(*last);
            } else if let Some(Value::Object(_)) = node_at(&tree, &parents.join("/")) {
                object_at_mut(&mut tree, &parents.join("/")).remove(*last);
            }
        }
        // removing an absent path is a successful no-op
        Ok(())
    }

    async fn push_key(&self, _path: &str) -> Result<String, StoreError> {
        Ok(self.keygen.next_id())
    }

    async fn query_tail(
        &self,
        path: &str,
        order_child: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError> {
        let mut entries: Vec<(String, Value)> = self.children_of(path).into_iter().collect();
        entries.sort_by(|(a_key, a), (b_key, b)| {
            let a_index = a.get(order_child).unwrap_or(&Value::Null);
            let b_index = b.get(order_child).unwrap_or(&Value::Null);
            compare_index_values(a_index, b_index).then_with(|| a_key.cmp(b_key))
        });
        let skip = entries.len().saturating_sub(limit as usize);
        Ok(entries
            .into_iter()
            .skip(skip)
            .map(|(_, value)| value)
            .collect())
    }

    async fn query_equal(
        &self,
        path: &str,
        child: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .children_of(path)
            .into_iter()
            .filter(|(_, record)| record.get(child).and_then(Value::as_str) == Some(value))
            .take(limit as usize)
            .map(|(_, record)| record)
            .collect())
    }
}
