use async_trait::async_trait;
use hours_common::{HoursError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Named storage areas.
///
/// `Local` holds data private to one installation (the rate cache);
/// `Sync` holds user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    Local,
    Sync,
}

impl StorageArea {
    pub fn name(&self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

/// Asynchronous JSON key-value storage.
///
/// `get` returns only the requested keys that exist; `set` merges the given
/// entries into the area. There is no locking: concurrent writers race and
/// the last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>>;
    async fn set(&self, area: StorageArea, entries: Map<String, Value>) -> Result<()>;
}

fn pick(source: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| source.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// In-memory store
#[derive(Default)]
pub struct InMemoryStore {
    areas: RwLock<HashMap<StorageArea, Map<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>> {
        let areas = self
            .areas
            .read()
            .map_err(|_| HoursError::Storage("Lock error".into()))?;
        Ok(areas
            .get(&area)
            .map(|values| pick(values, keys))
            .unwrap_or_default())
    }

    async fn set(&self, area: StorageArea, entries: Map<String, Value>) -> Result<()> {
        let mut areas = self
            .areas
            .write()
            .map_err(|_| HoursError::Storage("Lock error".into()))?;
        areas.entry(area).or_default().extend(entries);
        Ok(())
    }
}

/// Store persisting each area as one JSON object file (`local.json`,
/// `sync.json`) inside a directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, area: StorageArea) -> PathBuf {
        self.dir.join(format!("{}.json", area.name()))
    }

    async fn read_area(&self, area: StorageArea) -> Result<Map<String, Value>> {
        let path = self.path(area);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(HoursError::Storage(format!(
                "{} does not hold a JSON object (found {})",
                path.display(),
                other
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self.read_area(area).await?;
        Ok(pick(&values, keys))
    }

    async fn set(&self, area: StorageArea, entries: Map<String, Value>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // An unreadable area is replaced rather than left blocking every write
        let mut values = match self.read_area(area).await {
            Ok(values) => values,
            Err(HoursError::Io(e)) => return Err(HoursError::Io(e)),
            Err(e) => {
                warn!("Overwriting unreadable {} storage area: {}", area.name(), e);
                Map::new()
            }
        };
        values.extend(entries);

        let path = self.path(area);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&Value::Object(values))?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote {} storage area to {}", area.name(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store_scopes_areas() {
        let store = InMemoryStore::new();
        store
            .set(StorageArea::Sync, entries(json!({ "hourlyWage": 250.0 })))
            .await
            .unwrap();

        let sync = store.get(StorageArea::Sync, &["hourlyWage", "currency"]).await.unwrap();
        assert_eq!(sync.len(), 1);
        assert_eq!(sync["hourlyWage"], json!(250.0));

        let local = store.get(StorageArea::Local, &["hourlyWage"]).await.unwrap();
        assert!(local.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_store_last_write_wins() {
        let store = InMemoryStore::new();
        store
            .set(StorageArea::Local, entries(json!({ "a": 1, "b": 2 })))
            .await
            .unwrap();
        store
            .set(StorageArea::Local, entries(json!({ "a": 3 })))
            .await
            .unwrap();

        let values = store.get(StorageArea::Local, &["a", "b"]).await.unwrap();
        assert_eq!(values["a"], json!(3));
        assert_eq!(values["b"], json!(2));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = JsonFileStore::new(dir.path().join("nested"));
        store
            .set(StorageArea::Sync, entries(json!({ "currency": "USD" })))
            .await
            .unwrap();
        store
            .set(StorageArea::Sync, entries(json!({ "hourlyWage": 20.0 })))
            .await
            .unwrap();

        let reopened = JsonFileStore::new(dir.path().join("nested"));
        let values = reopened
            .get(StorageArea::Sync, &["currency", "hourlyWage"])
            .await
            .unwrap();
        assert_eq!(values["currency"], json!("USD"));
        assert_eq!(values["hourlyWage"], json!(20.0));
        assert!(dir.path().join("nested").join("sync.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_area_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let values = store.get(StorageArea::Local, &["exchangeRatesData"]).await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.json"), "[1, 2, 3]").unwrap();

        let store = JsonFileStore::new(dir.path());
        let result = store.get(StorageArea::Local, &["x"]).await;
        assert!(matches!(result, Err(HoursError::Storage(_))));
    }

    #[tokio::test]
    async fn test_file_store_write_replaces_corrupt_area() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.json"), r#"{"exchangeRatesData": "#).unwrap();

        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.get(StorageArea::Local, &["lastUpdateTime"]).await,
            Err(HoursError::Serialization(_))
        ));

        store
            .set(StorageArea::Local, entries(json!({ "lastUpdateTime": 1 })))
            .await
            .unwrap();

        let values = store.get(StorageArea::Local, &["lastUpdateTime"]).await.unwrap();
        assert_eq!(values["lastUpdateTime"], json!(1));
    }
}
