use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, io, path::Path, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, warn};

pub const PROFILE_KEY: &str = "lumo.profile";
pub const WATER_KEY: &str = "lumo.water.today";
pub const MEALS_KEY: &str = "lumo.meals";
pub const TAB_KEY: &str = "lumo.tab";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store: {0}")]
    Read(#[source] io::Error),
    #[error("failed to parse store: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize value: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write store: {0}")]
    Write(#[source] io::Error),
}

/// Flat key to serialized-value map, one JSON document on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KvStore {
    entries: BTreeMap<String, String>,
}

impl KvStore {
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub async fn load_store(path: &Path) -> KvStore {
    match read_store(path).await {
        Ok(store) => store,
        Err(StoreError::Read(err)) if err.kind() == io::ErrorKind::NotFound => KvStore::default(),
        Err(err) => {
            error!("{err}, starting empty");
            KvStore::default()
        }
    }
}

async fn read_store(path: &Path) -> Result<KvStore, StoreError> {
    let bytes = fs::read(path).await.map_err(StoreError::Read)?;
    serde_json::from_slice(&bytes).map_err(StoreError::Parse)
}

pub async fn persist_store(path: &Path, store: &KvStore) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(store).map_err(StoreError::Serialize)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(StoreError::Write)?;
    }
    fs::write(path, payload).await.map_err(StoreError::Write)?;
    Ok(())
}

/// Typed access to the store. Reads fall back to the caller's initial value,
/// writes are best-effort and never fail the caller.
#[derive(Debug)]
pub struct Repository {
    store: KvStore,
    path: Option<PathBuf>,
}

impl Repository {
    pub fn new(path: PathBuf, store: KvStore) -> Self {
        Self {
            store,
            path: Some(path),
        }
    }

    pub async fn open(path: PathBuf) -> Self {
        let store = load_store(&path).await;
        Self::new(path, store)
    }

    pub fn in_memory() -> Self {
        Self {
            store: KvStore::default(),
            path: None,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, initial: T) -> T {
        let Some(raw) = self.store.get_raw(key) else {
            return initial;
        };
        match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, "stored value unreadable, using initial: {err}");
                initial
            }
        }
    }

    pub async fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.set_raw(key, raw),
            Err(err) => {
                warn!(key, "{}", StoreError::Serialize(err));
                return;
            }
        }
        debug!(key, "state cell updated");
        self.flush().await;
    }

    pub async fn remove(&mut self, key: &str) {
        if self.store.remove(key).is_some() {
            self.flush().await;
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys().map(str::to_owned).collect()
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    async fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = persist_store(path, &self.store).await {
            warn!(path = %path.display(), "{err}; keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, Tab, WaterToday};
    use chrono::NaiveDate;
    use std::error::Error as _;

    #[test]
    fn store_error_names_the_step_and_keeps_cause() {
        let err = StoreError::Write(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.to_string(), "failed to write store: denied");
        assert_eq!(err.source().map(|cause| cause.to_string()).as_deref(), Some("denied"));

        let parse = serde_json::from_str::<KvStore>("{").unwrap_err();
        let err = StoreError::Parse(parse);
        assert!(err.to_string().starts_with("failed to parse store: "));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn set_then_get_returns_stored_value() {
        let mut repo = Repository::in_memory();
        let water = WaterToday {
            date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            ml: 750,
            step: 300,
        };
        repo.set(WATER_KEY, &water).await;
        repo.set(TAB_KEY, &Tab::Meals).await;

        let fallback = WaterToday::new(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(repo.get(WATER_KEY, fallback), water);
        assert_eq!(repo.get(TAB_KEY, Tab::Dashboard), Tab::Meals);
    }

    #[test]
    fn missing_key_returns_initial() {
        let repo = Repository::in_memory();
        assert_eq!(repo.get(PROFILE_KEY, Profile::default()), Profile::default());
    }

    #[test]
    fn corrupted_value_returns_initial() {
        let mut store = KvStore::default();
        store.set_raw(TAB_KEY, "{not json");
        store.set_raw(PROFILE_KEY, "[1,2,3]");
        let repo = Repository {
            store,
            path: None,
        };
        assert_eq!(repo.get(TAB_KEY, Tab::Knowledge), Tab::Knowledge);
        assert_eq!(repo.get(PROFILE_KEY, Profile::default()), Profile::default());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut repo = Repository::open(path.clone()).await;
        repo.set(TAB_KEY, &Tab::Profile).await;

        let reopened = Repository::open(path).await;
        assert_eq!(reopened.get(TAB_KEY, Tab::Dashboard), Tab::Profile);
        assert_eq!(reopened.keys(), vec![TAB_KEY.to_string()]);
    }

    #[tokio::test]
    async fn unparsable_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, b"garbage").await.unwrap();

        let store = load_store(&path).await;
        assert_eq!(store, KvStore::default());
    }

    #[tokio::test]
    async fn write_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("blocked");
        tokio::fs::create_dir(&path).await.unwrap();

        let mut repo = Repository::new(path, KvStore::default());
        repo.set(TAB_KEY, &Tab::Meals).await;
        assert_eq!(repo.get(TAB_KEY, Tab::Dashboard), Tab::Meals);
    }

    #[tokio::test]
    async fn remove_drops_key() {
        let mut repo = Repository::in_memory();
        repo.set(TAB_KEY, &Tab::Meals).await;
        repo.remove(TAB_KEY).await;
        assert_eq!(repo.get(TAB_KEY, Tab::Dashboard), Tab::Dashboard);
        assert!(repo.store().get_raw(TAB_KEY).is_none());
    }
}
