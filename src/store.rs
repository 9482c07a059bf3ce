//! Opslag van de platte veldsnapshot onder één vaste sleutel.
//!
//! Bewaard wordt de ruwe snapshot, niet het projectmodel: bij het laden
//! reconstrueert de synthese de vorm uit de opgeslagen sectieaantallen.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;

use crate::form::FlatSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stockage local indisponible")]
    Unavailable,
    #[error("erreur du stockage local : {0}")]
    Backend(String),
    #[error("projet sauvegardé illisible : {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Sleutel/waarde-opslag met tekstwaarden, zoals `localStorage`.
pub trait SnapshotStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory opslag voor native builds en tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<S: SnapshotStorage + ?Sized> SnapshotStorage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }
}

/// Resultaat van [`ProjectStore::load`]. Geen opgeslagen project is een
/// melding, geen fout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    NotFound,
    Loaded(FlatSnapshot),
}

#[derive(Debug)]
pub struct ProjectStore<S> {
    storage: S,
    key: String,
}

impl<S: SnapshotStorage> ProjectStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overschrijft een eerder opgeslagen snapshot (last writer wins).
    pub fn save(&self, snapshot: &FlatSnapshot) -> Result<(), StoreError> {
        let text = serde_json::to_string(snapshot)?;
        self.storage.set_item(&self.key, &text)?;
        log::info!("project opgeslagen onder `{}` ({} velden)", self.key, snapshot.len());
        Ok(())
    }

    pub fn load(&self) -> Result<LoadOutcome, StoreError> {
        let Some(text) = self.storage.get_item(&self.key)? else {
            log::info!("geen project gevonden onder `{}`", self.key);
            return Ok(LoadOutcome::NotFound);
        };
        let snapshot: FlatSnapshot = serde_json::from_str(&text)?;
        log::info!("project geladen uit `{}` ({} velden)", self.key, snapshot.len());
        Ok(LoadOutcome::Loaded(snapshot))
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{SnapshotStorage, StoreError};

    /// `window.localStorage`.
    #[derive(Debug, Clone)]
    pub struct BrowserStorage {
        inner: web_sys::Storage,
    }

    impl BrowserStorage {
        pub fn local() -> Result<Self, StoreError> {
            let inner = web_sys::window()
                .and_then(|window| window.local_storage().ok().flatten())
                .ok_or(StoreError::Unavailable)?;
            Ok(Self { inner })
        }
    }

    impl SnapshotStorage for BrowserStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner
                .get_item(key)
                .map_err(|err| StoreError::Backend(format!("{err:?}")))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner
                .set_item(key, value)
                .map_err(|err| StoreError::Backend(format!("{err:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, MemoryStorage, ProjectStore, SnapshotStorage, StoreError};
    use crate::form::FlatSnapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_key_is_not_found() {
        let store = ProjectStore::new(MemoryStorage::new(), "gardeCorpsProject");
        assert_eq!(store.load().unwrap(), LoadOutcome::NotFound);
    }

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let store = ProjectStore::new(MemoryStorage::new(), "gardeCorpsProject");
        let snapshot: FlatSnapshot = [("nombre_morceaux", "2"), ("poteau_dims", "40x40")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), LoadOutcome::Loaded(snapshot));
    }

    #[test]
    fn later_save_overwrites_earlier() {
        let storage = MemoryStorage::new();
        let store = ProjectStore::new(&storage, "k");
        let mut snapshot = FlatSnapshot::new();
        snapshot.insert("a".to_owned(), "1".to_owned());
        store.save(&snapshot).unwrap();
        snapshot.insert("a".to_owned(), "2".to_owned());
        store.save(&snapshot).unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some(r#"{"a":"2"}"#));
    }

    #[test]
    fn corrupt_entry_is_reported() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "{not json").unwrap();
        let store = ProjectStore::new(&storage, "k");
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }
}
