//! Durable entity store.
//!
//! Three independent collections, each persisted as one JSON blob under a
//! fixed file name. Loads fail soft: a missing or corrupt blob resets that
//! collection to its default and the process keeps going. Saves are always a
//! full replace of one collection, serialized only after the new value is
//! fully constructed, so the persisted state is internally consistent per
//! collection at all times.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{BusinessConfig, Document, Movement, ResultEngine};

const MOVEMENTS_FILE: &str = "movements.json";
const DOCUMENTS_FILE: &str = "documents.json";
const CONFIG_FILE: &str = "config.json";

/// Owner of all three collections. No other component holds a long-lived
/// copy; queries hand out references or clones.
#[derive(Debug)]
pub struct EntityStore {
    dir: Option<PathBuf>,
    first_run: bool,
    pub(crate) movements: Vec<Movement>,
    pub(crate) documents: Vec<Document>,
    pub(crate) config: BusinessConfig,
}

impl EntityStore {
    /// Opens the store rooted at `dir`, creating the directory if needed and
    /// loading whatever valid state is there. A collection that fails to
    /// load starts empty; startup never aborts over bad data.
    pub fn open(dir: impl Into<PathBuf>) -> ResultEngine<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let first_run = !dir.join(MOVEMENTS_FILE).exists()
            && !dir.join(DOCUMENTS_FILE).exists()
            && !dir.join(CONFIG_FILE).exists();
        let movements = load_collection(&dir.join(MOVEMENTS_FILE), "movements");
        let documents = load_collection(&dir.join(DOCUMENTS_FILE), "documents");
        let config = load_collection(&dir.join(CONFIG_FILE), "config");
        Ok(Self {
            dir: Some(dir),
            first_run,
            movements,
            documents,
            config,
        })
    }

    /// In-memory store with no persistence, for tests and demos.
    pub fn ephemeral() -> Self {
        Self {
            dir: None,
            first_run: true,
            movements: Vec::new(),
            documents: Vec::new(),
            config: BusinessConfig::default(),
        }
    }

    /// True when no persisted collection existed at open. A first run has
    /// nothing local to lose, so a configured installation may adopt its
    /// cloud state at this point.
    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    /// Persists the movement collection, full replace.
    pub fn save_movements(&self) -> ResultEngine<()> {
        self.persist(MOVEMENTS_FILE, &self.movements)
    }

    /// Persists the document collection, full replace.
    pub fn save_documents(&self) -> ResultEngine<()> {
        self.persist(DOCUMENTS_FILE, &self.documents)
    }

    /// Persists the business configuration, full replace.
    pub fn save_config(&self) -> ResultEngine<()> {
        self.persist(CONFIG_FILE, &self.config)
    }

    fn persist<T: Serialize>(&self, file: &str, value: &T) -> ResultEngine<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let body = serde_json::to_string(value)?;
        std::fs::write(dir.join(file), body)?;
        Ok(())
    }
}

fn load_collection<T: DeserializeOwned + Default>(path: &Path, name: &str) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return T::default(),
        Err(err) => {
            tracing::warn!("failed to read {name} store, starting from defaults: {err}");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("corrupt {name} store, resetting to defaults: {err}");
            T::default()
        }
    }
}
