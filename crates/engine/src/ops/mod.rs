//! Ledger operations.
//!
//! `Ledger` is the single entry point for local mutation: it owns the entity
//! store, applies validation, keeps the invoice projection consistent and
//! persists after every successful operation. All mutation runs on one
//! logical thread; only the sync engine ever suspends.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::aggregate::{self, DashboardSummary};
use crate::{BusinessConfig, Document, EntityStore, Movement, ResultEngine, Snapshot};

mod documents;
mod movements;

/// Validation rules that are configurable per deployment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationRules {
    /// Reject a document whose `number` is already used by another document.
    /// Off by default: invoices and quotes share a free-form numbering
    /// scheme, and historic data contains duplicates.
    pub unique_document_numbers: bool,
}

#[derive(Debug)]
pub struct Ledger {
    store: EntityStore,
    rules: ValidationRules,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub fn movements(&self) -> &[Movement] {
        self.store.movements()
    }

    pub fn documents(&self) -> &[Document] {
        self.store.documents()
    }

    pub fn config(&self) -> &BusinessConfig {
        self.store.config()
    }

    pub fn rules(&self) -> ValidationRules {
        self.rules
    }

    /// True when the store had no persisted collections at open.
    pub fn is_first_run(&self) -> bool {
        self.store.is_first_run()
    }

    /// Replaces the business configuration and persists it.
    pub fn update_config(&mut self, config: BusinessConfig) -> ResultEngine<()> {
        self.store.config = config;
        self.store.save_config()
    }

    /// Stores a logo image, caching its aspect ratio, and persists.
    pub fn set_logo(&mut self, bytes: Vec<u8>, width: u32, height: u32) -> ResultEngine<()> {
        self.store.config.set_logo(bytes, width, height);
        self.store.save_config()
    }

    /// KPI block for the dashboard, relative to `today`.
    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        aggregate::dashboard_summary(self.store.movements(), today)
    }

    /// Clones the full local state triple for a sync push.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            movements: self.store.movements.clone(),
            documents: self.store.documents.clone(),
            config: self.store.config.clone(),
        }
    }

    /// Replaces all three collections wholesale with a pulled snapshot and
    /// persists each. No item-by-item merge.
    pub fn adopt_snapshot(&mut self, snapshot: Snapshot) -> ResultEngine<()> {
        self.store.movements = snapshot.movements;
        self.store.documents = snapshot.documents;
        self.store.config = snapshot.config;
        self.store.save_movements()?;
        self.store.save_documents()?;
        self.store.save_config()
    }
}

/// The builder for `Ledger`.
#[derive(Default)]
pub struct LedgerBuilder {
    directory: Option<PathBuf>,
    rules: ValidationRules,
}

impl LedgerBuilder {
    /// Root directory for the persisted collections. Without one the ledger
    /// is in-memory only.
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> LedgerBuilder {
        self.directory = Some(directory.into());
        self
    }

    pub fn rules(mut self, rules: ValidationRules) -> LedgerBuilder {
        self.rules = rules;
        self
    }

    /// Construct `Ledger`.
    pub fn build(self) -> ResultEngine<Ledger> {
        let store = match self.directory {
            Some(directory) => EntityStore::open(directory)?,
            None => EntityStore::ephemeral(),
        };
        Ok(Ledger {
            store,
            rules: self.rules,
        })
    }
}
