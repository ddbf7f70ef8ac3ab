//! Ledger & document synchronization engine.
//!
//! Single-tenant financial record keeping for a small business: cash
//! movements, invoices and quotes, dashboard KPIs, and last-writer-wins
//! synchronization of the whole state with a remote store. UI concerns
//! (rendering, PDF layout, form wiring) live outside and call in through
//! [`Ledger`], [`SyncEngine`] and the export/render interfaces.

pub use aggregate::{DashboardSummary, LastMovement, Window};
pub use business::BusinessConfig;
pub use document::{
    Client, Document, DocumentDraft, DocumentKind, LineItem, parse_items_from_text,
};
pub use error::{LedgerError, ValidationError};
pub use export::movements_to_csv;
pub use movement::{Movement, MovementDraft, MovementKind};
pub use ops::{Ledger, LedgerBuilder, ValidationRules};
pub use render::{DocumentRender, RenderHeader, RenderLine, RenderMeta};
pub use store::EntityStore;
pub use sync::{
    HttpRemoteStore, MemoryRemoteStore, PullOutcome, PushOutcome, RemoteSnapshot, RemoteStore,
    Snapshot, SyncEngine, SyncError,
};

pub mod aggregate;
mod business;
mod document;
mod error;
mod export;
pub mod money;
mod movement;
mod ops;
pub mod projection;
mod render;
mod store;
mod sync;
mod wire;

type ResultEngine<T> = Result<T, LedgerError>;
