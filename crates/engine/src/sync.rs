//! Whole-snapshot synchronization with a remote store.
//!
//! The unit of sync is the full `{movements, documents, config}` triple,
//! keyed by an opaque authenticated identity. The merge strategy is
//! last-writer-wins: `push` replaces the remote record, `pull` hands back the
//! remote record for wholesale local adoption. There is no field-level merge
//! and no conflict detection; the [`RemoteStore`] trait is the seam where a
//! smarter strategy could be swapped in without touching the ledger.
//!
//! Operations on one identity are serialized, and each carries a monotonic
//! sequence number: a response that lost the race to a newer request of the
//! same kind comes back as `Superseded` instead of being applied out of
//! order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{BusinessConfig, Document, Movement};

/// The full local state triple, the unit of synchronization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub movements: Vec<Movement>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub config: BusinessConfig,
}

/// One remote record per identity: the snapshot plus the write timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    #[serde(default)]
    pub movements: Vec<Movement>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub config: BusinessConfig,
    pub updated_at: DateTime<Utc>,
}

impl RemoteSnapshot {
    pub fn new(snapshot: Snapshot, updated_at: DateTime<Utc>) -> Self {
        Self {
            movements: snapshot.movements,
            documents: snapshot.documents,
            config: snapshot.config,
            updated_at,
        }
    }

    /// Drops the timestamp, leaving the triple for local adoption.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            movements: self.movements,
            documents: self.documents,
            config: self.config,
        }
    }
}

/// Sync transport and protocol errors. Local state is never touched when one
/// of these comes back.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote rejected request: {status} {message}")]
    Remote { status: u16, message: String },
    #[error("invalid remote url: {0}")]
    Url(String),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of a pull. `NotFound` is informational, not a failure: the
/// identity simply has no cloud state yet and local data stays untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum PullOutcome {
    Snapshot(RemoteSnapshot),
    NotFound,
    Superseded,
}

/// Result of a push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Superseded,
}

/// Storage backend holding one [`RemoteSnapshot`] per identity.
pub trait RemoteStore {
    /// Reads the record for `identity`; `None` when it does not exist.
    fn fetch(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<RemoteSnapshot>, SyncError>> + Send;

    /// Replaces the record for `identity`.
    fn store(
        &self,
        identity: &str,
        snapshot: &RemoteSnapshot,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

#[derive(Debug, Default)]
struct IdentityState {
    push_seq: AtomicU64,
    pull_seq: AtomicU64,
    serial: Mutex<()>,
}

/// Last-writer-wins synchronizer over a [`RemoteStore`].
#[derive(Debug)]
pub struct SyncEngine<R> {
    remote: R,
    identities: StdMutex<HashMap<String, Arc<IdentityState>>>,
}

impl<R: RemoteStore> SyncEngine<R> {
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            identities: StdMutex::new(HashMap::new()),
        }
    }

    fn identity_state(&self, identity: &str) -> Arc<IdentityState> {
        let mut identities = self
            .identities
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        identities.entry(identity.to_string()).or_default().clone()
    }

    /// Replaces the remote record with `snapshot`, stamping `updated_at`.
    ///
    /// Pushing the same snapshot twice yields the same remote state. When a
    /// newer push for the same identity is already queued, this one is
    /// skipped: the newer write would win anyway.
    pub async fn push(&self, identity: &str, snapshot: Snapshot) -> Result<PushOutcome, SyncError> {
        let state = self.identity_state(identity);
        let seq = state.push_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _serial = state.serial.lock().await;
        if state.push_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(identity, "push superseded before reaching the remote");
            return Ok(PushOutcome::Superseded);
        }
        let record = RemoteSnapshot::new(snapshot, Utc::now());
        self.remote.store(identity, &record).await?;
        tracing::debug!(identity, "pushed snapshot");
        Ok(PushOutcome::Pushed)
    }

    /// Fetches the remote record for local adoption.
    ///
    /// The caller applies the returned snapshot with
    /// [`Ledger::adopt_snapshot`]; a stale response (a newer pull was issued
    /// while this one was in flight) is reported as `Superseded` and must not
    /// be applied.
    ///
    /// [`Ledger::adopt_snapshot`]: crate::Ledger::adopt_snapshot
    pub async fn pull(&self, identity: &str) -> Result<PullOutcome, SyncError> {
        let state = self.identity_state(identity);
        let seq = state.pull_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _serial = state.serial.lock().await;
        if state.pull_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(identity, "pull superseded before reaching the remote");
            return Ok(PullOutcome::Superseded);
        }
        let fetched = self.remote.fetch(identity).await?;
        if state.pull_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!(identity, "discarding stale pull response");
            return Ok(PullOutcome::Superseded);
        }
        match fetched {
            Some(record) => {
                tracing::debug!(identity, "pulled snapshot");
                Ok(PullOutcome::Snapshot(record))
            }
            None => Ok(PullOutcome::NotFound),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Remote store over HTTP: one JSON record per identity at
/// `{base}/snapshots/{identity}`.
#[derive(Clone, Debug)]
pub struct HttpRemoteStore {
    base_url: reqwest::Url,
    http: reqwest::Client,
}

impl HttpRemoteStore {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|err| SyncError::Url(format!("{base_url}: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, identity: &str) -> Result<reqwest::Url, SyncError> {
        self.base_url
            .join(&format!("snapshots/{identity}"))
            .map_err(|err| SyncError::Url(format!("snapshots/{identity}: {err}")))
    }

    async fn remote_error(res: reqwest::Response) -> SyncError {
        let status = res.status().as_u16();
        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        SyncError::Remote { status, message }
    }
}

impl RemoteStore for HttpRemoteStore {
    fn fetch(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<RemoteSnapshot>, SyncError>> + Send {
        async move {
            let endpoint = self.endpoint(identity)?;
            let res = self.http.get(endpoint).send().await?;
            if res.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !res.status().is_success() {
                return Err(Self::remote_error(res).await);
            }
            let record = res.json::<RemoteSnapshot>().await?;
            Ok(Some(record))
        }
    }

    fn store(
        &self,
        identity: &str,
        snapshot: &RemoteSnapshot,
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        async move {
            let endpoint = self.endpoint(identity)?;
            let res = self.http.put(endpoint).json(snapshot).send().await?;
            if !res.status().is_success() {
                return Err(Self::remote_error(res).await);
            }
            Ok(())
        }
    }
}

/// In-memory remote store for tests and offline demos.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    records: StdMutex<HashMap<String, RemoteSnapshot>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn fetch(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<RemoteSnapshot>, SyncError>> + Send {
        let record = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(identity)
            .cloned();
        async move { Ok(record) }
    }

    fn store(
        &self,
        identity: &str,
        snapshot: &RemoteSnapshot,
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(identity.to_string(), snapshot.clone());
        async move { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_snapshot_wire_format_is_camel_case() {
        let record = RemoteSnapshot::new(Snapshot::default(), Utc::now());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("movements").is_some());
        assert!(value.get("documents").is_some());
        assert!(value.get("config").is_some());
    }

    #[test]
    fn remote_snapshot_round_trips() {
        let record = RemoteSnapshot::new(Snapshot::default(), Utc::now());
        let raw = serde_json::to_string(&record).unwrap();
        let restored: RemoteSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, record);
    }
}
