use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use engine::{
    Client, DocumentDraft, DocumentKind, Ledger, LineItem, MemoryRemoteStore, MovementDraft,
    PullOutcome, PushOutcome, RemoteSnapshot, RemoteStore, Snapshot, SyncEngine, SyncError,
};
use tokio::sync::Semaphore;

fn seeded_ledger() -> Ledger {
    let mut ledger = Ledger::builder().build().unwrap();
    ledger
        .income(MovementDraft {
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            description: "Sale".to_string(),
            category: "Sales".to_string(),
            method: "Cash".to_string(),
            amount: 100.0,
        })
        .unwrap();
    ledger
        .save_document(DocumentDraft {
            kind: DocumentKind::Invoice,
            number: "F-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 2),
            client: Client {
                name: "Acme".to_string(),
                ..Client::default()
            },
            items: vec![LineItem {
                description: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 50.0,
                tax_percent: 10.0,
            }],
            method: "Card".to_string(),
            ..DocumentDraft::default()
        })
        .unwrap();
    ledger
}

#[tokio::test]
async fn pull_without_remote_state_is_not_found_and_local_is_untouched() {
    let ledger = seeded_ledger();
    let before = ledger.snapshot();

    let sync = SyncEngine::new(MemoryRemoteStore::new());
    let outcome = sync.pull("alice").await.unwrap();

    assert_eq!(outcome, PullOutcome::NotFound);
    assert_eq!(ledger.snapshot(), before);
}

#[tokio::test]
async fn push_then_pull_round_trips_the_snapshot() {
    let source = seeded_ledger();
    let sync = SyncEngine::new(MemoryRemoteStore::new());

    let pushed = sync.push("alice", source.snapshot()).await.unwrap();
    assert_eq!(pushed, PushOutcome::Pushed);

    let outcome = sync.pull("alice").await.unwrap();
    let PullOutcome::Snapshot(remote) = outcome else {
        panic!("expected a snapshot, got {outcome:?}");
    };

    let mut replica = Ledger::builder().build().unwrap();
    replica.adopt_snapshot(remote.into_snapshot()).unwrap();

    assert_eq!(replica.snapshot(), source.snapshot());
    assert_eq!(replica.movements().len(), 2);
    assert_eq!(replica.documents().len(), 1);
}

#[tokio::test]
async fn identities_do_not_share_remote_state() {
    let sync = SyncEngine::new(MemoryRemoteStore::new());
    sync.push("alice", seeded_ledger().snapshot()).await.unwrap();

    assert_eq!(sync.pull("bob").await.unwrap(), PullOutcome::NotFound);
    assert!(matches!(
        sync.pull("alice").await.unwrap(),
        PullOutcome::Snapshot(_)
    ));
}

#[tokio::test]
async fn push_is_idempotent() {
    let source = seeded_ledger();
    let remote = MemoryRemoteStore::new();
    let sync = SyncEngine::new(remote);

    sync.push("alice", source.snapshot()).await.unwrap();
    let first = match sync.pull("alice").await.unwrap() {
        PullOutcome::Snapshot(record) => record.into_snapshot(),
        other => panic!("expected a snapshot, got {other:?}"),
    };

    sync.push("alice", source.snapshot()).await.unwrap();
    let second = match sync.pull("alice").await.unwrap() {
        PullOutcome::Snapshot(record) => record.into_snapshot(),
        other => panic!("expected a snapshot, got {other:?}"),
    };

    assert_eq!(first, second);
}

/// Remote whose reads block until the test releases them, to stage races.
struct GatedRemote {
    inner: MemoryRemoteStore,
    gate: Arc<Semaphore>,
}

impl RemoteStore for GatedRemote {
    fn fetch(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<RemoteSnapshot>, SyncError>> + Send {
        async move {
            let _permit = self.gate.acquire().await.unwrap();
            self.inner.fetch(identity).await
        }
    }

    fn store(
        &self,
        identity: &str,
        snapshot: &RemoteSnapshot,
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        self.inner.store(identity, snapshot)
    }
}

#[tokio::test]
async fn a_superseded_pull_response_is_discarded() {
    let inner = MemoryRemoteStore::new();
    inner
        .store("alice", &RemoteSnapshot::new(Snapshot::default(), Utc::now()))
        .await
        .unwrap();

    let gate = Arc::new(Semaphore::new(0));
    let sync = Arc::new(SyncEngine::new(GatedRemote {
        inner,
        gate: Arc::clone(&gate),
    }));

    let first = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.pull("alice").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = tokio::spawn({
        let sync = Arc::clone(&sync);
        async move { sync.pull("alice").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    gate.add_permits(2);

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_eq!(first, PullOutcome::Superseded);
    assert!(matches!(second, PullOutcome::Snapshot(_)));
}
