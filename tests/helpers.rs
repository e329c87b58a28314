#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use gift_ledger::error::{RepositoryError, SourceError};
use gift_ledger::models::{Gift, GiftType, NewGift, PriceSnapshot};
use gift_ledger::repositories::{
    GiftStore, InMemoryGiftStore, InMemoryPriceHistory, PriceHistoryStore,
};
use gift_ledger::services::PriceSource;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Live snapshot with the given prices in whole currency units
pub fn snapshot(
    gram: i64,
    quarter: i64,
    half: i64,
    full: i64,
    bracelet: i64,
    recorded_at: DateTime<Utc>,
) -> PriceSnapshot {
    PriceSnapshot {
        gram: Decimal::new(gram, 0),
        quarter_coin: Decimal::new(quarter, 0),
        half_coin: Decimal::new(half, 0),
        full_coin: Decimal::new(full, 0),
        bracelet_22k: Decimal::new(bracelet, 0),
        recorded_at,
        is_fallback: false,
    }
}

/// The reference live quote used across scenarios
pub fn reference_snapshot() -> PriceSnapshot {
    snapshot(2500, 4100, 8200, 16400, 21500, Utc::now())
}

/// A gift as recorded by the user, current value equal to gift value
pub fn new_gift(owner_id: Uuid, gift_type: GiftType, quantity: i32, value: i64) -> Gift {
    Gift::new(
        owner_id,
        NewGift {
            event_id: Uuid::new_v4(),
            gift_type,
            quantity,
            gift_value: Decimal::new(value, 0),
            from_person: Some("Mehmet".to_string()),
        },
    )
}

// ============================================================================
// Price sources
// ============================================================================

/// Source that always answers with a fixed snapshot
pub struct StaticSource {
    pub snapshot: PriceSnapshot,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(snapshot: PriceSnapshot) -> Self {
        Self {
            snapshot,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch_live_prices(&self) -> Result<PriceSnapshot, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }
}

/// Source that is always down
#[derive(Default)]
pub struct FailingSource;

#[async_trait]
impl PriceSource for FailingSource {
    async fn fetch_live_prices(&self) -> Result<PriceSnapshot, SourceError> {
        Err(SourceError::Status(503))
    }
}

// ============================================================================
// History stores
// ============================================================================

/// In-memory history whose reads and writes can be switched off
#[derive(Default)]
pub struct FlakyHistory {
    pub inner: InMemoryPriceHistory,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyHistory {
    pub fn failing_reads() -> Self {
        let history = Self::default();
        history.fail_reads.store(true, Ordering::SeqCst);
        history
    }

    pub fn failing_writes() -> Self {
        let history = Self::default();
        history.fail_writes.store(true, Ordering::SeqCst);
        history
    }

    pub fn failing_everything() -> Self {
        let history = Self::failing_reads();
        history.fail_writes.store(true, Ordering::SeqCst);
        history
    }
}

#[async_trait]
impl PriceHistoryStore for FlakyHistory {
    async fn append(&self, snapshot: &PriceSnapshot) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write rejected".to_string()));
        }
        self.inner.append(snapshot).await
    }

    async fn latest(&self) -> Result<PriceSnapshot, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("read rejected".to_string()));
        }
        self.inner.latest().await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PriceSnapshot>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("read rejected".to_string()));
        }
        self.inner.recent(limit).await
    }
}

// ============================================================================
// Gift stores
// ============================================================================

/// In-memory gift store that rejects writes for chosen gifts
#[derive(Default)]
pub struct FlakyGiftStore {
    pub inner: InMemoryGiftStore,
    pub reject_updates_for: Mutex<HashSet<Uuid>>,
    pub fail_loads: AtomicBool,
    pub update_calls: AtomicUsize,
}

impl FlakyGiftStore {
    pub fn reject_updates(&self, gift_id: Uuid) {
        self.reject_updates_for.lock().unwrap().insert(gift_id);
    }
}

#[async_trait]
impl GiftStore for FlakyGiftStore {
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
        event_id: Option<Uuid>,
    ) -> Result<Vec<Gift>, RepositoryError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("load rejected".to_string()));
        }
        self.inner.find_by_owner(owner_id, event_id).await
    }

    async fn find_non_cash_by_owner(&self, owner_id: Uuid) -> Result<Vec<Gift>, RepositoryError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("load rejected".to_string()));
        }
        self.inner.find_non_cash_by_owner(owner_id).await
    }

    async fn update_current_value(
        &self,
        owner_id: Uuid,
        gift_id: Uuid,
        current_value: Decimal,
    ) -> Result<(), RepositoryError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_updates_for.lock().unwrap().contains(&gift_id) {
            return Err(RepositoryError::Unavailable("update rejected".to_string()));
        }
        self.inner
            .update_current_value(owner_id, gift_id, current_value)
            .await
    }
}

// ============================================================================
// Local HTTP servers
// ============================================================================

/// Serve a router on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}

/// What the fake upstream feed saw
#[derive(Default)]
pub struct FeedRecorder {
    pub authorization: Mutex<Option<String>>,
    pub hits: AtomicUsize,
}

/// Start a fake upstream feed answering `status` with `body`, after `delay`.
/// Returns the full feed URL and the request recorder.
pub async fn spawn_feed(
    status: StatusCode,
    body: String,
    delay: Duration,
) -> (String, Arc<FeedRecorder>) {
    let recorder = Arc::new(FeedRecorder::default());
    let seen = recorder.clone();

    let router = Router::new().route(
        "/economy/goldPrice",
        get(move |headers: HeaderMap| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.hits.fetch_add(1, Ordering::SeqCst);
                *seen.authorization.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                tokio::time::sleep(delay).await;
                (status, body)
            }
        }),
    );

    let addr = serve(router).await;
    (format!("http://{}/economy/goldPrice", addr), recorder)
}

/// Upstream payload quoting the reference prices
pub fn reference_feed_body() -> String {
    serde_json::json!({
        "success": true,
        "result": [
            { "name": "Gram Altın", "buying": 2500, "selling": 2520 },
            { "name": "Çeyrek Altın", "buying": 4100, "selling": 4150 },
            { "name": "Yarım Altın", "buying": 8200, "selling": 8300 },
            { "name": "Tam Altın", "buying": 16400, "selling": 16600 },
            { "name": "22 Ayar Bilezik", "buying": 21500, "selling": 21800 },
            { "name": "Ons", "buying": 2380.4 }
        ]
    })
    .to_string()
}
