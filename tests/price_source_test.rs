mod helpers;

use axum::http::StatusCode;
use gift_ledger::config::PriceFeedConfig;
use gift_ledger::error::SourceError;
use gift_ledger::models::price_snapshot::{DEFAULT_FULL_COIN, DEFAULT_GRAM};
use gift_ledger::repositories::{InMemoryPriceHistory, PriceHistoryStore};
use gift_ledger::services::{CollectApiPriceSource, PriceResolutionService, PriceSource};
use helpers::*;
use rust_decimal::Decimal;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn source_for(url: String, timeout_secs: u64) -> CollectApiPriceSource {
    CollectApiPriceSource::new(&PriceFeedConfig {
        url,
        api_key: "test-key".to_string(),
        timeout_secs,
    })
    .expect("build price source")
}

#[tokio::test]
async fn test_fetch_parses_live_feed() {
    let (url, recorder) = spawn_feed(StatusCode::OK, reference_feed_body(), Duration::ZERO).await;
    let source = source_for(url, 5);

    let snapshot = source.fetch_live_prices().await.unwrap();

    assert!(!snapshot.is_fallback);
    assert_eq!(snapshot.gram, Decimal::new(2500, 0));
    assert_eq!(snapshot.quarter_coin, Decimal::new(4100, 0));
    assert_eq!(snapshot.half_coin, Decimal::new(8200, 0));
    assert_eq!(snapshot.full_coin, Decimal::new(16400, 0));
    assert_eq!(snapshot.bracelet_22k, Decimal::new(21500, 0));
    assert_eq!(recorder.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_sends_api_key() {
    let (url, recorder) = spawn_feed(StatusCode::OK, reference_feed_body(), Duration::ZERO).await;
    source_for(url, 5).fetch_live_prices().await.unwrap();

    let authorization = recorder.authorization.lock().unwrap().clone();
    assert_eq!(authorization.as_deref(), Some("apikey test-key"));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (url, _) = spawn_feed(
        StatusCode::SERVICE_UNAVAILABLE,
        "upstream down".to_string(),
        Duration::ZERO,
    )
    .await;

    let err = source_for(url, 5).fetch_live_prices().await.unwrap_err();
    assert!(matches!(err, SourceError::Status(503)));
}

#[tokio::test]
async fn test_slow_feed_times_out() {
    let (url, _) = spawn_feed(StatusCode::OK, reference_feed_body(), Duration::from_secs(3)).await;

    let err = source_for(url, 1).fetch_live_prices().await.unwrap_err();
    assert!(matches!(err, SourceError::Unreachable(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_reported() {
    // Nothing listens on the discard port
    let err = source_for("http://127.0.0.1:9/economy/goldPrice".to_string(), 1)
        .fetch_live_prices()
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Unreachable(_)));
}

#[tokio::test]
async fn test_partial_feed_uses_field_defaults() {
    let body = serde_json::json!({
        "success": true,
        "result": [
            { "name": "Çeyrek Altın", "buying": "4125,50" },
            { "name": "Tam Altın", "buying": null }
        ]
    })
    .to_string();
    let (url, _) = spawn_feed(StatusCode::OK, body, Duration::ZERO).await;

    let snapshot = source_for(url, 5).fetch_live_prices().await.unwrap();

    assert!(!snapshot.is_fallback);
    assert_eq!(snapshot.quarter_coin, Decimal::new(412550, 2));
    assert_eq!(snapshot.gram, DEFAULT_GRAM);
    assert_eq!(snapshot.full_coin, DEFAULT_FULL_COIN);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (url, _) = spawn_feed(StatusCode::OK, "not json".to_string(), Duration::ZERO).await;

    let err = source_for(url, 5).fetch_live_prices().await.unwrap_err();
    assert!(matches!(err, SourceError::Payload(_)));
}

#[tokio::test]
async fn test_feed_outage_falls_back_to_history() {
    let history = Arc::new(InMemoryPriceHistory::new());

    let (live_url, _) = spawn_feed(StatusCode::OK, reference_feed_body(), Duration::ZERO).await;
    let live = PriceResolutionService::new(Arc::new(source_for(live_url, 5)), history.clone());
    let first = live.resolve_current_prices().await;
    assert!(!first.is_fallback);

    let (down_url, _) = spawn_feed(
        StatusCode::INTERNAL_SERVER_ERROR,
        String::new(),
        Duration::ZERO,
    )
    .await;
    let degraded = PriceResolutionService::new(Arc::new(source_for(down_url, 5)), history.clone());
    let second = degraded.resolve_current_prices().await;

    assert!(second.is_fallback);
    assert_eq!(second.gram, first.gram);
    assert_eq!(second.recorded_at, first.recorded_at);
    assert_eq!(history.recent(10).await.unwrap().len(), 1);
}
