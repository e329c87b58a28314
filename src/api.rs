//! HTTP surface of the gift ledger.
//!
//! `GET /prices` is the public price read; it always answers 200 and
//! reports degraded data through `isFallback`.

use crate::error::{AppError, AppResult};
use crate::models::{PriceChange, PriceSnapshot, ValueSummary};
use crate::services::{GiftFailure, RevaluationReport};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 24;
pub const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub event_id: Option<Uuid>,
}

/// Result of a refresh cycle for one owner
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevaluationResponse {
    pub snapshot: PriceSnapshot,
    pub updated: Vec<Uuid>,
    pub failed: Vec<GiftFailure>,
}

impl RevaluationResponse {
    fn new(snapshot: PriceSnapshot, report: RevaluationReport) -> Self {
        Self {
            snapshot,
            updated: report.updated,
            failed: report.failed,
        }
    }
}

/// Build the router with request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prices", get(current_prices))
        .route("/prices/history", get(price_history))
        .route("/prices/change", get(price_change))
        .route("/owners/:owner_id/revaluations", post(revalue_owner))
        .route("/owners/:owner_id/summary", get(owner_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let Some(database) = &state.database else {
        return Json(serde_json::json!({ "status": "ok" }));
    };

    match database.ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok", "database": "up" })),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            Json(serde_json::json!({ "status": "degraded", "database": "down" }))
        }
    }
}

/// GET /prices
async fn current_prices(State(state): State<AppState>) -> Json<PriceSnapshot> {
    Json(state.prices.resolve_current_prices().await)
}

/// GET /prices/history?limit=N
async fn price_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<PriceSnapshot>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.prices.history(limit).await?))
}

/// GET /prices/change
async fn price_change(State(state): State<AppState>) -> AppResult<Json<PriceChange>> {
    Ok(Json(state.prices.latest_change().await?))
}

/// POST /owners/:owner_id/revaluations
async fn revalue_owner(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
) -> AppResult<Json<RevaluationResponse>> {
    let snapshot = state.prices.resolve_current_prices().await;
    let report = state
        .valuation
        .revalue(owner_id, &snapshot)
        .await
        .map_err(AppError::Repository)?;

    info!(
        %owner_id,
        is_fallback = snapshot.is_fallback,
        complete = report.is_complete(),
        "Refresh cycle finished"
    );
    Ok(Json(RevaluationResponse::new(snapshot, report)))
}

/// GET /owners/:owner_id/summary?eventId=...
async fn owner_summary(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<ValueSummary>> {
    Ok(Json(state.portfolio.summarize(owner_id, query.event_id).await?))
}
