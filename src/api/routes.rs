use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;
use crate::api::entrypoints::Entrypoints;
use crate::data::error::FeedError;
use crate::data::feed::MAX_HISTORY_LIMIT;
use crate::data::types::Interval;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

const DEFAULT_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Deserialize)]
pub struct IntervalQuery {
    pub interval: Option<Interval>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub interval: Option<Interval>,
    pub limit: Option<usize>,
}

pub fn router(api: Arc<Entrypoints>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/commodities", get(list_commodities))
        .route("/commodities/all", get(get_all))
        .route("/commodities/index", get(get_index))
        .route("/commodities/:commodity/latest", get(get_latest))
        .route("/commodities/:commodity/history", get(get_history))
        .route("/commodities/:commodity/analysis", get(get_analysis))
        .with_state(api)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

async fn list_commodities(State(api): State<Arc<Entrypoints>>) -> Json<Value> {
    Json(api.commodities())
}

async fn get_all(State(api): State<Arc<Entrypoints>>, Query(params): Query<IntervalQuery>) -> ApiResult {
    let interval = params.interval.unwrap_or(Interval::Monthly);
    api.all(interval).await.map(Json).map_err(upstream_error)
}

async fn get_index(State(api): State<Arc<Entrypoints>>) -> ApiResult {
    api.index().await.map(Json).map_err(upstream_error)
}

async fn get_latest(
    State(api): State<Arc<Entrypoints>>,
    Path(commodity): Path<String>,
    Query(params): Query<IntervalQuery>,
) -> ApiResult {
    let interval = params.interval.unwrap_or(Interval::Daily);
    api.latest(&commodity, interval).await.map(Json).map_err(upstream_error)
}

async fn get_history(
    State(api): State<Arc<Entrypoints>>,
    Path(commodity): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> ApiResult {
    let interval = params.interval.unwrap_or(Interval::Daily);
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("limit must be between 1 and {}", MAX_HISTORY_LIMIT) })),
        ));
    }

    api.history(&commodity, interval, limit).await.map(Json).map_err(upstream_error)
}

async fn get_analysis(State(api): State<Arc<Entrypoints>>, Path(commodity): Path<String>) -> ApiResult {
    api.analysis(&commodity).await.map(Json).map_err(upstream_error)
}

fn upstream_error(err: FeedError) -> (StatusCode, Json<Value>) {
    warn!("Upstream request failed: {}", err);
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() })))
}
