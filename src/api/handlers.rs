use std::io;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::debug;
use serde_json::{json, Value};

use super::error::ApiError;
use super::schema::{
    AllRecords, BattAliasesResponse, ContinentsResponse, FilterParams, FilteredResponse,
    HealthResponse, MetricsResponse, ModelSeriesResponse,
};
use crate::data::{filter, LoadError};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "world-kpi";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend läuft" }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        records: state.dataset.len(),
    })
}

pub async fn all_data(State(state): State<AppState>) -> Json<AllRecords> {
    Json(AllRecords(state.dataset))
}

/// Distinct values of `column`, or 404 when the column holds none.
fn non_empty(state: &AppState, column: &str, label: &str) -> Result<Vec<String>, ApiError> {
    let values = state.dataset.distinct_values_by_name(column)?;
    if values.is_empty() {
        return Err(ApiError::NotFound(format!("No {label} found")));
    }
    Ok(values.to_vec())
}

pub async fn metrics(State(state): State<AppState>) -> Result<Json<MetricsResponse>, ApiError> {
    let metrics = non_empty(&state, "var", "metrics")?;
    Ok(Json(MetricsResponse { metrics }))
}

pub async fn batt_aliases(
    State(state): State<AppState>,
) -> Result<Json<BattAliasesResponse>, ApiError> {
    let batt_aliases = non_empty(&state, "battAlias", "battery aliases")?;
    Ok(Json(BattAliasesResponse { batt_aliases }))
}

pub async fn continents(
    State(state): State<AppState>,
) -> Result<Json<ContinentsResponse>, ApiError> {
    let continents = non_empty(&state, "continent", "continents")?;
    Ok(Json(ContinentsResponse { continents }))
}

pub async fn climates(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    non_empty(&state, "climate", "climates").map(Json)
}

pub async fn model_series(
    State(state): State<AppState>,
) -> Result<Json<ModelSeriesResponse>, ApiError> {
    let model_series = non_empty(&state, "model_series", "model series")?;
    Ok(Json(ModelSeriesResponse { model_series }))
}

pub async fn filtered_data(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response, ApiError> {
    let query = params.into_query();
    let data = filter(&state.dataset, &query)?;
    debug!("filter {query:?} matched {} records", data.len());
    Ok(Json(FilteredResponse::new(&query, data)).into_response())
}

/// The source file as uploaded, for clients that parse it themselves.
pub async fn raw_data(State(state): State<AppState>) -> Result<Response, ApiError> {
    let path = state.data_file();
    let bytes = tokio::fs::read(path).await.map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], bytes).into_response())
}
