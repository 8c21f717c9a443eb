use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

use crate::data::{LoadError, QueryError};

/// The one place core errors become HTTP status codes.
///
/// Bodies are `{"detail": "..."}`, the shape the dashboard frontend reads.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidFilter { .. } | QueryError::MissingParameter(_) => {
                ApiError::BadRequest(err.to_string())
            }
            QueryError::ColumnNotFound(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<LoadError> for ApiError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(_) => ApiError::NotFound(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{status}: {self}");
        } else {
            warn!("{status}: {self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn query_errors_map_to_client_or_server_status() {
        let invalid = ApiError::from(QueryError::InvalidFilter {
            field: "metric",
            value: "x".to_string(),
        });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::from(QueryError::MissingParameter("metric"));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let column = ApiError::from(QueryError::ColumnNotFound("x".to_string()));
        assert_eq!(column.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn load_errors_map_to_not_found_or_server_error() {
        let missing = ApiError::from(LoadError::NotFound(PathBuf::from("a.csv")));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let empty = ApiError::from(LoadError::EmptyData(PathBuf::from("a.csv")));
        assert_eq!(empty.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
