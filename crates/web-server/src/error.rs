// In crates/web-server/src/error.rs

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Database(#[from] database::Error),
    #[error(transparent)]
    Insight(#[from] insights::Error),
}

impl Error {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
            Error::Insight(err) => match err.kind() {
                "plan" => (StatusCode::FORBIDDEN, "plan"),
                "credits" => (StatusCode::PAYMENT_REQUIRED, "credits"),
                "generation" => (StatusCode::BAD_GATEWAY, "generation"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "kind": kind,
        }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_errors_map_to_client_facing_statuses() {
        let plan: Error = insights::Error::PlanRestricted.into();
        assert_eq!(plan.status_and_kind().0, StatusCode::FORBIDDEN);

        let credits: Error = insights::Error::InsufficientCredits {
            remaining: 0,
            cost: 1,
        }
        .into();
        assert_eq!(credits.status_and_kind().0, StatusCode::PAYMENT_REQUIRED);

        let generation: Error = insights::Error::Generation("boom".to_string()).into();
        assert_eq!(generation.status_and_kind().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn bad_request_is_a_400() {
        let err = Error::BadRequest("month out of range".to_string());
        assert_eq!(err.status_and_kind(), (StatusCode::BAD_REQUEST, "bad_request"));
    }
}
