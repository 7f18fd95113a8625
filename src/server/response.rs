use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Result as StoreResult;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// Plain-text message sent with 200 OK, used for empty tables and unknown ids.
pub struct Notice(pub String);

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    #[must_use]
    pub fn empty_table(table: &str) -> Self {
        Self(format!("The `{table}` table is empty."))
    }
}

impl IntoResponse for Notice {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.0).into_response()
    }
}

/// Renders `items` as a JSON list, or the empty-table notice when there are none.
pub fn list_or_notice<T: Serialize>(items: Vec<T>, table: &str) -> Response {
    if items.is_empty() {
        Notice::empty_table(table).into_response()
    } else {
        Json(ApiResponse::success(items)).into_response()
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> std::result::Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> std::result::Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            ApiError::internal(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_list_renders_notice() {
        let response = list_or_notice(Vec::<u32>::new(), "names");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_non_empty_list_renders_json() {
        let response = list_or_notice(vec![1, 2], "names");
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_api_err_hides_store_details() {
        let result: StoreResult<()> = Err(Error::Config("disk on fire".into()));
        let err = result.api_err("Failed to list names").unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to list names");
    }
}
