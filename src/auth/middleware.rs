use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::session::{SessionError, load_session_user};
use crate::server::AppState;
use crate::types::User;

pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a logged-in browser session.
pub struct RequireLogin {
    pub user: User,
}

#[derive(Debug)]
pub enum AuthError {
    LoginRequired,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::LoginRequired => Redirect::to(LOGIN_PATH).into_response(),
            AuthError::InternalError => {
                let body = json!({ "data": null, "error": "Internal server error" });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireLogin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let raw_token = jar
            .get(&state.session.cookie_name)
            .map(|c| c.value().to_string())
            .ok_or(AuthError::LoginRequired)?;

        match load_session_user(state, &raw_token) {
            Ok(auth) => Ok(RequireLogin { user: auth.user }),
            Err(SessionError::InternalError) => Err(AuthError::InternalError),
            Err(e) => {
                tracing::debug!("Rejected session cookie: {e:?}");
                Err(AuthError::LoginRequired)
            }
        }
    }
}
