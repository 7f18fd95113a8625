use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{end_session, start_session, verify_credentials};
use crate::server::AppState;
use crate::server::dto::LoginForm;
use crate::server::pages::login_page;
use crate::server::response::{ApiError, StoreResultExt};

pub async fn login_form() -> Html<&'static str> {
    login_page()
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let LoginForm { username, password } = form;

    let store = state.store.clone();
    let checked_username = username.clone();
    let user = tokio::task::spawn_blocking(move || {
        verify_credentials(store.as_ref(), &checked_username, &password)
    })
    .await
    .map_err(|e| {
        tracing::error!("Credential check panicked: {e}");
        ApiError::internal("Failed to check credentials")
    })?
    .api_err("Failed to check credentials")?;

    let Some(user) = user else {
        tracing::warn!("Failed login for '{username}'");
        return Ok(login_page().into_response());
    };

    // A browser logging in again gives up its previous session.
    if let Some(previous) = jar.get(&state.session.cookie_name) {
        end_session(&state, previous.value()).api_err("Failed to end previous session")?;
    }

    let raw_token = start_session(&state, &user).api_err("Failed to create session")?;

    let cookie = Cookie::build((state.session.cookie_name.clone(), raw_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.session.secure_cookie);

    tracing::info!("User '{}' logged in", user.username);

    Ok((jar.add(cookie), Redirect::to("/")).into_response())
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let cookie_name = state.session.cookie_name.clone();

    if let Some(cookie) = jar.get(&cookie_name) {
        let ended = end_session(&state, cookie.value()).api_err("Failed to end session")?;
        if ended {
            tracing::info!("Session ended");
        }
    }

    let removal = Cookie::build((cookie_name, "")).path("/");

    Ok((jar.remove(removal), Redirect::to("/")))
}
