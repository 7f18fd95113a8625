use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::RequireLogin;
use crate::server::AppState;
use crate::server::dto::{AddNameForm, AuthorCompounds, DeleteNameForm};
use crate::server::response::{ApiError, ApiResponse, Notice, StoreResultExt, list_or_notice};

const LIST_PATH: &str = "/name";

pub async fn list_names(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let names = state.store.list_names().api_err("Failed to list names")?;

    Ok(list_or_notice(names, "names"))
}

/// Compounds reported by one author/literature name.
pub async fn view_author_compounds(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();

    let Some(author) = store.get_name(id).api_err("Failed to get name")? else {
        return Ok(Notice::new("Author not found.").into_response());
    };

    let compounds = store
        .list_name_compounds(author.id)
        .api_err("Failed to list author compounds")?;

    Ok(Json(ApiResponse::success(AuthorCompounds { author, compounds })).into_response())
}

pub async fn add_name(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddNameForm>,
) -> Result<Redirect, ApiError> {
    let name = state
        .store
        .create_name(&form.name)
        .api_err("Failed to create name")?;

    tracing::info!("{} added name {} ({})", auth.user.username, name.id, name.name);

    Ok(Redirect::to(LIST_PATH))
}

pub async fn delete_name(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteNameForm>,
) -> Result<Response, ApiError> {
    let deleted = state
        .store
        .delete_name(form.name_id, state.delete_policy)
        .api_err("Failed to delete name")?;

    if !deleted {
        return Ok(Notice::new("Name not found.").into_response());
    }

    tracing::info!(
        "{} deleted name {} (policy: {})",
        auth.user.username,
        form.name_id,
        state.delete_policy
    );

    Ok(Redirect::to(LIST_PATH).into_response())
}
