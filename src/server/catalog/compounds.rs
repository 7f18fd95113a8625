use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::RequireLogin;
use crate::server::AppState;
use crate::server::dto::{AddCompoundForm, CompoundDetail, DeleteCompoundForm};
use crate::server::response::{ApiError, ApiResponse, Notice, StoreResultExt, list_or_notice};
use crate::types::NewCompound;

const COMPOUND_NOT_FOUND: &str = "Compound not found.";
const LIST_PATH: &str = "/compound";

pub async fn list_compounds(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let compounds = state
        .store
        .list_compounds()
        .api_err("Failed to list compounds")?;

    Ok(list_or_notice(compounds, "compounds"))
}

/// A compound with every matrix and name that identified it.
pub async fn view_compound(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();

    let Some(compound) = store.get_compound(id).api_err("Failed to get compound")? else {
        return Ok(Notice::new(COMPOUND_NOT_FOUND).into_response());
    };

    let sources = store
        .list_compound_sources(compound.id)
        .api_err("Failed to list compound sources")?;

    let detail = CompoundDetail {
        compound,
        matrixes: sources.matrixes,
        names: sources.names,
    };

    Ok(Json(ApiResponse::success(detail)).into_response())
}

pub async fn add_compound(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddCompoundForm>,
) -> Result<Redirect, ApiError> {
    if !form.molecular_mass.is_finite() {
        tracing::warn!(
            "Rejected compound '{}' with mass {}",
            form.compound,
            form.molecular_mass
        );
        return Err(ApiError::bad_request("molecular_mass must be a finite number"));
    }

    let compound = state
        .store
        .create_compound(&NewCompound {
            name: form.compound,
            molecular_formula: form.molecular_formula,
            molecular_mass: form.molecular_mass,
        })
        .api_err("Failed to create compound")?;

    tracing::info!(
        "{} added compound {} ({})",
        auth.user.username,
        compound.id,
        compound.name
    );

    Ok(Redirect::to(LIST_PATH))
}

pub async fn delete_compound(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteCompoundForm>,
) -> Result<Response, ApiError> {
    let deleted = state
        .store
        .delete_compound(form.compound_id, state.delete_policy)
        .api_err("Failed to delete compound")?;

    if !deleted {
        return Ok(Notice::new(COMPOUND_NOT_FOUND).into_response());
    }

    tracing::info!(
        "{} deleted compound {} (policy: {})",
        auth.user.username,
        form.compound_id,
        state.delete_policy
    );

    Ok(Redirect::to(LIST_PATH).into_response())
}
