use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::RequireLogin;
use crate::server::AppState;
use crate::server::dto::{AddMatrixForm, DeleteMatrixForm, MatrixCompounds};
use crate::server::response::{ApiError, ApiResponse, Notice, StoreResultExt, list_or_notice};
use crate::types::NewMatrix;

const LIST_PATH: &str = "/matrixes";

pub async fn list_matrixes(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let matrixes = state
        .store
        .list_matrixes()
        .api_err("Failed to list matrixes")?;

    Ok(list_or_notice(matrixes, "matrixes"))
}

pub async fn view_matrix_compounds(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let store = state.store.as_ref();

    let Some(matrix) = store.get_matrix(id).api_err("Failed to get matrix")? else {
        return Ok(Notice::new("Organism not found.").into_response());
    };

    let compounds = store
        .list_matrix_compounds(matrix.id)
        .api_err("Failed to list matrix compounds")?;

    Ok(Json(ApiResponse::success(MatrixCompounds { matrix, compounds })).into_response())
}

pub async fn add_matrix(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddMatrixForm>,
) -> Result<Redirect, ApiError> {
    let matrix = state
        .store
        .create_matrix(&NewMatrix {
            organism: form.organism,
            plant_tissue: form.plant_tissue,
        })
        .api_err("Failed to create matrix")?;

    tracing::info!(
        "{} added matrix {} ({}, {})",
        auth.user.username,
        matrix.id,
        matrix.organism,
        matrix.plant_tissue
    );

    Ok(Redirect::to(LIST_PATH))
}

pub async fn delete_matrix(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteMatrixForm>,
) -> Result<Response, ApiError> {
    let deleted = state
        .store
        .delete_matrix(form.matrix_id, state.delete_policy)
        .api_err("Failed to delete matrix")?;

    if !deleted {
        return Ok(Notice::new("Matrix not found.").into_response());
    }

    tracing::info!(
        "{} deleted matrix {} (policy: {})",
        auth.user.username,
        form.matrix_id,
        state.delete_policy
    );

    Ok(Redirect::to(LIST_PATH).into_response())
}
