use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    response::{Redirect, Response},
};

use crate::auth::RequireLogin;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::AddIdentificationForm;
use crate::server::response::{ApiError, StoreResultExt, list_or_notice};
use crate::types::Identification;

pub async fn list_identifications(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let identifications = state
        .store
        .list_identifications()
        .api_err("Failed to list identifications")?;

    Ok(list_or_notice(identifications, "identifications"))
}

pub async fn add_identification(
    auth: RequireLogin,
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddIdentificationForm>,
) -> Result<Redirect, ApiError> {
    let identification = Identification {
        compound_id: form.compound_id,
        matrix_id: form.matrix_id,
        name_id: form.name_id,
    };

    match state.store.create_identification(&identification) {
        Ok(()) => {}
        Err(e @ Error::MissingReference { .. }) => {
            tracing::warn!("Rejected identification {identification:?}: {e}");
            return Err(ApiError::bad_request(e.to_string()));
        }
        Err(Error::AlreadyExists) => {
            return Err(ApiError::conflict("Identification already exists"));
        }
        Err(e) => {
            tracing::error!("Failed to create identification: {e}");
            return Err(ApiError::internal("Failed to create identification"));
        }
    }

    tracing::info!(
        "{} added identification compound={} matrix={} name={}",
        auth.user.username,
        identification.compound_id,
        identification.matrix_id,
        identification.name_id
    );

    Ok(Redirect::to("/identification"))
}
