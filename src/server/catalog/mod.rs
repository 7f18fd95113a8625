mod compounds;
mod identifications;
mod matrixes;
mod names;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        // Compound routes
        .route("/compound", get(compounds::list_compounds))
        .route("/view_compound/{id}", get(compounds::view_compound))
        .route("/add_compound", post(compounds::add_compound))
        .route("/delete_compound", post(compounds::delete_compound))
        // Matrix routes
        .route("/matrixes", get(matrixes::list_matrixes))
        .route(
            "/view_matrix_compounds/{id}",
            get(matrixes::view_matrix_compounds),
        )
        .route("/add_matrix", post(matrixes::add_matrix))
        .route("/delete_matrix", post(matrixes::delete_matrix))
        // Name routes
        .route("/name", get(names::list_names))
        .route(
            "/view_author_compounds/{id}",
            get(names::view_author_compounds),
        )
        .route("/add_name", post(names::add_name))
        .route("/delete_name", post(names::delete_name))
        // Identification routes
        .route(
            "/identification",
            get(identifications::list_identifications),
        )
        .route(
            "/add_identification",
            post(identifications::add_identification),
        )
}
