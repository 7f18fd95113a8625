mod catalog;
pub mod dto;
mod login;
mod pages;
pub mod response;
mod router;
pub mod validation;

pub use catalog::catalog_router;
pub use router::{AppState, create_router};
