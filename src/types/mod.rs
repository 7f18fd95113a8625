mod models;
mod policy;

pub use models::*;
pub use policy::DeletePolicy;
