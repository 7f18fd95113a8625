use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("already exists")]
    AlreadyExists,

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("session lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid session token format")]
    InvalidTokenFormat,

    #[error("hashing failed: {0}")]
    Hash(String),
}

pub type Result<T> = std::result::Result<T, Error>;
