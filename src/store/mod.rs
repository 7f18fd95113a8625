mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Compound operations
    fn create_compound(&self, compound: &NewCompound) -> Result<Compound>;
    fn get_compound(&self, id: i64) -> Result<Option<Compound>>;
    fn list_compounds(&self) -> Result<Vec<Compound>>;
    fn delete_compound(&self, id: i64, policy: DeletePolicy) -> Result<bool>;

    // Matrix operations
    fn create_matrix(&self, matrix: &NewMatrix) -> Result<Matrix>;
    fn get_matrix(&self, id: i64) -> Result<Option<Matrix>>;
    fn list_matrixes(&self) -> Result<Vec<Matrix>>;
    fn delete_matrix(&self, id: i64, policy: DeletePolicy) -> Result<bool>;

    // Name operations
    fn create_name(&self, name: &str) -> Result<Name>;
    fn get_name(&self, id: i64) -> Result<Option<Name>>;
    fn list_names(&self) -> Result<Vec<Name>>;
    fn delete_name(&self, id: i64, policy: DeletePolicy) -> Result<bool>;

    // Identification operations (compound x matrix x name)
    fn create_identification(&self, identification: &Identification) -> Result<()>;
    fn list_identifications(&self) -> Result<Vec<Identification>>;
    fn list_compound_sources(&self, compound_id: i64) -> Result<CompoundSources>;
    fn list_name_compounds(&self, name_id: i64) -> Result<Vec<Compound>>;
    fn list_matrix_compounds(&self, matrix_id: i64) -> Result<Vec<Compound>>;

    // User operations
    fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn delete_user(&self, id: i64) -> Result<bool>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
    fn update_session_last_used(&self, id: &str) -> Result<()>;
    /// Removes every session whose expiry is at or before `now`.
    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize>;
}
