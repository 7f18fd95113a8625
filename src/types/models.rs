use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    pub id: i64,
    pub name: String,
    pub molecular_formula: String,
    pub molecular_mass: f64,
}

/// Organism and tissue a compound was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub id: i64,
    pub organism: String,
    pub plant_tissue: String,
}

/// Literature source or author label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub id: i64,
    pub name: String,
}

/// Links one compound to the matrix it was found in and the name that reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identification {
    pub compound_id: i64,
    pub matrix_id: i64,
    pub name_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewCompound {
    pub name: String,
    pub molecular_formula: String,
    pub molecular_mass: f64,
}

#[derive(Debug, Clone)]
pub struct NewMatrix {
    pub organism: String,
    pub plant_tissue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    #[serde(skip)]
    pub token_lookup: String,
    #[serde(skip)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Matrices and names recorded for one compound, in identification order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompoundSources {
    pub matrixes: Vec<Matrix>,
    pub names: Vec<Name>,
}
