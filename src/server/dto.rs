use serde::{Deserialize, Serialize};

use crate::types::{Compound, Matrix, Name};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddCompoundForm {
    pub compound: String,
    pub molecular_formula: String,
    pub molecular_mass: f64,
}

#[derive(Debug, Deserialize)]
pub struct AddMatrixForm {
    pub organism: String,
    pub plant_tissue: String,
}

#[derive(Debug, Deserialize)]
pub struct AddNameForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddIdentificationForm {
    pub compound_id: i64,
    pub matrix_id: i64,
    pub name_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCompoundForm {
    pub compound_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMatrixForm {
    pub matrix_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNameForm {
    pub name_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CompoundDetail {
    pub compound: Compound,
    pub matrixes: Vec<Matrix>,
    pub names: Vec<Name>,
}

#[derive(Debug, Serialize)]
pub struct AuthorCompounds {
    pub author: Name,
    pub compounds: Vec<Compound>,
}

#[derive(Debug, Serialize)]
pub struct MatrixCompounds {
    pub matrix: Matrix,
    pub compounds: Vec<Compound>,
}
