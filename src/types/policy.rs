use std::fmt;

use serde::{Deserialize, Serialize};

/// What happens to identifications when the compound, matrix or name they
/// reference is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Leave referencing identifications in place as orphans.
    #[default]
    Retain,
    /// Delete referencing identifications together with the parent row.
    Cascade,
}

impl DeletePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Cascade => "cascade",
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
