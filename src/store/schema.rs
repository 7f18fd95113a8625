pub const SCHEMA: &str = r#"
-- Chemical compounds
CREATE TABLE IF NOT EXISTS compounds (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    molecular_formula TEXT NOT NULL,
    molecular_mass REAL NOT NULL
);

-- Source organisms and tissues
CREATE TABLE IF NOT EXISTS matrixes (
    id INTEGER PRIMARY KEY,
    organism TEXT NOT NULL,
    plant_tissue TEXT NOT NULL
);

-- Literature sources / author labels
CREATE TABLE IF NOT EXISTS names (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

-- Three-way junction. Parents are checked on insert, not by REFERENCES,
-- so rows may outlive a deleted parent under the "retain" delete policy.
CREATE TABLE IF NOT EXISTS identifications (
    compound_id INTEGER NOT NULL,
    matrix_id INTEGER NOT NULL,
    name_id INTEGER NOT NULL,
    PRIMARY KEY (compound_id, matrix_id, name_id)
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL     -- argon2id hash with embedded salt
);

-- Login sessions; the cookie carries the raw token, only its hash is stored
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_lookup TEXT NOT NULL,
    token_hash TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,            -- NULL = never
    last_used_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_identifications_matrix ON identifications(matrix_id);
CREATE INDEX IF NOT EXISTS idx_identifications_name ON identifications(name_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_lookup ON sessions(token_lookup);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
"#;
