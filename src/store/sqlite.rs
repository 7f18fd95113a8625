use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deletes one parent row and, under [`DeletePolicy::Cascade`], the
    /// identifications pointing at it. `table` and `column` are internal names.
    fn delete_parent(
        &self,
        table: &str,
        column: &str,
        id: i64,
        policy: DeletePolicy,
    ) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;

        if rows > 0 && policy == DeletePolicy::Cascade {
            let removed = tx.execute(
                &format!("DELETE FROM identifications WHERE {column} = ?1"),
                params![id],
            )?;
            tracing::debug!("Cascaded delete of {table} {id} removed {removed} identifications");
        }

        tx.commit()?;
        Ok(rows > 0)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn compound_from_row(row: &Row<'_>) -> rusqlite::Result<Compound> {
    Ok(Compound {
        id: row.get(0)?,
        name: row.get(1)?,
        molecular_formula: row.get(2)?,
        molecular_mass: row.get(3)?,
    })
}

fn matrix_from_row(row: &Row<'_>) -> rusqlite::Result<Matrix> {
    Ok(Matrix {
        id: row.get(0)?,
        organism: row.get(1)?,
        plant_tissue: row.get(2)?,
    })
}

fn name_from_row(row: &Row<'_>) -> rusqlite::Result<Name> {
    Ok(Name {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        token_lookup: row.get(2)?,
        token_hash: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        expires_at: row.get::<_, Option<String>>(5)?.map(|s| parse_datetime(&s)),
        last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Compound operations

    fn create_compound(&self, compound: &NewCompound) -> Result<Compound> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO compounds (name, molecular_formula, molecular_mass) VALUES (?1, ?2, ?3)",
            params![
                compound.name,
                compound.molecular_formula,
                compound.molecular_mass
            ],
        )?;

        Ok(Compound {
            id: conn.last_insert_rowid(),
            name: compound.name.clone(),
            molecular_formula: compound.molecular_formula.clone(),
            molecular_mass: compound.molecular_mass,
        })
    }

    fn get_compound(&self, id: i64) -> Result<Option<Compound>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, molecular_formula, molecular_mass FROM compounds WHERE id = ?1",
            params![id],
            compound_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_compounds(&self) -> Result<Vec<Compound>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, molecular_formula, molecular_mass FROM compounds ORDER BY id",
        )?;

        let rows = stmt.query_map([], compound_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_compound(&self, id: i64, policy: DeletePolicy) -> Result<bool> {
        self.delete_parent("compounds", "compound_id", id, policy)
    }

    // Matrix operations

    fn create_matrix(&self, matrix: &NewMatrix) -> Result<Matrix> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO matrixes (organism, plant_tissue) VALUES (?1, ?2)",
            params![matrix.organism, matrix.plant_tissue],
        )?;

        Ok(Matrix {
            id: conn.last_insert_rowid(),
            organism: matrix.organism.clone(),
            plant_tissue: matrix.plant_tissue.clone(),
        })
    }

    fn get_matrix(&self, id: i64) -> Result<Option<Matrix>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, organism, plant_tissue FROM matrixes WHERE id = ?1",
            params![id],
            matrix_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_matrixes(&self) -> Result<Vec<Matrix>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, organism, plant_tissue FROM matrixes ORDER BY id")?;

        let rows = stmt.query_map([], matrix_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_matrix(&self, id: i64, policy: DeletePolicy) -> Result<bool> {
        self.delete_parent("matrixes", "matrix_id", id, policy)
    }

    // Name operations

    fn create_name(&self, name: &str) -> Result<Name> {
        let conn = self.conn();
        conn.execute("INSERT INTO names (name) VALUES (?1)", params![name])?;

        Ok(Name {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn get_name(&self, id: i64) -> Result<Option<Name>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name FROM names WHERE id = ?1",
            params![id],
            name_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_names(&self) -> Result<Vec<Name>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name FROM names ORDER BY id")?;

        let rows = stmt.query_map([], name_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_name(&self, id: i64, policy: DeletePolicy) -> Result<bool> {
        self.delete_parent("names", "name_id", id, policy)
    }

    // Identification operations

    fn create_identification(&self, identification: &Identification) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let parents = [
            ("compounds", "compound", identification.compound_id),
            ("matrixes", "matrix", identification.matrix_id),
            ("names", "name", identification.name_id),
        ];
        for (table, entity, id) in parents {
            if !row_exists(&tx, table, id)? {
                return Err(Error::MissingReference { entity, id });
            }
        }

        let result = tx.execute(
            "INSERT INTO identifications (compound_id, matrix_id, name_id) VALUES (?1, ?2, ?3)",
            params![
                identification.compound_id,
                identification.matrix_id,
                identification.name_id
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        tx.commit()?;
        Ok(())
    }

    fn list_identifications(&self) -> Result<Vec<Identification>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT compound_id, matrix_id, name_id FROM identifications ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Identification {
                compound_id: row.get(0)?,
                matrix_id: row.get(1)?,
                name_id: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_compound_sources(&self, compound_id: i64) -> Result<CompoundSources> {
        let conn = self.conn();
        // LEFT JOINs keep the surviving side of an orphaned identification.
        let mut stmt = conn.prepare(
            "SELECT m.id, m.organism, m.plant_tissue, n.id, n.name
             FROM identifications i
             LEFT JOIN matrixes m ON m.id = i.matrix_id
             LEFT JOIN names n ON n.id = i.name_id
             WHERE i.compound_id = ?1
             ORDER BY i.rowid",
        )?;

        let rows = stmt.query_map(params![compound_id], |row| {
            let matrix = match row.get::<_, Option<i64>>(0)? {
                Some(id) => Some(Matrix {
                    id,
                    organism: row.get(1)?,
                    plant_tissue: row.get(2)?,
                }),
                None => None,
            };
            let name = match row.get::<_, Option<i64>>(3)? {
                Some(id) => Some(Name {
                    id,
                    name: row.get(4)?,
                }),
                None => None,
            };
            Ok((matrix, name))
        })?;

        let mut sources = CompoundSources::default();
        for row in rows {
            let (matrix, name) = row?;
            sources.matrixes.extend(matrix);
            sources.names.extend(name);
        }
        Ok(sources)
    }

    fn list_name_compounds(&self, name_id: i64) -> Result<Vec<Compound>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.molecular_formula, c.molecular_mass
             FROM identifications i
             JOIN compounds c ON c.id = i.compound_id
             WHERE i.name_id = ?1
             ORDER BY i.rowid",
        )?;

        let rows = stmt.query_map(params![name_id], compound_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_matrix_compounds(&self, matrix_id: i64) -> Result<Vec<Compound>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.molecular_formula, c.molecular_mass
             FROM identifications i
             JOIN compounds c ON c.id = i.compound_id
             WHERE i.matrix_id = ?1
             ORDER BY i.rowid",
        )?;

        let rows = stmt.query_map(params![matrix_id], compound_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // User operations

    fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            }),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, username, password_hash FROM users ORDER BY id")?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO sessions (id, user_id, token_lookup, token_hash, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.user_id,
                session.token_lookup,
                session.token_hash,
                format_datetime(&session.created_at),
                session.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, token_lookup, token_hash, created_at, expires_at, last_used_at
             FROM sessions WHERE token_lookup = ?1",
            params![lookup],
            session_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_session_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![format_datetime(&now)],
        )?;
        Ok(rows)
    }
}
