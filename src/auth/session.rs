use std::sync::LazyLock;

use chrono::Utc;
use uuid::Uuid;

use super::{Hasher, TokenGenerator, parse_token};
use crate::error::{Error, Result};
use crate::server::AppState;
use crate::server::validation::validate_username;
use crate::store::Store;
use crate::types::{Session, User};

const MAX_SESSION_RETRIES: u32 = 3;

// Verified against on unknown usernames so a miss costs as much as a wrong password.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| Hasher::for_passwords().hash("chemdb-unknown-user").ok());

#[derive(Debug)]
pub enum SessionError {
    InvalidToken,
    Expired,
    UnknownUser,
    InternalError,
}

pub struct AuthenticatedSession {
    pub session: Session,
    pub user: User,
}

/// Checks a username and password against the stored argon2 hash.
/// Returns `None` for an unknown user or a wrong password.
/// Runs a full argon2 verification either way; call it off the async runtime.
pub fn verify_credentials(store: &dyn Store, username: &str, password: &str) -> Result<Option<User>> {
    let hasher = Hasher::for_passwords();

    let Some(user) = store.get_user_by_username(username)? else {
        if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
            let _ = hasher.verify(password, hash);
        }
        return Ok(None);
    };

    if hasher.verify(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Creates a user with a freshly hashed password.
pub fn register_user(store: &dyn Store, username: &str, password: &str) -> Result<User> {
    validate_username(username).map_err(Error::InvalidUsername)?;
    let hash = Hasher::for_passwords().hash(password)?;
    store.create_user(username, &hash)
}

/// Persists a new session for `user` and returns the raw token for the cookie.
/// Expired sessions of any user are purged first.
pub fn start_session(state: &AppState, user: &User) -> Result<String> {
    match state.store.delete_expired_sessions(Utc::now()) {
        Ok(0) => {}
        Ok(purged) => tracing::debug!("Purged {purged} expired sessions"),
        Err(e) => tracing::warn!("Failed to purge expired sessions: {e}"),
    }

    let generator = TokenGenerator::new();

    for _ in 0..MAX_SESSION_RETRIES {
        let (raw_token, lookup, hash) = generator.generate()?;

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            token_lookup: lookup,
            token_hash: hash,
            created_at: now,
            expires_at: state.session.ttl().map(|ttl| now + ttl),
            last_used_at: None,
        };

        match state.store.create_session(&session) {
            Ok(()) => return Ok(raw_token),
            Err(Error::TokenLookupCollision) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenLookupCollision)
}

/// Resolves a session cookie value to its session and user.
pub fn load_session_user(
    state: &AppState,
    raw_token: &str,
) -> std::result::Result<AuthenticatedSession, SessionError> {
    let session = find_session(state, raw_token)
        .map_err(|_| SessionError::InternalError)?
        .ok_or(SessionError::InvalidToken)?;

    if session.is_expired(Utc::now()) {
        if let Err(e) = state.store.delete_session(&session.id) {
            tracing::warn!("Failed to delete expired session: {e}");
        }
        return Err(SessionError::Expired);
    }

    let user = state
        .store
        .get_user(session.user_id)
        .map_err(|_| SessionError::InternalError)?
        .ok_or(SessionError::UnknownUser)?;

    if let Err(e) = state.store.update_session_last_used(&session.id) {
        tracing::warn!("Failed to update session last_used_at: {e}");
    }

    Ok(AuthenticatedSession { session, user })
}

/// Deletes the session behind `raw_token`, if it is a valid one.
/// Returns whether a session was removed.
pub fn end_session(state: &AppState, raw_token: &str) -> Result<bool> {
    match find_session(state, raw_token)? {
        Some(session) => state.store.delete_session(&session.id),
        None => Ok(false),
    }
}

fn find_session(state: &AppState, raw_token: &str) -> Result<Option<Session>> {
    let Ok((lookup, _secret)) = parse_token(raw_token) else {
        return Ok(None);
    };

    let Some(session) = state.store.get_session_by_lookup(&lookup)? else {
        return Ok(None);
    };

    if !TokenGenerator::new().verify(raw_token, &session.token_hash)? {
        return Ok(None);
    }

    Ok(Some(session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::config::ServerConfig;
    use crate::store::SqliteStore;

    fn test_state(config: ServerConfig) -> (TempDir, AppState) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, AppState::new(Arc::new(store), &config))
    }

    #[test]
    fn test_verify_credentials() {
        let (_temp, state) = test_state(ServerConfig::default());
        let store = state.store.as_ref();
        register_user(store, "alice", "s3cret").unwrap();

        let user = verify_credentials(store, "alice", "s3cret").unwrap();
        assert_eq!(user.map(|u| u.username), Some("alice".to_string()));

        assert!(verify_credentials(store, "alice", "wrong").unwrap().is_none());
        assert!(verify_credentials(store, "bob", "s3cret").unwrap().is_none());
    }

    #[test]
    fn test_register_rejects_invalid_username() {
        let (_temp, state) = test_state(ServerConfig::default());

        let result = register_user(state.store.as_ref(), "two words", "s3cret");
        assert!(matches!(result, Err(Error::InvalidUsername(_))));
        assert!(state.store.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let (_temp, state) = test_state(ServerConfig::default());
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();

        assert!(user.password_hash.starts_with("$argon2id$"));
        assert!(!user.password_hash.contains("s3cret"));
    }

    #[test]
    fn test_session_round_trip_and_end() {
        let (_temp, state) = test_state(ServerConfig::default());
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();

        let raw = start_session(&state, &user).unwrap();
        let loaded = load_session_user(&state, &raw).unwrap();
        assert_eq!(loaded.user.id, user.id);
        assert!(loaded.session.expires_at.is_none());

        assert!(end_session(&state, &raw).unwrap());
        assert!(matches!(
            load_session_user(&state, &raw),
            Err(SessionError::InvalidToken)
        ));
        assert!(!end_session(&state, &raw).unwrap());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let (_temp, state) = test_state(ServerConfig::default());
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();
        let raw = start_session(&state, &user).unwrap();

        let last = if raw.ends_with('0') { '1' } else { '0' };
        let tampered = format!("{}{last}", &raw[..raw.len() - 1]);

        assert!(matches!(
            load_session_user(&state, &tampered),
            Err(SessionError::InvalidToken)
        ));
        assert!(matches!(
            load_session_user(&state, "garbage"),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_session_is_rejected_and_deleted() {
        let (_temp, state) = test_state(ServerConfig::default());
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();
        let raw = start_session(&state, &user).unwrap();

        let (lookup, _) = parse_token(&raw).unwrap();
        let session = state.store.get_session_by_lookup(&lookup).unwrap().unwrap();
        state.store.delete_session(&session.id).unwrap();
        state
            .store
            .create_session(&Session {
                expires_at: Some(Utc::now() - chrono::Duration::seconds(1)),
                ..session
            })
            .unwrap();

        assert!(matches!(
            load_session_user(&state, &raw),
            Err(SessionError::Expired)
        ));
        assert!(state.store.get_session_by_lookup(&lookup).unwrap().is_none());
    }

    #[test]
    fn test_unknown_user_still_verifies_a_hash() {
        let hash = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let (_temp, state) = test_state(ServerConfig::default());
        let result = verify_credentials(state.store.as_ref(), "nobody", "chemdb-unknown-user");
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_start_session_purges_expired_sessions() {
        let (_temp, state) = test_state(ServerConfig::default());
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();
        let stale = start_session(&state, &user).unwrap();

        let (lookup, _) = parse_token(&stale).unwrap();
        let session = state.store.get_session_by_lookup(&lookup).unwrap().unwrap();
        state.store.delete_session(&session.id).unwrap();
        state
            .store
            .create_session(&Session {
                expires_at: Some(Utc::now() - chrono::Duration::seconds(1)),
                ..session
            })
            .unwrap();

        let fresh = start_session(&state, &user).unwrap();

        assert!(state.store.get_session_by_lookup(&lookup).unwrap().is_none());
        assert!(load_session_user(&state, &fresh).is_ok());
    }

    #[test]
    fn test_ttl_sets_expiry() {
        let mut config = ServerConfig::default();
        config.session.ttl_seconds = Some(600);
        let (_temp, state) = test_state(config);
        let user = register_user(state.store.as_ref(), "alice", "s3cret").unwrap();

        let raw = start_session(&state, &user).unwrap();
        let loaded = load_session_user(&state, &raw).unwrap();

        let expires_at = loaded.session.expires_at.unwrap();
        assert!(expires_at > Utc::now());
        assert!(expires_at <= Utc::now() + chrono::Duration::seconds(600));
    }
}
