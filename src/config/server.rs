use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::DeletePolicy;

pub const DB_FILE_NAME: &str = "chemdb.db";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Whether deleting a compound, matrix or name also deletes its identifications.
    pub delete_policy: DeletePolicy,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Mark the session cookie `Secure`. Enable when served over HTTPS.
    pub secure_cookie: bool,
    /// Server-side session lifetime. Unset means sessions live until logout.
    pub ttl_seconds: Option<i64>,
}

impl ServerConfig {
    /// Reads a TOML config file. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.cookie_name.trim().is_empty() {
            return Err(Error::Config("session.cookie_name cannot be empty".into()));
        }
        if let Some(ttl) = self.session.ttl_seconds {
            if ttl <= 0 {
                return Err(Error::Config(
                    "session.ttl_seconds must be positive".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            delete_policy: DeletePolicy::default(),
            session: SessionConfig::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.ttl_seconds.map(chrono::Duration::seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "chemdb_session".to_string(),
            secure_cookie: false,
            ttl_seconds: None,
        }
    }
}
