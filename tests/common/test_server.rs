use std::path::Path;
use std::sync::Arc;

use chemdb::auth::register_user;
use chemdb::config::ServerConfig;
use chemdb::server::{AppState, create_router};
use chemdb::store::{SqliteStore, Store};
use chemdb::types::DeletePolicy;
use reqwest::{Client, redirect};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const USERNAME: &str = "curator";
pub const PASSWORD: &str = "correct horse battery";

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub store: Arc<SqliteStore>,
    server_task: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_policy(DeletePolicy::Retain).await
    }

    pub async fn start_with_policy(delete_policy: DeletePolicy) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            delete_policy,
            ..ServerConfig::default()
        };

        let store = Arc::new(SqliteStore::new(config.db_path()).expect("open store"));
        store.initialize().expect("initialize schema");
        register_user(&*store, USERNAME, PASSWORD).expect("create test user");

        let state = Arc::new(AppState::new(store.clone(), &config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let app = create_router(state);
        let server_task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url,
            store,
            server_task: Some(server_task),
        }
    }

    /// A browser-like client: keeps cookies, does not follow redirects.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("build client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.server_task.take() {
            task.abort();
        }
    }
}
