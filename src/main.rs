use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chemdb::auth::register_user;
use chemdb::config::{DB_FILE_NAME, ServerConfig};
use chemdb::error::Error;
use chemdb::server::validation::validate_username;
use chemdb::server::{AppState, create_router};
use chemdb::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "chemdb")]
#[command(about = "A catalog of chemical compounds and where they were identified", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory holding the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the data directory and database schema
    Init {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Create a user allowed to add and delete records
    CreateUser {
        /// Login name
        #[arg(long)]
        username: String,

        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// List users
    ListUsers {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Delete a user and end their sessions
    DeleteUser {
        /// Login name
        #[arg(long)]
        username: String,

        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

fn open_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let db_path = data_dir.join(DB_FILE_NAME);
    if !db_path.exists() {
        bail!(
            "Database not found at {}. Run 'chemdb admin init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;
    Ok(store)
}

fn run_init(data_dir: &Path, non_interactive: bool) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DB_FILE_NAME);
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Database ready at {}", db_path.display());

    if !non_interactive {
        create_user_prompt(&store)?;
    }

    Ok(())
}

fn create_user_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a user?")
        .with_default(true)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let username = inquire::Text::new("Username:")
        .with_validator(|input: &str| {
            Ok(validate_username(input)
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;

    let password = prompt_password()?;
    let user = register_user(store, &username, &password)?;

    println!("Created user '{}'", user.username);
    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    let password = inquire::Password::new("Password:").prompt()?;
    Ok(password)
}

fn run_create_user(
    data_dir: &Path,
    username: &str,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    validate_username(username).map_err(anyhow::Error::msg)?;

    let store = open_store(data_dir)?;

    let password = match password {
        Some(p) => p,
        None if non_interactive => bail!("--password is required in non-interactive mode"),
        None => prompt_password()?,
    };

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    match register_user(&store, username, &password) {
        Ok(user) => {
            println!("Created user '{}' (id {})", user.username, user.id);
            Ok(())
        }
        Err(Error::AlreadyExists) => bail!("User '{username}' already exists"),
        Err(e) => Err(e.into()),
    }
}

fn run_list_users(data_dir: &Path) -> anyhow::Result<()> {
    let store = open_store(data_dir)?;

    for user in store.list_users()? {
        println!("{}\t{}", user.id, user.username);
    }

    Ok(())
}

fn run_delete_user(data_dir: &Path, username: &str) -> anyhow::Result<()> {
    let store = open_store(data_dir)?;

    let Some(user) = store.get_user_by_username(username)? else {
        bail!("User '{username}' not found");
    };

    store.delete_user(user.id)?;
    println!("Deleted user '{username}'");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn run_serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }

    let store = open_store(&config.data_dir)?;

    info!("Using database {}", config.db_path().display());
    info!("Delete policy: {}", config.delete_policy);

    let state = Arc::new(AppState::new(Arc::new(store), &config));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chemdb=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => run_init(&data_dir, non_interactive)?,
            AdminCommands::CreateUser {
                username,
                password,
                data_dir,
                non_interactive,
            } => run_create_user(&data_dir, &username, password, non_interactive)?,
            AdminCommands::ListUsers { data_dir } => run_list_users(&data_dir)?,
            AdminCommands::DeleteUser { username, data_dir } => {
                run_delete_user(&data_dir, &username)?;
            }
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => run_serve(config, host, port, data_dir).await?,
    }

    Ok(())
}
