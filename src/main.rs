use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sitecms::auth::http::HttpIdentity;
use sitecms::auth::reconciler::ReconcilerOptions;
use sitecms::auth::{IdentityError, SessionReconciler, admin_gate};
use sitecms::config::{ConfigError, ServerConfig, role_check_timeout_from_env};
use sitecms::services::account::{self, AccountError};
use sitecms::services::role;
use sitecms::{db, routes, state};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("no user with email {0}")]
    UnknownUser(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("timed out waiting for auth state to settle")]
    Timeout,
    #[error("auth state channel closed")]
    Closed,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sitecms", about = "Marketing-site CMS server and admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Grant a role to an existing account.
    GrantRole {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = sitecms::auth::ADMIN_ROLE)]
        role: String,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Sign in against a running server and print the reconciled auth state.
    Whoami {
        #[arg(long, env = "SITECMS_BASE_URL", default_value = "http://127.0.0.1:3000")]
        base_url: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SITECMS_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_serve().await,
        Command::GrantRole { email, role, database_url } => run_grant_role(&database_url, &email, &role).await,
        Command::Whoami { base_url, email, password } => run_whoami(&base_url, &email, &password).await,
    }
}

async fn run_serve() -> Result<(), CliError> {
    let config = ServerConfig::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;
    tokio::fs::create_dir_all(&config.media_dir).await?;

    let port = config.port;
    let app = routes::app(state::AppState::new(pool, config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "sitecms listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_grant_role(database_url: &str, email: &str, role_name: &str) -> Result<(), CliError> {
    let pool = db::init_pool(database_url).await?;
    let user = account::find_user_by_email(&pool, email)
        .await?
        .ok_or_else(|| CliError::UnknownUser(email.to_owned()))?;

    if role::grant_role(&pool, user.id, role_name).await? {
        eprintln!("granted {role_name} to {}", user.email);
    } else {
        eprintln!("{} already has {role_name}", user.email);
    }
    Ok(())
}

async fn run_whoami(base_url: &str, email: &str, password: &str) -> Result<(), CliError> {
    let identity = Arc::new(HttpIdentity::new(base_url));
    let options = ReconcilerOptions {
        role_check_timeout: role_check_timeout_from_env(),
        ..ReconcilerOptions::default()
    };
    let reconciler = SessionReconciler::with_options(identity.clone(), identity, options);

    let subscription = reconciler.initialize();
    let mut rx = reconciler.subscribe();
    tokio::time::timeout(SETTLE_TIMEOUT, rx.wait_for(|s| !s.loading))
        .await
        .map_err(|_| CliError::Timeout)?
        .map_err(|_| CliError::Closed)?;

    reconciler.sign_in(email, password).await?;

    let settled = tokio::time::timeout(SETTLE_TIMEOUT, rx.wait_for(|s| !s.loading && s.user.is_some()))
        .await
        .map_err(|_| CliError::Timeout)?
        .map_err(|_| CliError::Closed)?
        .clone();
    subscription.unsubscribe();

    let out = serde_json::json!({
        "user": settled.user,
        "is_admin": settled.is_admin,
        "loading": settled.loading,
        "admin_gate": format!("{:?}", admin_gate(&settled)),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
