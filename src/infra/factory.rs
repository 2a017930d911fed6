use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::{AppState, Repositories};
use crate::infra::auth::jwt_identity::JwtIdentityResolver;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    postgres_attendee_repo::PostgresAttendeeRepo, postgres_event_repo::PostgresEventRepo,
    postgres_token_repo::PostgresTokenRepo, postgres_check_in_repo::PostgresCheckInRepo,
    postgres_event_session_repo::PostgresEventSessionRepo,
    sqlite_attendee_repo::SqliteAttendeeRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_token_repo::SqliteTokenRepo, sqlite_check_in_repo::SqliteCheckInRepo,
    sqlite_event_session_repo::SqliteEventSessionRepo,
};

pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("qr_email.html", include_str!("../templates/qr_email.html")),
        ("redeem_success.html", include_str!("../templates/redeem_success.html")),
        ("redeem_failure.html", include_str!("../templates/redeem_failure.html")),
    ])?;
    Ok(tera)
}

pub fn sqlite_repositories(pool: &SqlitePool) -> Repositories {
    Repositories {
        attendees: Arc::new(SqliteAttendeeRepo::new(pool.clone())),
        events: Arc::new(SqliteEventRepo::new(pool.clone())),
        tokens: Arc::new(SqliteTokenRepo::new(pool.clone())),
        check_ins: Arc::new(SqliteCheckInRepo::new(pool.clone())),
        sessions: Arc::new(SqliteEventSessionRepo::new(pool.clone())),
    }
}

pub fn postgres_repositories(pool: &PgPool) -> Repositories {
    Repositories {
        attendees: Arc::new(PostgresAttendeeRepo::new(pool.clone())),
        events: Arc::new(PostgresEventRepo::new(pool.clone())),
        tokens: Arc::new(PostgresTokenRepo::new(pool.clone())),
        check_ins: Arc::new(PostgresCheckInRepo::new(pool.clone())),
        sessions: Arc::new(PostgresEventSessionRepo::new(pool.clone())),
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let identity = Arc::new(JwtIdentityResolver::new(
        &config.session_secret,
        config.auth_issuer.clone(),
    ));
    let templates = Arc::new(load_templates().expect("Failed to load page templates"));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        postgres_repositories(&pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(sqlite_options(database_url))
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        sqlite_repositories(&pool)
    };

    AppState::assemble(config.clone(), repos, email_service, identity, templates)
}

pub fn sqlite_options(database_url: &str) -> SqliteConnectOptions {
    SqliteConnectOptions::from_str(database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500))
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
