use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wellness_sessions::{
    auth::{
        password::PasswordHasher,
        repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
        token::TokenConfig,
    },
    session::repository::{
        InMemorySessionRepository, PostgresSessionRepository, SessionRepository,
    },
    app_router, AppConfig, AppState,
};

type Repositories = (
    Arc<dyn SessionRepository + Send + Sync>,
    Arc<dyn UserRepository + Send + Sync>,
);

/// Connects to PostgreSQL and applies migrations, or falls back to in-memory stores
async fn init_repositories(config: &AppConfig) -> Result<Repositories, sqlx::Error> {
    let Some(database_url) = &config.database_url else {
        info!("DATABASE_URL not set, using in-memory repositories");
        return Ok((
            Arc::new(InMemorySessionRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        ));
    };

    let pool = sqlx::PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database connected and migrations applied");

    Ok((
        Arc::new(PostgresSessionRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
    ))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellness_sessions=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting wellness sessions server");

    let config = AppConfig::from_env();

    let (session_repository, user_repository) = match init_repositories(&config).await {
        Ok(repositories) => repositories,
        Err(e) => {
            error!(error = %e, "Failed to initialise the database");
            process::exit(1);
        }
    };

    let app_state = AppState::new(
        session_repository,
        user_repository,
        TokenConfig::new(config.jwt_secret.clone(), config.jwt_expiration_hours),
        PasswordHasher::new(config.bcrypt_cost),
    );

    let app = app_router(app_state);

    let address = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %address, "Failed to bind listener");
            process::exit(1);
        }
    };
    info!("Server running on http://{}", address);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server terminated with an error");
        process::exit(1);
    }
}
