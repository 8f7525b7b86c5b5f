use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Process configuration, loaded once at startup (SPEC_FULL.md §6.1).
/// Every field here is required; a missing key fails the process at boot
/// rather than falling back to a silent default for anything security
/// sensitive.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_redirect_uri: String,
    pub frontend_base_url: String,
    pub allowed_origins: Vec<String>,
    pub statement_timeout_ms: u64,
}

impl AppConfig {
    /// Reads and validates configuration from the environment. Panics at
    /// boot (not silently) if a required key is missing or malformed.
    pub fn from_env() -> Self {
        let jwt_secret = require_env("JWT_SECRET");
        if jwt_secret.len() < 32 {
            panic!("JWT_SECRET must be at least 32 characters for security");
        }

        let allowed_origins = require_env("ALLOWED_ORIGINS")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into()),
            database_url: require_env("DATABASE_URL"),
            jwt_secret,
            jwt_ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(604_800),
            oauth_client_id: require_env("OAUTH_CLIENT_ID"),
            oauth_client_secret: require_env("OAUTH_CLIENT_SECRET"),
            oauth_redirect_uri: require_env("OAUTH_REDIRECT_URI"),
            frontend_base_url: require_env("FRONTEND_BASE_URL"),
            allowed_origins,
            statement_timeout_ms: std::env::var("STATEMENT_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),
        }
    }
}

fn require_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("missing required environment variable {key}"))
}

#[derive(Clone)]
pub struct AppState {
    pub connections: ConnectionInfoMap,
    pub indices: ConnectionIndices,
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = PgPoolOptions::new()
            .max_connections(50)
            .min_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            connections: Default::default(),
            indices: Default::default(),
            db: pool,
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
        })
    }
}

#[derive(Debug)]
pub struct ConnectionInfo {
    pub user_id: Uuid,
    pub sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

pub type ConnectionInfoMap = Arc<Mutex<HashMap<Uuid, Arc<ConnectionInfo>>>>;

/// Secondary lookup indices over `connections`, keyed the way the bus needs
/// to fan out (§4.9): by tournament (participant user ids currently
/// connected) and by user (a user may hold several connections at once).
#[derive(Debug, Default)]
pub struct ConnectionIndicesInner {
    pub by_tournament: HashMap<Uuid, HashSet<Uuid>>,
    pub by_user: HashMap<Uuid, HashSet<Uuid>>,
}

pub type ConnectionIndices = Arc<Mutex<ConnectionIndicesInner>>;
