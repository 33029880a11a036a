//! Application state

use aws_sdk_s3::Client as S3Client;
use dashmap::DashMap;
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use uuid::Uuid;

use crate::auth::{AuthProvider, HostedAuthProvider, LoginThrottle};
use crate::config::Config;
use crate::live::ChangeHub;
use crate::media::{MediaHost, S3MediaHost};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Mark cookies `Secure` (everything but development)
    pub secure_cookies: bool,
    /// Uploaded image storage
    pub media: Arc<dyn MediaHost>,
    /// Hosted sign-in; `None` when not configured
    pub auth_provider: Option<Arc<dyn AuthProvider>>,
    /// Login attempt throttle
    pub login_throttle: LoginThrottle,
    /// Realtime change fan-out
    pub changes: ChangeHub,
    /// Open realtime sockets per user
    pub ws_connections: Arc<DashMap<Uuid, AtomicUsize>>,
}

impl AppState {
    /// Create a new AppState: connect, migrate, build clients
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let media = S3MediaHost::new(
            S3Client::new(&aws_config),
            config.media_bucket.clone(),
            config.media_public_base_url.clone(),
            config.media_folder.clone(),
        );

        let auth_provider: Option<Arc<dyn AuthProvider>> =
            match (&config.auth_provider_url, &config.auth_provider_key) {
                (Some(url), Some(key)) => {
                    Some(Arc::new(HostedAuthProvider::new(url.clone(), key.clone())))
                }
                _ => None,
            };

        Ok(Self::from_parts(
            pool,
            config.jwt_secret.clone(),
            !config.is_development(),
            Arc::new(media),
            auth_provider,
        ))
    }

    pub fn from_parts(
        pool: PgPool,
        jwt_secret: String,
        secure_cookies: bool,
        media: Arc<dyn MediaHost>,
        auth_provider: Option<Arc<dyn AuthProvider>>,
    ) -> Self {
        Self {
            pool,
            jwt_secret,
            secure_cookies,
            media,
            auth_provider,
            login_throttle: LoginThrottle::new(),
            changes: ChangeHub::new(),
            ws_connections: Arc::new(DashMap::new()),
        }
    }
}
