//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Hosted auth provider base URL (code exchange)
    pub auth_provider_url: Option<String>,
    /// Hosted auth provider API key
    pub auth_provider_key: Option<String>,
    /// S3 bucket for uploaded images
    pub media_bucket: String,
    /// Public base URL objects in the bucket are served from
    pub media_public_base_url: String,
    /// Key prefix inside the bucket
    pub media_folder: String,
    /// Public origin of this site
    pub public_base_url: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn optional(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|s| !s.trim().is_empty())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let auth_provider_url = Self::optional("AUTH_PROVIDER_URL");
        let auth_provider_key = Self::optional("AUTH_PROVIDER_KEY");
        if auth_provider_url.is_none() || auth_provider_key.is_none() {
            tracing::error!(
                "AUTH_PROVIDER_URL / AUTH_PROVIDER_KEY not set; hosted sign-in is disabled"
            );
        }

        let http_port = std::env::var("HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port,
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            auth_provider_url,
            auth_provider_key,
            media_bucket: std::env::var("MEDIA_BUCKET")
                .unwrap_or_else(|_| "tshirt-vault-media".into()),
            media_public_base_url: std::env::var("MEDIA_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "https://media.tshirtvault.app".into())
                .trim_end_matches('/')
                .to_string(),
            media_folder: std::env::var("MEDIA_FOLDER")
                .unwrap_or_else(|_| shared::upload::DEFAULT_MEDIA_FOLDER.into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{http_port}")),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
