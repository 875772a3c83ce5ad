use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Secret used only when APP_ENV is development and no JWT_SECRET is set.
const DEVELOPMENT_JWT_SECRET: &str = "grandson-dev-only-jwt-secret-do-not-deploy";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
    pub shop: ShopConfig,
    pub email: Option<EmailConfig>,
    pub push: Option<PushConfig>,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

/// How the API chooses between Postgres and the in-memory demo catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoMode {
    /// Postgres when reachable, demo data otherwise.
    Auto,
    /// Demo data only, the database is never contacted.
    Always,
    /// Database errors are returned to the caller.
    Never,
}

impl DemoMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "always" | "true" | "1" | "on" => Some(Self::Always),
            "never" | "false" | "0" | "off" => Some(Self::Never),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub demo_mode: DemoMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub currency: String,
    pub order_prefix: String,
    pub low_stock_threshold: i32,
    /// Public storefront URL used in emails and unsubscribe links.
    pub site_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    #[serde(skip_serializing)]
    pub smtp_password: String,
    pub from_address: String,
    pub admin_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub gateway_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend_url: String,
    pub fetch_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("GRANDSON_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Store
        if let Ok(v) = env::var("GRANDSON_DEMO_MODE") {
            if let Some(mode) = DemoMode::parse(&v) {
                self.store.demo_mode = mode;
            }
        }

        // Security
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Shop
        if let Ok(v) = env::var("SHOP_ORDER_PREFIX") {
            self.shop.order_prefix = v;
        }
        if let Ok(v) = env::var("SHOP_LOW_STOCK_THRESHOLD") {
            self.shop.low_stock_threshold = v.parse().unwrap_or(self.shop.low_stock_threshold);
        }
        if let Ok(v) = env::var("SHOP_SITE_URL") {
            self.shop.site_url = v.trim_end_matches('/').to_string();
        }

        // Email (all of host, username, password, from are needed to enable SMTP)
        if let (Ok(host), Ok(username), Ok(password), Ok(from)) = (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
            env::var("SMTP_FROM"),
        ) {
            self.email = Some(EmailConfig {
                smtp_host: host,
                smtp_port: env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(587),
                smtp_username: username,
                smtp_password: password,
                from_address: from,
                admin_address: env::var("ADMIN_NOTIFICATION_EMAIL").ok(),
            });
        }

        // Push
        if let Ok(url) = env::var("PUSH_GATEWAY_URL") {
            self.push = Some(PushConfig {
                gateway_url: url,
                api_key: env::var("PUSH_GATEWAY_API_KEY").ok(),
            });
        }

        // Client
        if let Ok(v) = env::var("GRANDSON_BACKEND_URL") {
            self.client.backend_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("GRANDSON_FETCH_TIMEOUT_MS") {
            self.client.fetch_timeout_ms = v.parse().unwrap_or(self.client.fetch_timeout_ms);
        }

        self
    }

    /// Checks the settings that cannot have a safe default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("JWT_SECRET"));
        }
        if self.environment == Environment::Production && self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                "must be at least 32 characters in production".to_string(),
            ));
        }
        if self.store.demo_mode != DemoMode::Always && self.database.url.is_none() && self.environment == Environment::Production {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn is_demo_forced(&self) -> bool {
        self.store.demo_mode == DemoMode::Always
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 5,
                run_migrations: true,
            },
            store: StoreConfig {
                demo_mode: DemoMode::Auto,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            shop: ShopConfig::default(),
            email: None,
            push: None,
            client: ClientConfig {
                backend_url: "http://localhost:4000".to_string(),
                fetch_timeout_ms: 5_000,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 5,
                run_migrations: true,
            },
            store: StoreConfig {
                demo_mode: DemoMode::Auto,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                enable_cors: true,
                cors_origins: vec!["https://staging.grandsonproject.com".to_string()],
            },
            shop: ShopConfig::default(),
            email: None,
            push: None,
            client: ClientConfig {
                backend_url: "https://api-staging.grandsonproject.com".to_string(),
                fetch_timeout_ms: 5_000,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            store: StoreConfig {
                demo_mode: DemoMode::Auto,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 12,
                enable_cors: true,
                cors_origins: vec!["https://grandsonproject.com".to_string()],
            },
            shop: ShopConfig::default(),
            email: None,
            push: None,
            client: ClientConfig {
                backend_url: "https://api.grandsonproject.com".to_string(),
                fetch_timeout_ms: 5_000,
            },
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            currency: "GNF".to_string(),
            order_prefix: "GP".to_string(),
            low_stock_threshold: 5,
            site_url: "https://grandsonproject.com".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
