use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// A family account allowed to log in.
///
/// Accounts live in configuration rather than the database: the household
/// roster is small and fixed, and rotating a password is a config edit.
#[derive(Debug, Deserialize, Clone)]
pub struct AccountConfig {
    pub username: String,
    /// Argon2 hash of the account password (PHC string format).
    pub password_hash: String,
    /// `admin` or `user`.
    pub role: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens, in hours.
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for the filesystem object store.
    pub root: String,
    /// Maximum accepted upload size in bytes.
    pub max_object_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("storage.root", "./data/objects")?
            .set_default("storage.max_object_size", 10 * 1024 * 1024)?
            // Layered files: committed defaults, then local overrides
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override from environment (e.g., FAMVAULT__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("FAMVAULT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Looks up a configured account by username.
    pub fn find_account(&self, username: &str) -> Option<&AccountConfig> {
        self.auth.accounts.iter().find(|a| a.username == username)
    }
}
