// config.rs
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(String);

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub port: u16,
    pub redis_url: Option<String>,
    pub cors_origins: Vec<String>,
    /// JSON file loaded into the in-memory store at startup.
    pub seed_file: Option<String>,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET_KEY")
            .ok_or_else(|| ConfigError("JWT_SECRET_KEY must be set".to_string()))?;

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError(format!("PORT must be a valid port number, got {}", raw)))?,
            None => 8000,
        };

        let db_max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError(format!("DB_MAX_CONNECTIONS must be a number, got {}", raw)))?,
            None => 10,
        };

        let cors_origins = non_empty("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:5173".to_string()]);

        Ok(Config {
            database_url: non_empty("DATABASE_URL"),
            db_max_connections,
            jwt_secret,
            port,
            redis_url: non_empty("REDIS_URL"),
            cors_origins,
            seed_file: non_empty("SEED_FILE"),
        })
    }
}
