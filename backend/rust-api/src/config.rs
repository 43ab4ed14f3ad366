use chrono::Duration;
use serde::Deserialize;
use std::{env, fmt, str::FromStr};

use crate::models::student::DEFAULT_LIVES;
use crate::services::ledger::{LedgerPolicy, LEVEL_THRESHOLD, LOCKOUT_MINUTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Mongo,
}

impl FromStr for StorageBackend {
    type Err = config::ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(config::ConfigError::Message(format!(
                "unknown storage backend '{}', expected 'memory' or 'mongo'",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Mongo => write!(f, "mongo"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// JSON file of students and exercises loaded into the memory backend.
    pub seed_path: Option<String>,
    pub mongo_uri: String,
    pub mongo_database: String,
    pub bind_addr: String,
    pub max_lives: u32,
    pub lockout_minutes: i64,
    pub level_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            seed_path: None,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_database: "edunow".to_string(),
            bind_addr: "127.0.0.1:8081".to_string(),
            max_lives: DEFAULT_LIVES,
            lockout_minutes: LOCKOUT_MINUTES,
            level_threshold: LEVEL_THRESHOLD,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/{env}.toml first, APP__SECTION__KEY variables on top
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let defaults = Config::default();

        let storage_backend = match settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
        {
            Ok(value) => value.parse()?,
            Err(_) => defaults.storage_backend,
        };

        let seed_path = settings
            .get_string("storage.seed_path")
            .or_else(|_| env::var("SEED_PATH"))
            .ok()
            .filter(|path| !path.trim().is_empty());

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or(defaults.mongo_uri);

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or(defaults.mongo_database);

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let max_lives = read_int(&settings, "ledger.max_lives", defaults.max_lives.into())?;
        let lockout_minutes = read_int(
            &settings,
            "ledger.lockout_minutes",
            defaults.lockout_minutes,
        )?;
        let level_threshold = read_int(
            &settings,
            "ledger.level_threshold",
            defaults.level_threshold.into(),
        )?;

        let config = Config {
            storage_backend,
            seed_path,
            mongo_uri,
            mongo_database,
            bind_addr,
            max_lives: to_positive_u32("ledger.max_lives", max_lives)?,
            lockout_minutes: to_positive_u32("ledger.lockout_minutes", lockout_minutes)?.into(),
            level_threshold: to_positive_u32("ledger.level_threshold", level_threshold)?,
        };

        if config.storage_backend == StorageBackend::Memory && env == "prod" {
            eprintln!(
                "WARNING: memory storage backend selected in production, progress is not durable"
            );
        }

        Ok(config)
    }

    pub fn ledger_policy(&self) -> LedgerPolicy {
        LedgerPolicy {
            max_lives: self.max_lives,
            lockout: Duration::minutes(self.lockout_minutes),
            level_threshold: self.level_threshold,
        }
    }
}

fn read_int(
    settings: &config::Config,
    key: &str,
    default: i64,
) -> Result<i64, config::ConfigError> {
    match settings.get_int(key) {
        Ok(value) => Ok(value),
        Err(config::ConfigError::NotFound(_)) => Ok(default),
        Err(err) => Err(err),
    }
}

fn to_positive_u32(key: &str, value: i64) -> Result<u32, config::ConfigError> {
    u32::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            config::ConfigError::Message(format!(
                "{} must be a positive integer, got {}",
                key, value
            ))
        })
}
