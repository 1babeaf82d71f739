//! Centralized configuration (environment variables + defaults).

use crate::transport::http::rate_limit::RateLimitConfig;
use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_FILE: &str = "db.json";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageConfig,
    pub object_storage: ObjectStorageConfig,
    pub rate_limit: RateLimitConfig,
}

/// Which persistence adapter backs the catalog.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(PostgresSettings),
    File { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub database_url: String,
    /// When true the server certificate and host name are verified (unless the
    /// URL sets its own `sslmode`); when false TLS is required but not verified.
    pub reject_unauthorized: bool,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    pub region: String,
    /// Uploads are served from an in-memory store when no bucket is configured.
    pub bucket: Option<String>,
    /// Optional S3-compatible endpoint (MinIO, LocalStack, ...).
    pub endpoint: Option<String>,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("PORT must be a valid port, got '{v}'"))?,
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL");
        let backend = get("STORAGE_BACKEND")
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|| {
                let default = if database_url.is_some() { "postgres" } else { "file" };
                default.to_string()
            });

        let storage = match backend.as_str() {
            "postgres" => {
                let database_url = database_url
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set for the postgres backend"))?;
                let reject_unauthorized = match get("DB_SSL_REJECT_UNAUTHORIZED") {
                    Some(v) => parse_bool("DB_SSL_REJECT_UNAUTHORIZED", &v)?,
                    None => true,
                };
                let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                    Some(v) => v
                        .parse::<u32>()
                        .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?
                        .max(1),
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                StorageConfig::Postgres(PostgresSettings {
                    database_url,
                    reject_unauthorized,
                    max_connections,
                })
            }
            "file" => StorageConfig::File {
                path: PathBuf::from(get("DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())),
            },
            other => bail!("STORAGE_BACKEND must be 'postgres' or 'file', got '{other}'"),
        };

        let object_storage = ObjectStorageConfig {
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: get("AWS_BUCKET_NAME"),
            endpoint: get("S3_ENDPOINT"),
        };

        let mut rate_limit = RateLimitConfig::default();
        if let Some(v) = get("RATE_LIMIT_MAX") {
            let max = v.parse::<u64>().context("RATE_LIMIT_MAX must be a valid u64")?;
            if max == 0 {
                bail!("RATE_LIMIT_MAX must be at least 1");
            }
            rate_limit.max_requests = max;
        }
        if let Some(v) = get("RATE_LIMIT_WINDOW_SECS") {
            let secs = v
                .parse::<u64>()
                .context("RATE_LIMIT_WINDOW_SECS must be a valid u64")?;
            rate_limit.window = Duration::from_secs(secs.max(1));
        }

        Ok(Self {
            port,
            storage,
            object_storage,
            rate_limit,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => bail!("{key} must be a boolean, got '{value}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_to_file_backend() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.port, 3000);
        match cfg.storage {
            StorageConfig::File { path } => assert_eq!(path, PathBuf::from("db.json")),
            other => panic!("unexpected backend {other:?}"),
        }
        assert_eq!(cfg.rate_limit.max_requests, 100);
        assert_eq!(cfg.rate_limit.window, Duration::from_secs(15 * 60));
        assert!(cfg.object_storage.bucket.is_none());
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DB_SSL_REJECT_UNAUTHORIZED", "false"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        match cfg.storage {
            StorageConfig::Postgres(s) => {
                assert_eq!(s.database_url, "postgres://localhost/catalog");
                assert!(!s.reject_unauthorized);
                assert_eq!(s.max_connections, 5);
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn explicit_file_backend_wins_over_database_url() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("STORAGE_BACKEND", "file"),
            ("DATA_FILE", "/tmp/catalog.json"),
        ])
        .unwrap();
        assert!(matches!(cfg.storage, StorageConfig::File { .. }));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("STORAGE_BACKEND", "postgres")]).is_err());
        assert!(load(&[("STORAGE_BACKEND", "mongo")]).is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgres://x"),
            ("DB_SSL_REJECT_UNAUTHORIZED", "maybe")
        ])
        .is_err());
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        assert!(load(&[("RATE_LIMIT_MAX", "0")]).is_err());
        assert_eq!(load(&[("RATE_LIMIT_MAX", "1")]).unwrap().rate_limit.max_requests, 1);
    }

    #[test]
    fn rate_limit_overrides() {
        let cfg = load(&[("RATE_LIMIT_MAX", "3"), ("RATE_LIMIT_WINDOW_SECS", "60")]).unwrap();
        assert_eq!(cfg.rate_limit.max_requests, 3);
        assert_eq!(cfg.rate_limit.window, Duration::from_secs(60));
    }
}
