use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Which `Store` implementation backs the app. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NutritionixConfig {
    pub app_id: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    /// `None` unless both Nutritionix credentials are present.
    pub nutritionix: Option<NutritionixConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.into());

        let database_url = non_empty("DATABASE_URL");
        let storage = match non_empty("STORAGE_BACKEND").as_deref() {
            Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres storage backend");
        }

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: or_default("JWT_ISSUER", "nutriplan"),
            audience: or_default("JWT_AUDIENCE", "nutriplan-users"),
            ttl_minutes: parsed(&var, "JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: parsed(&var, "JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };

        let nutritionix = match (
            non_empty("NUTRITIONIX_APP_ID"),
            non_empty("NUTRITIONIX_API_KEY"),
        ) {
            (Some(app_id), Some(api_key)) => Some(NutritionixConfig {
                app_id,
                api_key,
                base_url: or_default("NUTRITIONIX_BASE_URL", "https://trackapi.nutritionix.com"),
                timeout_secs: parsed(&var, "NUTRITIONIX_TIMEOUT_SECS").unwrap_or(5),
            }),
            _ => None,
        };

        Ok(Self {
            host: or_default("APP_HOST", "0.0.0.0"),
            port: parsed(&var, "APP_PORT").unwrap_or(8080),
            storage,
            database_url,
            database_max_connections: parsed(&var, "DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            nutritionix,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    var(key).and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            storage: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 10,
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            nutritionix: None,
        }
    }

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory_without_database_url() {
        let cfg = load(&[("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.jwt.issuer, "nutriplan");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert!(cfg.nutritionix.is_none());
    }

    #[test]
    fn database_url_selects_postgres() {
        let cfg = load(&[("JWT_SECRET", "s"), ("DATABASE_URL", "postgres://db/app")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Postgres);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://db/app"));
    }

    #[test]
    fn explicit_backend_wins_over_database_url() {
        let cfg = load(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://db/app"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
    }

    #[test]
    fn rejects_unknown_backend_and_postgres_without_url() {
        let err = load(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "sqlite")]).unwrap_err();
        assert!(err.to_string().contains("unknown STORAGE_BACKEND"));

        let err = load(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "postgres")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL is required"));

        let err = load(&[
            ("JWT_SECRET", "s"),
            ("STORAGE_BACKEND", "postgres"),
            ("DATABASE_URL", " "),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL is required"));
    }

    #[test]
    fn jwt_secret_is_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn nutritionix_needs_both_credentials() {
        assert!(load(&[("JWT_SECRET", "s"), ("NUTRITIONIX_APP_ID", "id")])
            .unwrap()
            .nutritionix
            .is_none());
        assert!(load(&[
            ("JWT_SECRET", "s"),
            ("NUTRITIONIX_APP_ID", "id"),
            ("NUTRITIONIX_API_KEY", "  "),
        ])
        .unwrap()
        .nutritionix
        .is_none());

        let cfg = load(&[
            ("JWT_SECRET", "s"),
            ("NUTRITIONIX_APP_ID", "id"),
            ("NUTRITIONIX_API_KEY", "key"),
            ("NUTRITIONIX_TIMEOUT_SECS", "9"),
        ])
        .unwrap();
        let nx = cfg.nutritionix.unwrap();
        assert_eq!(nx.app_id, "id");
        assert_eq!(nx.timeout_secs, 9);
        assert_eq!(nx.base_url, "https://trackapi.nutritionix.com");
    }

    #[test]
    fn socket_addr_parses_host_and_port() {
        let addr = config().socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn socket_addr_rejects_garbage_host() {
        let mut cfg = config();
        cfg.host = "not a host".into();
        assert!(cfg.socket_addr().is_err());
    }
}
