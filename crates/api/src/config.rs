use std::str::FromStr;
use std::time::Duration;

use greenlight_db::DbConfig;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-field output for local development.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{other}' (expected json|pretty)")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Operating environment name reported by the health check
    /// (`development`, `staging`, `production`).
    pub environment: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `4000`                     |
    /// | `APP_ENV`              | `development`              |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `LOG_FORMAT`           | `json`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let log_format: LogFormat = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "json".into())
            .parse()
            .unwrap_or_else(|e| panic!("LOG_FORMAT: {e}"));

        Self {
            host,
            port,
            environment,
            cors_origins,
            request_timeout_secs,
            log_format,
        }
    }
}

/// Load database pool settings from environment variables.
///
/// | Env Var                 | Default                          |
/// |-------------------------|----------------------------------|
/// | `DATABASE_URL`          | falls back to `GREENLIGHT_DB_DSN`|
/// | `DB_MAX_OPEN_CONNS`     | `25`                             |
/// | `DB_MAX_IDLE_CONNS`     | `25`                             |
/// | `DB_MAX_IDLE_TIME_SECS` | `900`                            |
pub fn db_config_from_env() -> DbConfig {
    let url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("GREENLIGHT_DB_DSN"))
        .expect("DATABASE_URL (or GREENLIGHT_DB_DSN) must be set");

    let max_open_conns: u32 = std::env::var("DB_MAX_OPEN_CONNS")
        .unwrap_or_else(|_| "25".into())
        .parse()
        .expect("DB_MAX_OPEN_CONNS must be a valid u32");

    let max_idle_conns: u32 = std::env::var("DB_MAX_IDLE_CONNS")
        .unwrap_or_else(|_| "25".into())
        .parse()
        .expect("DB_MAX_IDLE_CONNS must be a valid u32");

    let max_idle_time_secs: u64 = std::env::var("DB_MAX_IDLE_TIME_SECS")
        .unwrap_or_else(|_| "900".into())
        .parse()
        .expect("DB_MAX_IDLE_TIME_SECS must be a valid u64");

    DbConfig {
        url,
        max_open_conns,
        max_idle_conns,
        max_idle_time: Duration::from_secs(max_idle_time_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_values() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
