//! Server configuration from command-line flags and environment.
//!
//! # Invariants
//! - Every flag has an environment fallback (`TODO_*`).
//! - The resolved log directory is always absolute.

use chrono::NaiveDate;
use clap::Parser;
use scheduler_core::{default_log_level, parse_date};
use std::io;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7540;
pub const DEFAULT_DB_FILE: &str = "scheduler.db";
pub const DEFAULT_WEB_DIR: &str = "./web";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// Runtime configuration for the scheduler server.
#[derive(Debug, Clone, Parser)]
#[command(name = "scheduler", version, about = "Personal task scheduler HTTP server")]
pub struct ServerConfig {
    /// TCP port to listen on.
    #[arg(long, env = "TODO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "TODO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite database file; created and migrated on first start.
    #[arg(long, env = "TODO_DBFILE", default_value = DEFAULT_DB_FILE)]
    pub db_file: PathBuf,

    /// Directory with the web client served for non-API paths.
    #[arg(long, env = "TODO_WEBDIR", default_value = DEFAULT_WEB_DIR)]
    pub web_dir: PathBuf,

    /// trace|debug|info|warn|error. Defaults to debug in debug builds, info otherwise.
    #[arg(long, env = "TODO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files. Defaults to `./logs`.
    #[arg(long, env = "TODO_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Pin "today" to a YYYYMMDD date instead of reading the system clock.
    #[arg(long, env = "TODO_TODAY", value_parser = parse_today)]
    pub today: Option<NaiveDate>,
}

impl ServerConfig {
    /// `host:port` string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Absolute log directory, resolved against the working directory.
    pub fn resolved_log_dir(&self) -> io::Result<PathBuf> {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR_NAME));
        if dir.is_absolute() {
            return Ok(dir);
        }
        Ok(std::env::current_dir()?.join(dir))
    }
}

fn parse_today(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("`{value}` is not a YYYYMMDD date"))
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, DEFAULT_DB_FILE, DEFAULT_PORT};
    use chrono::NaiveDate;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn explicit_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "scheduler",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--db-file",
            "/tmp/tasks.db",
            "--log-level",
            "warn",
            "--today",
            "20240310",
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.db_file, PathBuf::from("/tmp/tasks.db"));
        assert_eq!(config.log_level(), "warn");
        assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn invalid_today_is_rejected() {
        assert!(ServerConfig::try_parse_from(["scheduler", "--today", "2024-03-10"]).is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::try_parse_from(["scheduler"]).unwrap();
        if std::env::var_os("TODO_PORT").is_none() {
            assert_eq!(config.port, DEFAULT_PORT);
        }
        if std::env::var_os("TODO_DBFILE").is_none() {
            assert_eq!(config.db_file, PathBuf::from(DEFAULT_DB_FILE));
        }
        assert!(config.resolved_log_dir().unwrap().is_absolute());
    }
}
