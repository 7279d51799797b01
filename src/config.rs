use dotenvy::dotenv;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub db_max_connections: u32,
    pub log_dir: PathBuf,
    pub report_dir: PathBuf,
    pub api_base_url: String,
}

impl Config {
    /// ✅ Load `.env`, then environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: var("DATABASE_URL"),
            bind_addr: parse_or(&var, "BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(&var, "PORT", 5000)?,
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 10)?,
            log_dir: PathBuf::from(var("LOG_DIR").unwrap_or_else(|| "logs".to_string())),
            report_dir: PathBuf::from(var("REPORT_DIR").unwrap_or_else(|| "reports".to_string())),
            api_base_url: var("API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:5000/api".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
