//! Typed configuration from environment variables.
//!
//! Loads once at startup. Nothing is strictly required: without
//! `DATABASE_URL` the server still runs, and the CRUD routes fail until a
//! database is configured. The connection string is wrapped in
//! secrecy::SecretString to keep it out of logs and diagnostics.

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<SecretString>,
    pub database_name: Option<String>,
    pub max_connections: u32,
    /// Reflect any origin with `Access-Control-Allow-Credentials: true`.
    /// Lets every site make credentialed requests; off unless asked for.
    pub cors_allow_credentials: bool,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: parsed_var("HOST")?.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: parsed_var("PORT")?.unwrap_or(DEFAULT_PORT),
            database_url: optional_var("DATABASE_URL").map(SecretString::from),
            database_name: optional_var("DATABASE_NAME"),
            max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            cors_allow_credentials: flag_var("CORS_ALLOW_CREDENTIALS")?,
            otel_endpoint: optional_var("OTEL_ENDPOINT"),
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Which database variables are present, without their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvPresence {
    pub database_url: bool,
    pub database_name: bool,
}

impl EnvPresence {
    pub fn from_env() -> Self {
        Self {
            database_url: optional_var("DATABASE_URL").is_some(),
            database_name: optional_var("DATABASE_NAME").is_some(),
        }
    }
}

/// Unset and empty are treated the same.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| Error::Config(format!("invalid {name}={raw:?}: {e}")))
        })
        .transpose()
}

fn flag_var(name: &str) -> Result<bool> {
    match optional_var(name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Config(format!("invalid {name}={v:?}: expected a boolean"))),
        },
    }
}
