//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::projectile::DEFAULT_POOL_SIZE;
use crate::util::time::DEFAULT_TICK_RATE;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON logs instead of the compact format
    pub log_json: bool,

    /// Directory holding the client bundle (`index.html` at its root)
    pub static_dir: PathBuf,
    /// Allowed client origins for CORS, comma-separated. None allows any.
    pub client_origin: Option<String>,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Number of projectile slots in the ring
    pub projectile_pool_size: NonZeroUsize,
    /// Seed for plane spawning; random when unset
    pub world_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            log_json: false,
            static_dir: PathBuf::from("static"),
            client_origin: None,
            tick_rate: DEFAULT_TICK_RATE,
            projectile_pool_size: NonZeroUsize::new(DEFAULT_POOL_SIZE).unwrap_or(NonZeroUsize::MIN),
            world_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // PORT (hosting platforms) wins over SERVER_ADDR
        let server_addr = match (lookup("PORT"), lookup("SERVER_ADDR")) {
            (Some(port), _) => format!("0.0.0.0:{}", port)
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            (None, Some(addr)) => addr.parse().map_err(|_| ConfigError::InvalidAddress)?,
            (None, None) => defaults.server_addr,
        };

        let tick_rate: u32 = parse_or(&lookup, "TICK_RATE", defaults.tick_rate)?;
        if tick_rate == 0 {
            return Err(ConfigError::Invalid("TICK_RATE"));
        }

        let pool_size: usize = parse_or(
            &lookup,
            "PROJECTILE_POOL_SIZE",
            defaults.projectile_pool_size.get(),
        )?;
        let projectile_pool_size =
            NonZeroUsize::new(pool_size).ok_or(ConfigError::Invalid("PROJECTILE_POOL_SIZE"))?;

        let world_seed = match lookup("WORLD_SEED") {
            Some(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid("WORLD_SEED"))?),
            None => None,
        };

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: matches!(lookup("LOG_FORMAT").as_deref(), Some("json")),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            client_origin: lookup("CLIENT_ORIGIN").filter(|s| !s.trim().is_empty()),
            tick_rate,
            projectile_pool_size,
            world_seed,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
