//! Server configuration from the environment.
//!
//! `HOST` and `PORT` pick the bind address (default `0.0.0.0:8080`). `LEAGUE_SEED` points at a
//! JSON file with tournaments, brackets, stops, teams and players to load at startup;
//! `LEAGUE_PLAYERS_CSV` at a CSV of extra players (`name,gender[,id]`).

use std::env;
use std::path::PathBuf;

macro_rules! from_environment {
    ($config:expr, $lookup:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            if let Some(value) = $lookup($key) {
                match value.parse() {
                    Ok(value) => $config.$name = value,
                    Err(_) => log::warn!("Ignoring invalid value for {}: {:?}", $key, value),
                }
            }
        )*
    }};
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub seed_path: Option<PathBuf>,
    pub players_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            seed_path: None,
            players_csv: None,
        }
    }
}

impl Config {
    pub fn from_environment() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut this = Self::default();
        from_environment!(this, lookup, "HOST", host, "PORT", port);
        this.seed_path = non_empty(lookup("LEAGUE_SEED")).map(PathBuf::from);
        this.players_csv = non_empty(lookup("LEAGUE_PLAYERS_CSV")).map(PathBuf::from);
        this
    }

    pub fn bind(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
