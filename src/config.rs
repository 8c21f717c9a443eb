use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_FILE: &str = "data/world_kpi_anonym.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Service settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Semicolon-delimited KPI file served by the API.
    pub data_file: PathBuf,
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// Built frontend to serve for routes the API does not handle.
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            static_dir: None,
        }
    }
}

impl Config {
    /// Read `DATA_FILE`, `HOST`, `PORT`, `CORS_ORIGINS` and `STATIC_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{raw}'"))?,
            None => defaults.port,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            data_file: get("DATA_FILE").map(PathBuf::from).unwrap_or(defaults.data_file),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            cors_origins,
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert!(cfg.allows_any_origin());
    }

    #[test]
    fn reads_every_key() {
        let cfg = config(&[
            ("DATA_FILE", "/srv/kpi.csv"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://localhost:5173, https://kpi.example.com"),
            ("STATIC_DIR", "frontend/dist"),
        ])
        .unwrap();
        assert_eq!(cfg.data_file, PathBuf::from("/srv/kpi.csv"));
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(
            cfg.cors_origins,
            vec!["http://localhost:5173", "https://kpi.example.com"]
        );
        assert!(!cfg.allows_any_origin());
        assert_eq!(cfg.static_dir, Some(PathBuf::from("frontend/dist")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config(&[("PORT", "  "), ("DATA_FILE", "")]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
