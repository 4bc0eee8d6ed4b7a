use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log file; stdout when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProcessConfig {
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_segments")]
    pub segments: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { segments: default_segments() }
    }
}

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn default_max_body_bytes() -> usize { 2 * 1024 * 1024 }
fn default_segments() -> usize { 32 }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults overlaid with env vars.
    ///
    /// A path given explicitly (argument or `CONFIG_PATH`) must exist; only
    /// the implicit `./config.toml` may be absent. A file that exists but
    /// fails to parse or validate is an error.
    pub fn load_or_env(path: Option<&str>) -> Result<Self> {
        let explicit = path
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_PATH").ok());
        let mut cfg = match explicit {
            Some(path) => load_from_file(&path).map_err(|e| anyhow!("{path}: {e}"))?,
            None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                load_from_file(DEFAULT_CONFIG_PATH)
                    .map_err(|e| anyhow!("{DEFAULT_CONFIG_PATH}: {e}"))?
            }
            None => {
                let mut cfg = AppConfig::default();
                cfg.server.apply_env();
                cfg
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}

impl ServerConfig {
    fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// Overlay `SERVER_HOST`, `SERVER_PORT` and `TOKIO_WORKER_THREADS` as
    /// returned by `var`; unparsable values are ignored.
    fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = var("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = var("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    /// Apply a `host:port` override. An empty host (`:8080`) listens on all
    /// interfaces.
    pub fn set_bind(&mut self, bind: &str) -> Result<()> {
        let (host, port) = bind
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("bind address must be host:port, got {bind:?}"))?;
        self.port = port
            .parse::<u16>()
            .map_err(|e| anyhow!("invalid port in bind address {bind:?}: {e}"))?;
        self.host = if host.is_empty() {
            "0.0.0.0".to_string()
        } else {
            host.trim_start_matches('[').trim_end_matches(']').to_string()
        };
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("server.max_body_bytes must be > 0"));
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.segments == 0 {
            return Err(anyhow!("store.segments must be >= 1"));
        }
        Ok(())
    }
}
