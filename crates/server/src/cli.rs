//! Command-line flags. Anything given here wins over `config.toml` and the
//! environment.

use std::path::PathBuf;

use clap::Parser;
use configs::AppConfig;

/// In-memory JSON document store over HTTP
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(about = "In-memory JSON document store over HTTP")]
#[command(version)]
pub struct Cli {
    /// Bind address and port, e.g. `:8080` or `127.0.0.1:8080`
    #[arg(long)]
    pub bind: Option<String>,
    /// Path to log file (stdout when omitted)
    #[arg(long)]
    pub log: Option<PathBuf>,
    /// Path to pid file
    #[arg(long)]
    pub pid: Option<PathBuf>,
    /// Config file (defaults to $CONFIG_PATH, then ./config.toml)
    #[arg(short, long)]
    pub config: Option<String>,
    /// Number of independently locked store segments
    #[arg(long)]
    pub segments: Option<usize>,
}

impl Cli {
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = AppConfig::load_or_env(self.config.as_deref())?;
        self.apply(&mut cfg)?;
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(bind) = &self.bind {
            cfg.server.set_bind(bind)?;
        }
        if let Some(log) = &self.log {
            cfg.logging.path = Some(log.clone());
        }
        if let Some(pid) = &self.pid {
            cfg.process.pid_file = Some(pid.clone());
        }
        if let Some(segments) = self.segments {
            cfg.store.segments = segments;
        }
        cfg.normalize_and_validate()
    }
}
