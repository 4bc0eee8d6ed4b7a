//! Process environment helpers
//!
//! Pid file handling for supervisors that track the server by pid.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

/// Write the current pid (newline terminated) to `path`, creating parent
/// directories as needed.
pub fn write_pid_file(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let pid = std::process::id();
    std::fs::write(path, format!("{pid}\n"))
        .with_context(|| format!("cannot write pid file {}", path.display()))?;
    info!(pid, path = %path.display(), "pid file written");
    Ok(())
}

/// Best-effort removal on shutdown.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove pid file");
    }
}
