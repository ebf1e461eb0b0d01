//! Local instrument simulator management.
//!
//! The simulator is an ordinary process that opens a pseudo-terminal and
//! publishes the slave path in a marker file in its working directory. We
//! either spawn it ourselves or attach to one started by hand.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// File the simulator writes its pty path into.
pub const PTY_NAME_FILE: &str = "ptyname.txt";

const STARTUP_WAIT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(10);

/// Handle on a simulator endpoint.
///
/// When the process was spawned by [`launch`], dropping the handle kills
/// and reaps it; an [`attach`]ed simulator is left running.
pub struct Simulator {
    child: Option<Child>,
    pty: String,
}

impl Simulator {
    /// Pseudo-terminal path the simulator answers on.
    pub fn pty_path(&self) -> &str {
        &self.pty
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            debug!("stopping simulator process");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Spawn a simulator binary and wait for it to publish its pty path.
pub fn launch(binary: &Path) -> Result<Simulator> {
    let dir = binary.parent().filter(|p| !p.as_os_str().is_empty());
    let dir: PathBuf = dir.map(Path::to_path_buf).unwrap_or_else(|| ".".into());
    let marker = dir.join(PTY_NAME_FILE);

    // A marker left over from a previous run would be read as live.
    let _ = fs::remove_file(&marker);

    info!(binary = %binary.display(), "launching simulator");
    let child = Command::new(binary)
        .current_dir(&dir)
        .spawn()
        .map_err(|e| Error::Transport(format!("spawn {}: {e}", binary.display())))?;

    let pty = wait_for_marker(&marker)?;
    debug!(%pty, "simulator ready");
    Ok(Simulator {
        child: Some(child),
        pty,
    })
}

/// Attach to a simulator somebody else started, via the marker file in
/// `dir`.
pub fn attach(dir: &Path) -> Result<Simulator> {
    let pty = read_marker(&dir.join(PTY_NAME_FILE))?;
    Ok(Simulator { child: None, pty })
}

fn wait_for_marker(marker: &Path) -> Result<String> {
    let deadline = Instant::now() + STARTUP_WAIT;
    while Instant::now() < deadline {
        if marker.exists() {
            return read_marker(marker);
        }
        thread::sleep(POLL);
    }
    Err(Error::Transport(format!(
        "simulator did not publish {} within {:?}",
        marker.display(),
        STARTUP_WAIT
    )))
}

fn read_marker(marker: &Path) -> Result<String> {
    let pty = fs::read_to_string(marker)
        .map_err(|e| Error::Transport(format!("read {}: {e}", marker.display())))?;
    let pty = pty.trim();
    if pty.is_empty() {
        return Err(Error::Transport(format!("{} is empty", marker.display())));
    }
    Ok(pty.to_owned())
}
