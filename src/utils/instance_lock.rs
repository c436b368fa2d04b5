//! Process-wide guard against two services running on the same storage.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::errors::{LedgerError, Result};

/// Advisory lock file holding the owner's PID. Removed when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        match try_create(&path) {
            Ok(lock) => Ok(lock),
            Err(LedgerError::Io(err)) if err.kind() == ErrorKind::AlreadyExists => {
                match read_owner(&path) {
                    Some(pid) if process_alive(pid) => Err(LedgerError::InstanceLocked { pid }),
                    owner => {
                        warn!(path = %path.display(), ?owner, "removing stale instance lock");
                        fs::remove_file(&path)?;
                        try_create(&path)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "failed to release instance lock");
        }
    }
}

fn try_create(path: &Path) -> Result<InstanceLock> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    write!(file, "{}", std::process::id())?;
    file.flush()?;
    info!(path = %path.display(), pid = std::process::id(), "instance lock acquired");
    Ok(InstanceLock {
        path: path.to_path_buf(),
    })
}

fn read_owner(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

// Without a cheap liveness probe, any recorded owner is assumed to be running.
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}
