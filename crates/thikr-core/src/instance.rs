//! Machine-wide single-instance lock.
//!
//! A lock file in the OS temp directory holds the owning process id as
//! text. Acquisition is an exclusive create; when the file already exists
//! the stored PID is probed for liveness. A live holder means another
//! instance genuinely runs and acquisition fails. A dead or unreadable
//! holder is a stale lock from a crash: it is removed and acquisition is
//! retried exactly once. A stale lock is never deleted blindly, only after
//! the probe.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{info, warn};

use crate::error::LockError;

/// Lock file name under [`std::env::temp_dir`].
pub const LOCK_FILE_NAME: &str = "thikr.pid";

/// Held instance lock. Released on [`release`](InstanceLock::release) or
/// drop; a process killed outright leaves the file for the next launch's
/// staleness probe.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    held: bool,
}

impl InstanceLock {
    /// Acquire the machine-wide lock at the well-known path.
    pub fn acquire() -> Result<Self, LockError> {
        Self::acquire_at(std::env::temp_dir().join(LOCK_FILE_NAME))
    }

    /// Acquire a lock at an explicit path (tests).
    pub fn acquire_at(path: PathBuf) -> Result<Self, LockError> {
        match try_create(&path) {
            Ok(()) => Ok(Self { path, held: true }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                match read_holder(&path) {
                    Some(pid) if process_alive(pid) => Err(LockError::AlreadyRunning { pid }),
                    holder => {
                        match holder {
                            Some(pid) => {
                                warn!(pid, "reclaiming stale instance lock from dead process")
                            }
                            None => warn!("reclaiming unreadable instance lock"),
                        }
                        fs::remove_file(&path)?;
                        // Exactly one retry; losing the race to another
                        // launching instance is a genuine failure.
                        match try_create(&path) {
                            Ok(()) => Ok(Self { path, held: true }),
                            Err(e) => Err(LockError::AcquireFailed {
                                path,
                                message: e.to_string(),
                            }),
                        }
                    }
                }
            }
            Err(e) => Err(LockError::AcquireFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release on normal shutdown.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.held {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(error = %e, "failed to remove instance lock file");
            } else {
                info!("instance lock released");
            }
            self.held = false;
        }
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Exclusive create (O_CREAT | O_EXCL): fails with `AlreadyExists` when a
/// lock file is present, closing the check-then-write race.
fn try_create(path: &Path) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    write!(file, "{}", std::process::id())
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn process_alive(pid: u32) -> bool {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
    system.process(target).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(LOCK_FILE_NAME)
    }

    #[test]
    fn second_acquisition_fails_while_holder_lives() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::acquire_at(lock_path(&dir)).unwrap();

        // The file names this very process, which is definitely alive.
        let err = InstanceLock::acquire_at(lock_path(&dir)).unwrap_err();
        match err {
            LockError::AlreadyRunning { pid } => assert_eq!(pid, std::process::id()),
            other => panic!("expected AlreadyRunning, got {other}"),
        }

        lock.release();
    }

    #[test]
    fn stale_lock_from_dead_process_is_reclaimed() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);

        // A child that has already exited gives us a PID known to be dead.
        let mut child = std::process::Command::new("true")
            .spawn()
            .expect("spawn child");
        let dead_pid = child.id();
        child.wait().expect("child exits");
        fs::write(&path, dead_pid.to_string()).unwrap();

        let lock = InstanceLock::acquire_at(path.clone()).unwrap();
        let holder = read_holder(&path).unwrap();
        assert_eq!(holder, std::process::id());
        lock.release();
    }

    #[test]
    fn garbage_lock_content_is_treated_as_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        fs::write(&path, "not a pid").unwrap();

        let lock = InstanceLock::acquire_at(path).unwrap();
        lock.release();
    }

    #[test]
    fn release_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        let lock = InstanceLock::acquire_at(path.clone()).unwrap();
        assert!(path.exists());
        lock.release();
        assert!(!path.exists());
    }

    #[test]
    fn drop_releases_too() {
        let dir = tempfile::tempdir().unwrap();
        let path = lock_path(&dir);
        {
            let _lock = InstanceLock::acquire_at(path.clone()).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
