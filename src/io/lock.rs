use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a writer waits for another writer before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on `<tasks file>.lock`.
///
/// Held for the duration of one document rewrite. Two boards open on the
/// same file take turns instead of interleaving writes. Released on drop.
pub struct FileLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is held by another writer (waited {waited:?})")]
    Busy { path: PathBuf, waited: Duration },
}

impl FileLock {
    /// Lock the document at `target`, retrying until `timeout` elapses.
    pub fn acquire(target: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = lock_path_for(target);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(lock = %path.display(), "lock wait timed out");
                return Err(LockError::Busy {
                    path,
                    waited: timeout,
                });
            }
            std::thread::sleep(RETRY_INTERVAL.min(deadline - now));
        }
        Ok(FileLock { _file: file })
    }

    pub fn acquire_default(target: &Path) -> Result<Self, LockError> {
        Self::acquire(target, DEFAULT_LOCK_TIMEOUT)
    }
}

/// `tasks.json` -> `tasks.json.lock`
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}

/// Non-blocking exclusive flock
#[cfg(unix)]
fn try_lock(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor belongs to `file`, which outlives the call
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> std::io::Result<()> {
    Ok(())
}
