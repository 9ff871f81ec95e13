use std::{
  ffi::OsString,
  fs::File,
  io,
  path::{Path, PathBuf},
  thread,
  time::{Duration, Instant},
};

use fs2::FileExt;
use log::warn;

use crate::errors::{EngineError, Result};

use super::open_with_mode;

pub const FILE_LOCK_SUFFIX: &str = ".lock";

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Path of the advisory lock file guarding the data file at `path`.
pub fn lock_path<P>(path: P) -> PathBuf
where
  P: AsRef<Path>,
{
  let mut name = OsString::from(path.as_ref().as_os_str());
  name.push(FILE_LOCK_SUFFIX);
  PathBuf::from(name)
}

/// Exclusive lock on a store's lock file, released on drop.
#[derive(Debug)]
pub struct FileLock {
  file: File,
  path: PathBuf,
}

impl FileLock {
  /// Acquires the lock for the data file at `path`, polling until `timeout` elapses.
  pub fn acquire<P>(path: P, mode: u32, timeout: Duration) -> Result<Self>
  where
    P: AsRef<Path>,
  {
    let lock_path = lock_path(&path);
    let file = open_with_mode(&lock_path, mode).map_err(EngineError::Io)?;

    let deadline = Instant::now() + timeout;
    loop {
      match FileExt::try_lock_exclusive(&file) {
        Ok(()) => {
          return Ok(FileLock {
            file,
            path: lock_path,
          })
        }
        Err(e) if is_contended(&e) => {}
        Err(e) => return Err(EngineError::Io(e).into()),
      }

      let now = Instant::now();
      if now >= deadline {
        warn!("lock on {} still held after {:?}", lock_path.display(), timeout);
        return Err(
          EngineError::LockTimeout {
            path: path.as_ref().to_path_buf(),
            timeout,
          }
          .into(),
        );
      }
      thread::sleep(LOCK_RETRY_INTERVAL.min(deadline - now));
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn release(self) -> Result<()> {
    FileExt::unlock(&self.file).map_err(EngineError::Io)?;
    Ok(())
  }
}

fn is_contended(e: &io::Error) -> bool {
  e.kind() == io::ErrorKind::WouldBlock
    || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;
  use crate::errors::Errors;

  #[test]
  fn test_lock_path() {
    assert_eq!(lock_path("spkv.db"), PathBuf::from("spkv.db.lock"));
    assert_eq!(
      lock_path("/tmp/data/store.db"),
      PathBuf::from("/tmp/data/store.db.lock")
    );
  }

  #[test]
  fn test_acquire_and_release() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.db");

    let lock = FileLock::acquire(&path, 0o640, Duration::from_millis(50)).unwrap();
    assert!(lock.path().is_file());
    lock.release().unwrap();

    let again = FileLock::acquire(&path, 0o640, Duration::from_millis(50));
    assert!(again.is_ok());
  }

  #[test]
  fn test_acquire_times_out_while_held() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.db");

    let held = FileLock::acquire(&path, 0o640, Duration::from_millis(50)).unwrap();

    let start = Instant::now();
    let res = FileLock::acquire(&path, 0o640, Duration::from_millis(30));
    assert!(start.elapsed() >= Duration::from_millis(30));
    match res {
      Err(Errors::Engine(EngineError::LockTimeout { path: p, timeout })) => {
        assert_eq!(p, path);
        assert_eq!(timeout, Duration::from_millis(30));
      }
      other => panic!("expected lock timeout, got {:?}", other),
    }

    drop(held);
    assert!(FileLock::acquire(&path, 0o640, Duration::from_millis(50)).is_ok());
  }
}
