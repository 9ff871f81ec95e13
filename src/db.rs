use std::{
  fs, io,
  panic::{self, AssertUnwindSafe},
  path::Path,
};

use jammdb::DB;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
  bucket::{self, BUCKET_NAME},
  codec,
  diag::Diagnostics,
  errors::{EngineError, Errors, Result},
  fio::{self, flock::FileLock},
  option::Options,
};

/// An open handle to a single-file store and its `kv` bucket.
///
/// Every operation runs as its own transaction. Writes are serialized by the
/// engine, readers see a consistent snapshot, and the handle can be shared
/// between threads (e.g. behind an `Arc`).
pub struct Store {
  db: DB,
  lock: FileLock,
  options: Options,
  diag: Diagnostics,
}

impl Store {
  /// Opens the store at `options.path`, creating the file and its bucket if absent.
  ///
  /// Waits at most `options.timeout` for exclusive access to the file.
  pub fn open(options: Options) -> Result<Self> {
    let diag = Diagnostics::new(options.debug, options.sink.clone());
    let options = options.resolve(&diag);

    let path = options.path.clone();
    match Self::open_resolved(options, diag.clone()) {
      Ok(store) => {
        diag.emit(format_args!(
          "open {}: ok (lock {})",
          path.display(),
          store.lock.path().display()
        ));
        Ok(store)
      }
      Err(e) => {
        diag.emit(format_args!("open {}: error: {}", path.display(), e));
        Err(e)
      }
    }
  }

  fn open_resolved(options: Options, diag: Diagnostics) -> Result<Self> {
    let lock = FileLock::acquire(&options.path, options.file_mode, options.timeout)?;

    let fresh = match fs::metadata(&options.path) {
      Ok(meta) if meta.len() == 0 => {
        // a zero-length file holds no store yet; jammdb only initializes missing files
        fs::remove_file(&options.path).map_err(EngineError::Io)?;
        true
      }
      Ok(_) => false,
      Err(e) if e.kind() == io::ErrorKind::NotFound => true,
      Err(e) => return Err(EngineError::Io(e).into()),
    };

    let db = open_engine(&options.path)?;
    if fresh {
      fio::set_mode(&options.path, options.file_mode)?;
    }

    Ok(Store {
      db,
      lock,
      options,
      diag,
    })
  }

  /// Stores `value` under `key`, replacing any previous entry.
  ///
  /// A top-level `None` is rejected with [`Errors::BadValue`] before any I/O.
  pub fn put<T>(&self, key: &str, value: &T) -> Result<()>
  where
    T: Serialize + ?Sized,
  {
    match self.write_entry(key, value) {
      Ok(preview) => {
        self.diag.emit(format_args!(
          "put {key}: ok ({} bytes: {}{})",
          preview.size,
          hex::encode(&preview.head),
          if preview.size > preview.head.len() { ".." } else { "" }
        ));
        Ok(())
      }
      Err(e) => {
        self.diag.emit(format_args!("put {key}: error: {e}"));
        Err(e)
      }
    }
  }

  fn write_entry<T>(&self, key: &str, value: &T) -> Result<ValuePreview>
  where
    T: Serialize + ?Sized,
  {
    if key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    if codec::is_absent(value) {
      return Err(Errors::BadValue);
    }
    let encoded = codec::encode(value)?;
    let preview = ValuePreview::new(&encoded, self.diag.is_enabled());

    let tx = self.db.tx(true)?;
    let bucket = tx.get_bucket(BUCKET_NAME)?;
    bucket.put(key.as_bytes().to_vec(), encoded)?;
    tx.commit()?;
    Ok(preview)
  }

  /// Returns the value stored under `key`.
  pub fn get<T>(&self, key: &str) -> Result<T>
  where
    T: DeserializeOwned,
  {
    self.read_entry("get", key, |raw| Ok(codec::decode(raw)?))
  }

  /// Decodes the value stored under `key` into `out`.
  ///
  /// With no destination the call only checks that the key exists.
  pub fn get_into<T>(&self, key: &str, out: Option<&mut T>) -> Result<()>
  where
    T: DeserializeOwned,
  {
    self.read_entry("get", key, |raw| {
      if let Some(out) = out {
        *out = codec::decode(raw)?;
      }
      Ok(())
    })
  }

  pub fn exists(&self, key: &str) -> Result<bool> {
    match self.read_entry("exists", key, |_| Ok(())) {
      Ok(()) => Ok(true),
      Err(Errors::KeyNotFound) => Ok(false),
      Err(e) => Err(e),
    }
  }

  fn read_entry<R, F>(&self, op: &str, key: &str, f: F) -> Result<R>
  where
    F: FnOnce(&[u8]) -> Result<R>,
  {
    let res = self.lookup(key).and_then(|raw| f(&raw));
    match &res {
      Ok(_) => self.diag.emit(format_args!("{op} {key}: found")),
      Err(Errors::KeyNotFound) => self.diag.emit(format_args!("{op} {key}: not found")),
      Err(e) => self.diag.emit(format_args!("{op} {key}: error: {e}")),
    }
    res
  }

  fn lookup(&self, key: &str) -> Result<Vec<u8>> {
    let tx = self.db.tx(false)?;
    let bucket = tx.get_bucket(BUCKET_NAME)?;
    let value = bucket::seek_exact(&bucket, key.as_bytes());
    value.ok_or(Errors::KeyNotFound)
  }

  /// Removes the entry stored under `key`.
  pub fn delete(&self, key: &str) -> Result<()> {
    let res = self.remove_entry(key);
    match &res {
      Ok(()) => self.diag.emit(format_args!("delete {key}: ok")),
      Err(Errors::KeyNotFound) => self.diag.emit(format_args!("delete {key}: not found")),
      Err(e) => self.diag.emit(format_args!("delete {key}: error: {e}")),
    }
    res
  }

  fn remove_entry(&self, key: &str) -> Result<()> {
    let tx = self.db.tx(true)?;
    let bucket = tx.get_bucket(BUCKET_NAME)?;
    // an uncommitted tx rolls back on drop
    if bucket::seek_exact(&bucket, key.as_bytes()).is_none() {
      return Err(Errors::KeyNotFound);
    }
    bucket.delete(key.as_bytes().to_vec())?;
    tx.commit()?;
    Ok(())
  }

  /// Releases the engine handle and the file lock.
  pub fn close(self) -> Result<()> {
    let Store {
      db,
      lock,
      options,
      diag,
    } = self;
    drop(db);

    let res = lock.release();
    match &res {
      Ok(()) => diag.emit(format_args!("close {}: ok", options.path.display())),
      Err(e) => diag.emit(format_args!("close {}: error: {}", options.path.display(), e)),
    }
    res
  }

  pub fn path(&self) -> &Path {
    &self.options.path
  }

  /// The options this store was opened with, defaults resolved.
  pub fn options(&self) -> &Options {
    &self.options
  }
}

/// Leading encoded bytes of a written value, kept only for diagnostics.
struct ValuePreview {
  size: usize,
  head: Vec<u8>,
}

const PREVIEW_BYTES: usize = 32;

impl ValuePreview {
  fn new(encoded: &[u8], enabled: bool) -> Self {
    let head = if enabled {
      encoded[..encoded.len().min(PREVIEW_BYTES)].to_vec()
    } else {
      Vec::new()
    };
    ValuePreview {
      size: encoded.len(),
      head,
    }
  }
}

/// Opens the engine file and its bucket. jammdb asserts on files it cannot
/// parse, so those panics are reported as an invalid store file.
fn open_engine(path: &Path) -> Result<DB> {
  let opened = panic::catch_unwind(AssertUnwindSafe(|| -> Result<DB> {
    let db = DB::open(path)?;
    bucket::ensure_bucket(&db)?;
    Ok(db)
  }));

  match opened {
    Ok(res) => res,
    Err(payload) => {
      let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unrecognized file layout".to_string());
      Err(
        EngineError::InvalidFile {
          path: path.to_path_buf(),
          reason,
        }
        .into(),
      )
    }
  }
}
