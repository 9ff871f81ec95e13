//! spkv: a minimal embedded key-value store.
//!
//! spkv keeps typed values under string keys in a single on-disk file
//! managed by an embedded transactional engine. Every operation is its own
//! transaction: writes commit atomically, reads see a consistent snapshot.
//!
//! # Features
//!
//! * Any `serde` value can be stored and read back exactly
//! * Exact-match point lookups, no range scans
//! * Bounded wait for exclusive access to the store file
//! * Opt-in per-store diagnostics through an injected sink
//!
//! # Basic Usage
//!
//! ```
//! use spkv::{db::Store, option::Options};
//!
//! # fn main() -> spkv::errors::Result<()> {
//! let dir = tempfile::tempdir().expect("failed to create temp dir");
//! let opts = Options {
//!   path: dir.path().join("demo.db"),
//!   ..Options::default()
//! };
//! let store = Store::open(opts)?;
//!
//! store.put("key1", "somevalue")?;
//! let value: String = store.get("key1")?;
//! assert_eq!(value, "somevalue");
//!
//! store.delete("key1")?;
//! assert!(store.get::<String>("key1").unwrap_err().is_not_found());
//!
//! store.close()?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod fio;

pub mod codec;
pub mod db;
pub mod diag;
pub mod errors;
pub mod option;

pub use bucket::BUCKET_NAME;
