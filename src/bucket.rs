use jammdb::{Bucket, Data, DB};

use crate::errors::Result;

/// The single namespace holding every entry of a store.
pub const BUCKET_NAME: &str = "kv";

/// Creates the store's bucket if this is a fresh file.
pub(crate) fn ensure_bucket(db: &DB) -> Result<()> {
  let tx = db.tx(true)?;
  tx.get_or_create_bucket(BUCKET_NAME)?;
  tx.commit()?;
  Ok(())
}

/// Positions a cursor at the first key >= `key` and returns that entry's
/// value only if the key found is exactly `key`.
pub(crate) fn seek_exact(bucket: &Bucket<'_, '_>, key: &[u8]) -> Option<Vec<u8>> {
  let mut cursor = bucket.cursor();
  cursor.seek(key.to_vec());
  match cursor.next() {
    Some(Data::KeyValue(kv)) if kv.key() == key => Some(kv.value().to_vec()),
    _ => None,
  }
}
