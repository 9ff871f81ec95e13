//! Value serialization boundary.
//!
//! Stored values are a one-byte format version followed by the `bincode`
//! encoding of the value. Integers are fixed width and trailing bytes are
//! rejected, so decoding into a destination of a different shape fails
//! instead of yielding a silently truncated value.

mod probe;

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::CodecError;

pub use probe::is_absent;

pub const FORMAT_VERSION: u8 = 1;

fn bincode_options() -> impl Options {
  bincode::DefaultOptions::new()
    .with_fixint_encoding()
    .reject_trailing_bytes()
}

pub fn encode<T>(value: &T) -> Result<Vec<u8>, CodecError>
where
  T: Serialize + ?Sized,
{
  let size = bincode_options()
    .serialized_size(value)
    .map_err(CodecError::Encode)?;

  let mut buf = Vec::with_capacity(1 + size as usize);
  buf.push(FORMAT_VERSION);
  bincode_options()
    .serialize_into(&mut buf, value)
    .map_err(CodecError::Encode)?;
  Ok(buf)
}

pub fn decode<T>(raw: &[u8]) -> Result<T, CodecError>
where
  T: DeserializeOwned,
{
  match raw.split_first() {
    None => Err(CodecError::Empty),
    Some((&FORMAT_VERSION, payload)) => bincode_options()
      .deserialize(payload)
      .map_err(CodecError::Decode),
    Some((&version, _)) => Err(CodecError::UnsupportedVersion(version)),
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use serde::Deserialize;

  use super::*;

  #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
  struct Account {
    id: u64,
    owner: String,
    tags: Vec<String>,
    limits: BTreeMap<String, i32>,
    parent: Option<Box<Account>>,
  }

  #[derive(Debug, PartialEq, Serialize, Deserialize)]
  struct Marker;

  #[test]
  fn test_codec_string() {
    let raw = encode("somevalue").unwrap();
    assert_eq!(raw[0], FORMAT_VERSION);
    let value: String = decode(&raw).unwrap();
    assert_eq!(value, "somevalue");
  }

  #[test]
  fn test_codec_nested_record() {
    let mut limits = BTreeMap::new();
    limits.insert("daily".to_string(), 500);
    limits.insert("overdraft".to_string(), -20);

    let account = Account {
      id: 7,
      owner: "ada".to_string(),
      tags: vec!["gold".to_string(), String::new()],
      limits,
      parent: Some(Box::new(Account {
        id: 1,
        ..Default::default()
      })),
    };

    let raw = encode(&account).unwrap();
    let back: Account = decode(&raw).unwrap();
    assert_eq!(back, account);
  }

  #[test]
  fn test_codec_zero_values_are_never_empty() {
    let raw = encode(&Account::default()).unwrap();
    assert!(raw.len() > 1);

    let raw = encode(&Marker).unwrap();
    assert_eq!(raw, vec![FORMAT_VERSION]);
    let back: Marker = decode(&raw).unwrap();
    assert_eq!(back, Marker);

    let raw = encode("").unwrap();
    let back: String = decode(&raw).unwrap();
    assert_eq!(back, "");
  }

  #[test]
  fn test_codec_floats_exact() {
    let values = vec![0.1f64, -0.0, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY];
    let raw = encode(&values).unwrap();
    let back: Vec<f64> = decode(&raw).unwrap();
    let bits: Vec<u64> = back.iter().map(|v| v.to_bits()).collect();
    let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits, expected);
  }

  #[test]
  fn test_codec_shape_mismatch() {
    let raw = encode("somevalue").unwrap();
    let res = decode::<u32>(&raw);
    assert!(matches!(res, Err(CodecError::Decode(_))));

    let raw = encode(&42u64).unwrap();
    let res = decode::<String>(&raw);
    assert!(matches!(res, Err(CodecError::Decode(_))));

    let raw = encode(&Account::default()).unwrap();
    let res = decode::<bool>(&raw);
    assert!(matches!(res, Err(CodecError::Decode(_))));
  }

  #[test]
  fn test_codec_malformed_bytes() {
    let res = decode::<String>(&[]);
    assert!(matches!(res, Err(CodecError::Empty)));

    let res = decode::<String>(&[9, 0, 0]);
    assert!(matches!(res, Err(CodecError::UnsupportedVersion(9))));

    let mut raw = encode("somevalue").unwrap();
    raw.truncate(5);
    let res = decode::<String>(&raw);
    assert!(matches!(res, Err(CodecError::Decode(_))));
  }
}
