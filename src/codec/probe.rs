use std::fmt::Display;

use serde::{
  ser::{self, Impossible},
  Serialize, Serializer,
};
use thiserror::Error;

/// Reports whether `value` is the absent-value sentinel, a top-level `None`.
///
/// `Some(None)`, unit values and empty containers are all present.
pub fn is_absent<T>(value: &T) -> bool
where
  T: Serialize + ?Sized,
{
  value.serialize(AbsenceProbe).is_ok()
}

#[derive(Debug, Error)]
#[error("value is present")]
struct Present;

impl ser::Error for Present {
  fn custom<T: Display>(_msg: T) -> Self {
    Present
  }
}

/// Serializer that succeeds only on `serialize_none`.
struct AbsenceProbe;

macro_rules! present {
  ($($method:ident($ty:ty)),* $(,)?) => {
    $(
      fn $method(self, _v: $ty) -> Result<(), Present> {
        Err(Present)
      }
    )*
  };
}

impl Serializer for AbsenceProbe {
  type Ok = ();
  type Error = Present;
  type SerializeSeq = Impossible<(), Present>;
  type SerializeTuple = Impossible<(), Present>;
  type SerializeTupleStruct = Impossible<(), Present>;
  type SerializeTupleVariant = Impossible<(), Present>;
  type SerializeMap = Impossible<(), Present>;
  type SerializeStruct = Impossible<(), Present>;
  type SerializeStructVariant = Impossible<(), Present>;

  present! {
    serialize_bool(bool),
    serialize_i8(i8),
    serialize_i16(i16),
    serialize_i32(i32),
    serialize_i64(i64),
    serialize_u8(u8),
    serialize_u16(u16),
    serialize_u32(u32),
    serialize_u64(u64),
    serialize_f32(f32),
    serialize_f64(f64),
    serialize_char(char),
    serialize_str(&str),
    serialize_bytes(&[u8]),
  }

  fn serialize_none(self) -> Result<(), Present> {
    Ok(())
  }

  fn serialize_some<T>(self, _value: &T) -> Result<(), Present>
  where
    T: Serialize + ?Sized,
  {
    Err(Present)
  }

  fn serialize_unit(self) -> Result<(), Present> {
    Err(Present)
  }

  fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Present> {
    Err(Present)
  }

  fn serialize_unit_variant(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
  ) -> Result<(), Present> {
    Err(Present)
  }

  fn serialize_newtype_struct<T>(self, _name: &'static str, _value: &T) -> Result<(), Present>
  where
    T: Serialize + ?Sized,
  {
    Err(Present)
  }

  fn serialize_newtype_variant<T>(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _value: &T,
  ) -> Result<(), Present>
  where
    T: Serialize + ?Sized,
  {
    Err(Present)
  }

  fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Present> {
    Err(Present)
  }

  fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Present> {
    Err(Present)
  }

  fn serialize_tuple_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleStruct, Present> {
    Err(Present)
  }

  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleVariant, Present> {
    Err(Present)
  }

  fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Present> {
    Err(Present)
  }

  fn serialize_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStruct, Present> {
    Err(Present)
  }

  fn serialize_struct_variant(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStructVariant, Present> {
    Err(Present)
  }
}
