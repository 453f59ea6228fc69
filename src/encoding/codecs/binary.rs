// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fixed-size binary layout through serde.
//!
//! Numbers are written at their natural width in the chosen byte order,
//! `bool` as one byte, `char` as a `u32`, enum variants as a `u32` index.
//! Structs, tuples and arrays are their fields back to back. Anything whose
//! size depends on the value (strings, sequences, maps, options) is refused.

use crate::encoding::Endian;
use crate::errors::EncodingError;
use serde::de::{self, DeserializeOwned, DeserializeSeed, IntoDeserializer, Visitor};
use serde::ser::{self, Impossible, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct BinaryError(String);

impl ser::Error for BinaryError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        BinaryError(msg.to_string())
    }
}

impl de::Error for BinaryError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        BinaryError(msg.to_string())
    }
}

fn variable_size(kind: &str) -> BinaryError {
    BinaryError(format!("{} has no fixed size", kind))
}

fn codec_name(endian: Endian) -> &'static str {
    match endian {
        Endian::Big => "BigEndian",
        Endian::Little => "LittleEndian",
    }
}

pub(crate) fn to_bytes<T: Serialize>(value: &T, endian: Endian) -> Result<Vec<u8>, EncodingError> {
    let mut serializer = Serializer {
        out: Vec::new(),
        endian,
    };
    value
        .serialize(&mut serializer)
        .map_err(|e| EncodingError::codec(codec_name(endian), e))?;
    Ok(serializer.out)
}

pub(crate) fn from_bytes<T: DeserializeOwned>(data: &[u8], endian: Endian) -> Result<T, EncodingError> {
    let mut deserializer = Deserializer {
        input: data,
        endian,
    };
    let value = T::deserialize(&mut deserializer)
        .map_err(|e| EncodingError::codec(codec_name(endian), e))?;
    if !deserializer.input.is_empty() {
        return Err(EncodingError::codec(
            codec_name(endian),
            format!("{} trailing bytes", deserializer.input.len()),
        ));
    }
    Ok(value)
}

struct Serializer {
    out: Vec<u8>,
    endian: Endian,
}

macro_rules! put {
    ($ser:expr, $value:expr) => {
        match $ser.endian {
            Endian::Big => $ser.out.extend_from_slice(&$value.to_be_bytes()),
            Endian::Little => $ser.out.extend_from_slice(&$value.to_le_bytes()),
        }
    };
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;
    type SerializeSeq = Impossible<(), BinaryError>;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Impossible<(), BinaryError>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<(), BinaryError> {
        self.out.push(u8::from(v));
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_i16(self, v: i16) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_i32(self, v: i32) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<(), BinaryError> {
        self.out.push(v);
        Ok(())
    }

    fn serialize_u16(self, v: u16) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_u32(self, v: u32) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_u64(self, v: u64) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), BinaryError> {
        put!(self, v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), BinaryError> {
        put!(self, v as u32);
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), BinaryError> {
        Err(variable_size("string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), BinaryError> {
        Err(variable_size("byte string"))
    }

    fn serialize_none(self) -> Result<(), BinaryError> {
        Err(variable_size("option"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<(), BinaryError> {
        Err(variable_size("option"))
    }

    fn serialize_unit(self) -> Result<(), BinaryError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), BinaryError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), BinaryError> {
        put!(self, variant_index);
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), BinaryError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), BinaryError> {
        put!(self, variant_index);
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, BinaryError> {
        Err(variable_size("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, BinaryError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, BinaryError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, BinaryError> {
        put!(self, variant_index);
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BinaryError> {
        Err(variable_size("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, BinaryError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, BinaryError> {
        put!(self, variant_index);
        Ok(self)
    }
}

impl<'a> ser::SerializeTuple for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BinaryError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), BinaryError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BinaryError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), BinaryError> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), BinaryError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), BinaryError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), BinaryError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), BinaryError> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut Serializer {
    type Ok = ();
    type Error = BinaryError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), BinaryError> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<(), BinaryError> {
        Ok(())
    }
}

struct Deserializer<'de> {
    input: &'de [u8],
    endian: Endian,
}

impl<'de> Deserializer<'de> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BinaryError> {
        if self.input.len() < N {
            return Err(BinaryError(format!(
                "unexpected end of input: need {} bytes, have {}",
                N,
                self.input.len()
            )));
        }
        let (head, rest) = self.input.split_at(N);
        self.input = rest;
        let mut buf = [0u8; N];
        buf.copy_from_slice(head);
        Ok(buf)
    }
}

macro_rules! get {
    ($de:expr, $ty:ty) => {{
        let bytes = $de.take::<{ std::mem::size_of::<$ty>() }>()?;
        match $de.endian {
            Endian::Big => <$ty>::from_be_bytes(bytes),
            Endian::Little => <$ty>::from_le_bytes(bytes),
        }
    }};
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {
    type Error = BinaryError;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(BinaryError("fixed-size binary is not self-describing".into()))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        let [byte] = self.take::<1>()?;
        match byte {
            0 => visitor.visit_bool(false),
            1 => visitor.visit_bool(true),
            other => Err(BinaryError(format!("invalid bool byte {}", other))),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_i8(get!(self, i8))
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_i16(get!(self, i16))
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_i32(get!(self, i32))
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_i64(get!(self, i64))
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        let [byte] = self.take::<1>()?;
        visitor.visit_u8(byte)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_u16(get!(self, u16))
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_u32(get!(self, u32))
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_u64(get!(self, u64))
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_f32(get!(self, f32))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_f64(get!(self, f64))
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        let code = get!(self, u32);
        let c = char::from_u32(code)
            .ok_or_else(|| BinaryError(format!("invalid char code {:#x}", code)))?;
        visitor.visit_char(c)
    }

    fn deserialize_str<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("string"))
    }

    fn deserialize_string<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("string"))
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("byte string"))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("byte string"))
    }

    fn deserialize_option<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("option"))
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("sequence"))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_seq(Fixed {
            de: self,
            remaining: len,
        })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_seq(Fixed {
            de: self,
            remaining: len,
        })
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(variable_size("map"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_seq(Fixed {
            de: self,
            remaining: fields.len(),
        })
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_enum(Variant { de: self })
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(BinaryError("identifiers are not encoded".into()))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BinaryError> {
        Err(BinaryError("cannot skip values in fixed-size binary".into()))
    }
}

struct Fixed<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'a, 'de> de::SeqAccess<'de> for Fixed<'a, 'de> {
    type Error = BinaryError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, BinaryError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct Variant<'a, 'de> {
    de: &'a mut Deserializer<'de>,
}

impl<'a, 'de> de::EnumAccess<'de> for Variant<'a, 'de> {
    type Error = BinaryError;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self), BinaryError> {
        let index = get!(self.de, u32);
        let deserializer: de::value::U32Deserializer<BinaryError> = index.into_deserializer();
        let value = seed.deserialize(deserializer)?;
        Ok((value, self))
    }
}

impl<'a, 'de> de::VariantAccess<'de> for Variant<'a, 'de> {
    type Error = BinaryError;

    fn unit_variant(self) -> Result<(), BinaryError> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, BinaryError> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, BinaryError> {
        visitor.visit_seq(Fixed {
            de: self.de,
            remaining: len,
        })
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BinaryError> {
        visitor.visit_seq(Fixed {
            de: self.de,
            remaining: fields.len(),
        })
    }
}
