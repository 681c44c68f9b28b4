//! Versioned byte streams.
//!
//! Lengths, counts and enum ordinals are variable-length unsigned ints
//! (7 bits per byte, low group first). Doubles are their big-endian IEEE-754
//! bit pattern. Every stream carries the protocol version of the peer it
//! is written for or read from.

use crate::errors::{Result, ResultsError};
use crate::value::ClassValue;
use crate::version::WireVersion;

const MAX_VINT_BYTES: usize = 5;

const GENERIC_STRING: u8 = 0;
const GENERIC_DOUBLE: u8 = 4;
const GENERIC_BOOLEAN: u8 = 5;

/// Output stream for a single peer version.
#[derive(Debug, Clone)]
pub struct StreamOutput {
    buf: Vec<u8>,
    version: WireVersion,
}

impl StreamOutput {
    pub fn new(version: WireVersion) -> Self {
        Self {
            buf: Vec::new(),
            version,
        }
    }

    pub fn version(&self) -> WireVersion {
        self.version
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_byte(u8::from(value));
    }

    pub fn write_vint(&mut self, mut value: u32) {
        while value & !0x7F != 0 {
            self.buf.push(((value & 0x7F) | 0x80) as u8);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    pub fn write_double(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    pub fn write_optional_string(&mut self, value: Option<&str>) -> Result<()> {
        match value {
            Some(s) => {
                self.write_bool(true);
                self.write_string(s)
            }
            None => {
                self.write_bool(false);
                Ok(())
            }
        }
    }

    pub fn write_enum(&mut self, ordinal: u32) {
        self.write_vint(ordinal);
    }

    /// Write a tagged class value that keeps its type.
    pub fn write_generic_value(&mut self, value: &ClassValue) -> Result<()> {
        match value {
            ClassValue::String(s) => {
                self.write_byte(GENERIC_STRING);
                self.write_string(s)
            }
            ClassValue::Number(n) => {
                self.write_byte(GENERIC_DOUBLE);
                self.write_double(*n);
                Ok(())
            }
            ClassValue::Boolean(b) => {
                self.write_byte(GENERIC_BOOLEAN);
                self.write_bool(*b);
                Ok(())
            }
        }
    }

    /// Write a count-prefixed sequence.
    pub fn write_collection<T, F>(&mut self, items: &[T], mut write: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        self.write_len(items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            ResultsError::InvalidArgument(format!("length [{}] does not fit the wire format", len))
        })?;
        self.write_vint(len);
        Ok(())
    }
}

/// Input stream over a borrowed buffer.
#[derive(Debug)]
pub struct StreamInput<'a> {
    buf: &'a [u8],
    pos: usize,
    version: WireVersion,
}

impl<'a> StreamInput<'a> {
    pub fn new(buf: &'a [u8], version: WireVersion) -> Self {
        Self {
            buf,
            pos: 0,
            version,
        }
    }

    pub fn version(&self) -> WireVersion {
        self.version
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ResultsError::MalformedStream(format!(
                "needed {} bytes at offset {} but only {} remain",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ResultsError::MalformedStream(format!(
                "unexpected byte [{}] for a boolean",
                other
            ))),
        }
    }

    pub fn read_vint(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        for i in 0..MAX_VINT_BYTES {
            let byte = self.read_byte()?;
            let group = u32::from(byte & 0x7F);
            if i == MAX_VINT_BYTES - 1 && (byte & 0xF0) != 0 {
                return Err(ResultsError::MalformedStream(
                    "variable-length int is too long".to_string(),
                ));
            }
            value |= group << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ResultsError::MalformedStream(
            "variable-length int is too long".to_string(),
        ))
    }

    pub fn read_double(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_bits(u64::from_be_bytes(raw)))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_vint()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ResultsError::MalformedStream(format!("string is not UTF-8: {}", e)))
    }

    pub fn read_optional_string(&mut self) -> Result<Option<String>> {
        if self.read_bool()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_enum(&mut self) -> Result<u32> {
        self.read_vint()
    }

    pub fn read_generic_value(&mut self) -> Result<ClassValue> {
        match self.read_byte()? {
            GENERIC_STRING => self.read_string().map(ClassValue::String),
            GENERIC_DOUBLE => self.read_double().map(ClassValue::Number),
            GENERIC_BOOLEAN => self.read_bool().map(ClassValue::Boolean),
            tag => Err(ResultsError::MalformedStream(format!(
                "unknown generic value tag [{}]",
                tag
            ))),
        }
    }

    /// Read a count-prefixed sequence.
    ///
    /// Every element takes at least one byte, so a count larger than the
    /// remaining bytes is rejected before anything is allocated.
    pub fn read_list<T, F>(&mut self, mut read: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let count = self.read_vint()? as usize;
        if count > self.remaining() {
            return Err(ResultsError::MalformedStream(format!(
                "sequence declares {} entries but only {} bytes remain",
                count,
                self.remaining()
            )));
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(bytes: &[u8]) -> StreamInput<'_> {
        StreamInput::new(bytes, WireVersion::CURRENT)
    }

    #[test]
    fn vint_encoding_is_compact() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_vint(0);
        out.write_vint(127);
        out.write_vint(128);
        out.write_vint(u32::MAX);
        assert_eq!(
            out.clone().into_bytes(),
            vec![0x00, 0x7F, 0x80, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );

        let bytes = out.into_bytes();
        let mut inp = input(&bytes);
        assert_eq!(inp.read_vint().unwrap(), 0);
        assert_eq!(inp.read_vint().unwrap(), 127);
        assert_eq!(inp.read_vint().unwrap(), 128);
        assert_eq!(inp.read_vint().unwrap(), u32::MAX);
        assert_eq!(inp.remaining(), 0);
    }

    #[test]
    fn overlong_vint_is_malformed() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert!(matches!(
            input(&bytes).read_vint(),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn doubles_are_bit_exact() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_double(-0.0);
        out.write_double(f64::NAN);
        let bytes = out.into_bytes();
        assert_eq!(&bytes[..8], &[0x80, 0, 0, 0, 0, 0, 0, 0]);

        let mut inp = input(&bytes);
        assert_eq!(inp.read_double().unwrap().to_bits(), (-0.0f64).to_bits());
        assert!(inp.read_double().unwrap().is_nan());
    }

    #[test]
    fn truncated_string_is_malformed() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_string("hello").unwrap();
        let bytes = out.into_bytes();
        assert!(matches!(
            input(&bytes[..3]).read_string(),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let bytes = [0x02, 0xC3, 0x28];
        assert!(matches!(
            input(&bytes).read_string(),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn booleans_must_be_zero_or_one() {
        assert!(input(&[1]).read_bool().unwrap());
        assert!(matches!(
            input(&[2]).read_bool(),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn generic_values_keep_their_type() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_generic_value(&ClassValue::from("a")).unwrap();
        out.write_generic_value(&ClassValue::from(2.5)).unwrap();
        out.write_generic_value(&ClassValue::from(false)).unwrap();
        let bytes = out.into_bytes();

        let mut inp = input(&bytes);
        assert_eq!(inp.read_generic_value().unwrap(), ClassValue::from("a"));
        assert_eq!(inp.read_generic_value().unwrap(), ClassValue::from(2.5));
        assert_eq!(inp.read_generic_value().unwrap(), ClassValue::from(false));
    }

    #[test]
    fn unknown_generic_tag_is_malformed() {
        assert!(matches!(
            input(&[9, 0]).read_generic_value(),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn oversized_count_is_rejected_before_reading() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_vint(1_000_000);
        out.write_double(1.0);
        let bytes = out.into_bytes();

        let result = input(&bytes).read_list(|inp| inp.read_double());
        assert!(matches!(result, Err(ResultsError::MalformedStream(_))));
    }

    #[test]
    fn collections_round_trip_in_order() {
        let mut out = StreamOutput::new(WireVersion::CURRENT);
        out.write_collection(&["x", "y", "z"], |out, s| out.write_string(s))
            .unwrap();
        let bytes = out.into_bytes();
        let items = input(&bytes).read_list(|inp| inp.read_string()).unwrap();
        assert_eq!(items, vec!["x", "y", "z"]);
    }
}
