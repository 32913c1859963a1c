//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Absolute offset of `data[0]` within the outermost buffer.
    base: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Absolute offset of the next byte, for error reporting.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn error(&self, kind: DecodeErrorKind) -> Error {
        tracing::debug!(target: "netsnmp::ber", { snmp.offset = %self.offset(), kind = %kind }, "decode failed");
        Error::decode(self.offset(), kind)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(byte) = self.peek_tag() else {
            return Err(self.error(DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.error(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            }));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            self.offset -= 1;
            return Err(self.error(DecodeErrorKind::UnexpectedTag {
                expected,
                actual: tag,
            }));
        }
        self.read_length()
    }

    /// Read a BER INTEGER.
    pub fn read_integer(&mut self) -> Result<i64> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read an INTEGER that must fit in 32 bits (version, request id, status fields).
    pub fn read_i32(&mut self) -> Result<i32> {
        let at = self.offset();
        let value = self.read_integer()?;
        i32::try_from(value).map_err(|_| Error::decode(at, DecodeErrorKind::IntegerOverflow))
    }

    /// Read signed integer content of the given length.
    ///
    /// Non-minimal encodings are accepted. More than 8 content octets is an error.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i64> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 8 {
            return Err(self.error(DecodeErrorKind::IntegerOverflow));
        }

        let bytes = self.read_bytes(len)?;
        let init: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        Ok(bytes
            .iter()
            .fold(init, |acc, &b| (acc << 8) | i64::from(b)))
    }

    /// Read unsigned 32-bit content of the given length.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        let value = self.read_unsigned_value(len, 5)?;
        u32::try_from(value).map_err(|_| self.error(DecodeErrorKind::IntegerOverflow))
    }

    /// Read unsigned 64-bit content of the given length (Counter64).
    pub fn read_integer64_value(&mut self, len: usize) -> Result<u64> {
        if len > 9 {
            return Err(self.error(DecodeErrorKind::Integer64TooLong { length: len }));
        }
        self.read_unsigned_value(len, 9)
    }

    fn read_unsigned_value(&mut self, len: usize, max: usize) -> Result<u64> {
        if len == 0 {
            return Err(self.error(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > max {
            return Err(self.error(DecodeErrorKind::IntegerOverflow));
        }
        let bytes = self.read_bytes(len)?;
        if len == 9 && bytes[0] != 0 {
            return Err(self.error(DecodeErrorKind::IntegerOverflow));
        }
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(self.error(DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read OID content of the given length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let at = self.offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { offset, kind } => Error::decode(at + offset, kind),
            other => other,
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Create a sub-decoder for the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
        })
    }

    /// Fail if any bytes are left unread.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.error(DecodeErrorKind::TrailingData {
                remaining: self.remaining(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        let mut d = Decoder::from_slice(&[0x02, 0x01, 0x2A]);
        assert_eq!(d.read_integer().unwrap(), 42);
        assert!(d.is_empty());

        let mut d = Decoder::from_slice(&[0x02, 0x02, 0xFF, 0x7F]);
        assert_eq!(d.read_integer().unwrap(), -129);
    }

    #[test]
    fn test_accept_non_minimal_integer() {
        let mut d = Decoder::from_slice(&[0x02, 0x03, 0x00, 0x00, 0x01]);
        assert_eq!(d.read_integer().unwrap(), 1);
    }

    #[test]
    fn test_integer_too_long_rejected() {
        let mut d = Decoder::from_slice(&[0x02, 0x09, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        let err = d.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::IntegerOverflow,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_length_integer_rejected() {
        let mut d = Decoder::from_slice(&[0x02, 0x00]);
        assert!(d.read_integer().is_err());
    }

    #[test]
    fn test_read_i32_overflow() {
        let mut d = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00]);
        assert!(d.read_i32().is_err());
    }

    #[test]
    fn test_decode_unsigned() {
        let mut d = Decoder::from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(d.read_unsigned32_value(5).unwrap(), u32::MAX);

        let mut d = Decoder::from_slice(&[0x01, 0x00, 0x00, 0x00, 0x00]);
        assert!(d.read_unsigned32_value(5).is_err());

        let mut d = Decoder::from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(d.read_integer64_value(9).unwrap(), u64::MAX);
    }

    #[test]
    fn test_decode_null() {
        let mut d = Decoder::from_slice(&[0x05, 0x00]);
        d.read_null().unwrap();

        let mut d = Decoder::from_slice(&[0x05, 0x01, 0x00]);
        assert!(d.read_null().is_err());
    }

    #[test]
    fn test_decode_octet_string() {
        let mut d = Decoder::from_slice(&[0x04, 0x05, b'h', b'e', b'l', b'l', b'o']);
        assert_eq!(&d.read_octet_string().unwrap()[..], b"hello");
    }

    #[test]
    fn test_decode_oid() {
        // 1.3.6.1
        let mut d = Decoder::from_slice(&[0x06, 0x03, 0x2B, 0x06, 0x01]);
        assert_eq!(d.read_oid().unwrap().arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_decode_sequence_offsets() {
        let mut d = Decoder::from_slice(&[0x30, 0x03, 0x02, 0x01, 0x05]);
        let mut seq = d.read_sequence().unwrap();
        assert_eq!(seq.offset(), 2);
        assert_eq!(seq.read_integer().unwrap(), 5);
        seq.finish().unwrap();
        d.finish().unwrap();
    }

    #[test]
    fn test_unexpected_tag_reports_offset() {
        let mut d = Decoder::from_slice(&[0x30, 0x03, 0x04, 0x01, 0x05]);
        let mut seq = d.read_sequence().unwrap();
        let err = seq.read_integer().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 2,
                kind: DecodeErrorKind::UnexpectedTag {
                    expected: 0x02,
                    actual: 0x04
                }
            }
        ));
    }

    #[test]
    fn test_read_bytes_rejects_oversized_length() {
        let mut d = Decoder::from_slice(&[0x04, 0x10, 0x01]);
        let err = d.read_octet_string().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::InsufficientData {
                    needed: 16,
                    available: 1
                },
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_data() {
        let mut d = Decoder::from_slice(&[0x05, 0x00, 0xFF]);
        d.read_null().unwrap();
        assert!(matches!(
            d.finish().unwrap_err(),
            Error::Decode {
                kind: DecodeErrorKind::TrailingData { remaining: 1 },
                ..
            }
        ));
    }
}
