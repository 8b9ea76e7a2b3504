//! SSH wire encoding (RFC 4251 §5) and the SSH.com integer variant.
//!
//! `Reader` walks a byte buffer with nom parsers; `Writer` produces the
//! canonical encoding used for public key blobs.

use nom::{IResult, Parser};
use num_bigint::BigUint;

use crate::error::{Error, Malformed, Result};

fn be_u32(input: &[u8]) -> IResult<&[u8], u32> {
    nom::number::complete::be_u32(input)
}

fn take_bytes(input: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    nom::bytes::complete::take(count).parse(input)
}

/// `uint32` length followed by that many bytes.
fn string(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, length) = be_u32(input)?;
    take_bytes(input, length as usize)
}

/// SSH.com multiple precision integer: `uint32` bit count, then
/// `(bits + 7) / 8` big-endian magnitude bytes.
fn sshcom_mpint(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, bits) = be_u32(input)?;
    take_bytes(input, (bits as usize).div_ceil(8))
}

#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    input: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Reader { input }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.len()
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let (rest, value) = be_u32(self.input)?;
        self.input = rest;
        Ok(value)
    }

    pub(crate) fn bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let (rest, value) = take_bytes(self.input, count)?;
        self.input = rest;
        Ok(value)
    }

    pub(crate) fn string(&mut self) -> Result<&'a [u8]> {
        let (rest, value) = string(self.input)?;
        self.input = rest;
        Ok(value)
    }

    pub(crate) fn str(&mut self) -> Result<&'a str> {
        let value = self.string()?;
        std::str::from_utf8(value).map_err(|_| Malformed::InvalidUtf8.into())
    }

    pub(crate) fn skip_strings(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.string()?;
        }
        Ok(())
    }

    /// Reads an `mpint`, rejecting negative values.
    pub(crate) fn mpint(&mut self, field: &'static str) -> Result<BigUint> {
        let value = self.string()?;
        if value.first().is_some_and(|b| b & 0x80 != 0) {
            return Err(Malformed::NegativeInteger(field).into());
        }
        Ok(BigUint::from_bytes_be(value))
    }

    pub(crate) fn sshcom_mpint(&mut self) -> Result<BigUint> {
        let (rest, value) = sshcom_mpint(self.input)?;
        self.input = rest;
        Ok(BigUint::from_bytes_be(value))
    }

    /// Fails unless every byte has been consumed.
    pub(crate) fn finish(&self, what: &str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::structure(format!(
                "{} trailing bytes after {}",
                self.remaining(),
                what
            )))
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn string(&mut self, data: &[u8]) -> Result<&mut Self> {
        let length = u32::try_from(data.len())
            .map_err(|_| Error::structure(format!("field of {} bytes", data.len())))?;
        self.buf.extend_from_slice(&length.to_be_bytes());
        self.buf.extend_from_slice(data);
        Ok(self)
    }

    /// Writes a non-negative `mpint`: zero is empty, and a leading zero
    /// byte is added when the high bit is set.
    pub(crate) fn mpint(&mut self, value: &BigUint) -> Result<&mut Self> {
        let mut bytes = if value.bits() == 0 {
            Vec::new()
        } else {
            value.to_bytes_be()
        };
        if bytes.first().is_some_and(|b| b & 0x80 != 0) {
            bytes.insert(0, 0);
        }
        self.string(&bytes)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
