//! Fixed-length wire format for serialized sketches.
//!
//! A sketch of precision `b` occupies exactly `2^b + 2` bytes: a two-byte
//! header (version tag, then precision) followed by the register values in
//! bucket order. Register values are single bytes, so the format has no
//! endianness.

use crate::counter::{max_rank, MAX_PRECISION, MIN_PRECISION};
use crate::error::{Error, Result};

/// Number of bytes preceding the register payload.
pub const HEADER_LEN: usize = 2;

/// Version tag written to the first header byte. Decoders reject anything
/// else, which keeps the second byte free to change meaning in a future
/// format revision.
pub(crate) const FORMAT_VERSION: u8 = 1;

/// Decoded two-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) version: u8,
    pub(crate) precision: u8,
}

impl Header {
    /// Parse and validate the leading header of a serialized sketch.
    pub(crate) fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::LengthMismatch {
                expected: HEADER_LEN,
                actual: buf.len(),
            });
        }
        let header = Self {
            version: buf[0],
            precision: buf[1],
        };
        if header.version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(header.version));
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&header.precision) {
            return Err(Error::InvalidPrecision(header.precision));
        }
        Ok(header)
    }
}

/// Borrowed view over one serialized sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame<'a> {
    pub(crate) precision: u8,
    pub(crate) registers: &'a [u8],
}

/// Number of bytes a sketch of the given precision encodes to.
#[inline]
pub(crate) fn encoded_len(precision: u8) -> usize {
    (1usize << precision) + HEADER_LEN
}

/// Decode a serialized sketch, validating version, precision, length and
/// register bounds. Returns a view borrowing the register payload; nothing
/// is copied or allocated.
pub(crate) fn decode(buf: &[u8]) -> Result<Frame<'_>> {
    let header = Header::decode(buf)?;
    let expected = encoded_len(header.precision);
    if buf.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: buf.len(),
        });
    }
    let registers = &buf[HEADER_LEN..];
    let limit = max_rank(header.precision);
    if let Some(bucket) = registers.iter().position(|&rank| rank > limit) {
        return Err(Error::RankOutOfRange {
            bucket,
            rank: registers[bucket],
        });
    }
    Ok(Frame {
        precision: header.precision,
        registers,
    })
}

/// Encode `registers` into `dst`, returning the number of bytes written.
///
/// Fails without writing anything when `dst` cannot hold the full frame;
/// excess capacity beyond the frame is left untouched.
pub(crate) fn encode_into(precision: u8, registers: &[u8], dst: &mut [u8]) -> Result<usize> {
    let required = encoded_len(precision);
    if dst.len() < required {
        return Err(Error::BufferTooSmall {
            required,
            capacity: dst.len(),
        });
    }
    dst[0] = FORMAT_VERSION;
    dst[1] = precision;
    dst[HEADER_LEN..required].copy_from_slice(registers);
    Ok(required)
}

/// Encode `registers` into a freshly allocated buffer.
pub(crate) fn encode(precision: u8, registers: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; encoded_len(precision)];
    buf[0] = FORMAT_VERSION;
    buf[1] = precision;
    buf[HEADER_LEN..].copy_from_slice(registers);
    buf
}
