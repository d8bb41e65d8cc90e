//! Length-prefixed wire framing shared by certificate exchange and envelope
//! delivery.
//!
//! Every frame is a 4-byte little-endian length prefix followed by exactly
//! that many payload bytes. A `recv` on the socket may return fewer bytes
//! than a full frame, so [`read_frame`] loops until the declared length is
//! satisfied rather than assuming one `read` call yields one frame.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::FramingError;

/// Writes `payload` to `stream` as a single length-prefixed frame.
pub fn write_frame<W: Write>(stream: &mut W, payload: &[u8]) -> Result<(), FramingError> {
    stream.write_u32::<LittleEndian>(payload.len() as u32)?;
    stream.write_all(payload)?;
    stream.flush()?;
    Ok(())
}

/// Reads a single length-prefixed frame from `stream`, blocking until the
/// full payload has arrived.
pub fn read_frame<R: Read>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    let len = stream.read_u32::<LittleEndian>()? as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

/// Writes a UTF-8 string as a length-prefixed frame.
pub fn write_string_frame<W: Write>(stream: &mut W, s: &str) -> Result<(), FramingError> {
    write_frame(stream, s.as_bytes())
}

/// Reads a length-prefixed frame and interprets it as UTF-8.
pub fn read_string_frame<R: Read>(stream: &mut R) -> Result<String, FramingError> {
    let buf = read_frame(stream)?;
    Ok(std::str::from_utf8(&buf)?.to_string())
}
