// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements the byte-order stream helpers used by the native
//! projection and image file containers (§6). All on-disk fields are big-endian; these
//! helpers byte-swap as needed regardless of host endianness, and a complementary
//! "reverse" helper exists for the rare native-order format per spec.md §6.

mod buf_reader;

pub use buf_reader::BufReader;

use crate::error::{CtError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use std::io::Write;

/// Reads bytes and interprets them as big- or little-endian integers and
/// floating-point values of standard widths. Returns `CtError` on I/O failure and
/// exposes both endiannesses as first-class (the wire format is always big-endian;
/// native-order helpers are the exception, per §6).
pub trait ReadBytes {
    fn read_byte(&mut self) -> Result<u8>;
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        self.read_byte()
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_buf_exact(&mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    #[inline]
    fn read_be_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_buf_exact(&mut buf)?;
        Ok(BigEndian::read_u16(&buf))
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    #[inline]
    fn read_be_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(BigEndian::read_u32(&buf))
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }

    #[inline]
    fn read_be_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(BigEndian::read_u64(&buf))
    }

    #[inline]
    fn read_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(LittleEndian::read_f32(&buf))
    }

    #[inline]
    fn read_be_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(BigEndian::read_f32(&buf))
    }

    #[inline]
    fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(LittleEndian::read_f64(&buf))
    }

    #[inline]
    fn read_be_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.read_buf_exact(&mut buf)?;
        Ok(BigEndian::read_f64(&buf))
    }

    /// Reads a value in the host's native byte order. Used only by the rare
    /// native-order container format variant permitted by §6.
    #[inline]
    fn read_native_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_buf_exact(&mut buf)?;
        Ok(NativeEndian::read_u32(&buf))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_buf_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Writes values as big- or little-endian integers and floating-point values. The
/// write-side counterpart to [`ReadBytes`]; every projection/image file writer in
/// `ct-projection`/`ct-image` goes through this trait so the endianness discipline
/// lives in one place.
pub trait WriteBytes {
    fn write_byte(&mut self, value: u8) -> Result<()>;
    fn write_buf(&mut self, buf: &[u8]) -> Result<()>;

    #[inline]
    fn write_u16(&mut self, value: u16) -> Result<()> {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.write_buf(&buf)
    }

    #[inline]
    fn write_be_u16(&mut self, value: u16) -> Result<()> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.write_buf(&buf)
    }

    #[inline]
    fn write_u32(&mut self, value: u32) -> Result<()> {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_buf(&buf)
    }

    #[inline]
    fn write_be_u32(&mut self, value: u32) -> Result<()> {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, value);
        self.write_buf(&buf)
    }

    #[inline]
    fn write_be_f32(&mut self, value: f32) -> Result<()> {
        let mut buf = [0u8; 4];
        BigEndian::write_f32(&mut buf, value);
        self.write_buf(&buf)
    }

    #[inline]
    fn write_be_f64(&mut self, value: f64) -> Result<()> {
        let mut buf = [0u8; 8];
        BigEndian::write_f64(&mut buf, value);
        self.write_buf(&buf)
    }
}

/// Blanket [`WriteBytes`] implementation for any `std::io::Write`, so files, cursors,
/// and `Vec<u8>` buffers (via `std::io::Cursor`) all work without an adapter.
impl<W: Write> WriteBytes for W {
    #[inline]
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value]).map_err(CtError::from)
    }

    #[inline]
    fn write_buf(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf).map_err(CtError::from)
    }
}

/// Blanket [`ReadBytes`] implementation for any `std::io::Read`.
impl<R: std::io::Read> ReadBytes for R {
    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf).map_err(CtError::from)?;
        Ok(buf[0])
    }

    #[inline]
    fn read_buf_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_exact(buf).map_err(CtError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn endian_round_trip() {
        let mut buf: Vec<u8> = Vec::new();
        buf.write_be_u32(0x1234_5678).unwrap();
        buf.write_be_f64(std::f64::consts::PI).unwrap();

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_be_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_be_f64().unwrap(), std::f64::consts::PI);
    }
}
