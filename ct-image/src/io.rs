// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native big-endian image file container (§6): a header giving the array shape and
//! pixel format, a sequence of history labels, and the `nx*ny` sample array itself.

use crate::image::Image;
use crate::label::Label;
use crate::pixel::PixelFormat;
use chrono::{DateTime, TimeZone, Utc};
use ct_core::error::{CtError, Result};
use ct_core::io::{ReadBytes, WriteBytes};
use num_complex::Complex64;
use std::time::Duration;

/// `'I'*256 + 'M'`, read back as a big-endian `u16` (§6 follows the projection
/// container's `sig = byte0*256 + byte1` convention).
const SIGNATURE: u16 = (b'I' as u16) * 256 + b'M' as u16;

const FORMAT_REAL32: u32 = 0;
const FORMAT_REAL64: u32 = 1;
const FORMAT_COMPLEX: u32 = 2;

pub fn write_image<W: std::io::Write>(writer: &mut W, image: &Image) -> Result<()> {
    writer.write_be_u16(SIGNATURE)?;
    writer.write_be_u32(image.nx() as u32)?;
    writer.write_be_u32(image.ny() as u32)?;
    writer.write_be_f64(image.x_inc())?;
    writer.write_be_f64(image.y_inc())?;

    let format = match image.pixel_format() {
        PixelFormat::Real32 => FORMAT_REAL32,
        PixelFormat::Real64 => FORMAT_REAL64,
        PixelFormat::Complex => FORMAT_COMPLEX,
    };
    writer.write_be_u32(format)?;

    writer.write_be_u32(image.labels().len() as u32)?;
    for label in image.labels() {
        write_label(writer, label)?;
    }

    match image.pixel_format() {
        PixelFormat::Complex => {
            let data = image.complex_slice().expect("tag matches storage");
            for c in data {
                writer.write_be_f64(c.re)?;
                writer.write_be_f64(c.im)?;
            }
        }
        PixelFormat::Real32 => {
            let data = image.real_slice().expect("tag matches storage");
            for &v in data {
                writer.write_be_f32(v as f32)?;
            }
        }
        PixelFormat::Real64 => {
            let data = image.real_slice().expect("tag matches storage");
            for &v in data {
                writer.write_be_f64(v)?;
            }
        }
    }

    Ok(())
}

fn write_label<W: std::io::Write>(writer: &mut W, label: &Label) -> Result<()> {
    let text = label.text.as_bytes();
    writer.write_be_u16(text.len() as u16)?;
    writer.write_buf(text)?;
    writer.write_be_u16(label.timestamp.format("%Y").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_u16(label.timestamp.format("%m").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_u16(label.timestamp.format("%d").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_u16(label.timestamp.format("%H").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_u16(label.timestamp.format("%M").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_u16(label.timestamp.format("%S").to_string().parse::<u16>().unwrap_or(0))?;
    writer.write_be_f64(label.elapsed.as_secs_f64())?;
    Ok(())
}

pub fn read_image<R: std::io::Read>(reader: &mut R) -> Result<Image> {
    let signature = reader.read_be_u16()?;
    if signature != SIGNATURE {
        return Err(CtError::Decode("image file signature mismatch"));
    }
    let nx = reader.read_be_u32()? as usize;
    let ny = reader.read_be_u32()? as usize;
    let x_inc = reader.read_be_f64()?;
    let y_inc = reader.read_be_f64()?;
    let format = reader.read_be_u32()?;

    let num_labels = reader.read_be_u32()?;
    let mut labels = Vec::with_capacity(num_labels as usize);
    for _ in 0..num_labels {
        labels.push(read_label(reader)?);
    }

    let mut image = match format {
        FORMAT_REAL32 | FORMAT_REAL64 => Image::new_real(nx, ny, x_inc, y_inc),
        FORMAT_COMPLEX => Image::new_complex(nx, ny, x_inc, y_inc),
        _ => return Err(CtError::Decode("unrecognized image pixel-format tag")),
    };

    for x in 0..nx {
        for y in 0..ny {
            match format {
                FORMAT_REAL32 => image.set_real(x, y, reader.read_be_f32()? as f64),
                FORMAT_REAL64 => image.set_real(x, y, reader.read_be_f64()?),
                FORMAT_COMPLEX => {
                    let re = reader.read_be_f64()?;
                    let im = reader.read_be_f64()?;
                    image.set_complex(x, y, Complex64::new(re, im));
                }
                _ => unreachable!("validated above"),
            }
        }
    }

    for label in labels {
        image.push_label(label.text, label.elapsed);
    }

    Ok(image)
}

fn read_label<R: std::io::Read>(reader: &mut R) -> Result<Label> {
    let len = reader.read_be_u16()? as usize;
    let bytes = reader.read_bytes(len)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| CtError::Decode("image label is not valid UTF-8"))?;

    let year = reader.read_be_u16()? as i32;
    let month = reader.read_be_u16()? as u32;
    let day = reader.read_be_u16()? as u32;
    let hour = reader.read_be_u16()? as u32;
    let minute = reader.read_be_u16()? as u32;
    let second = reader.read_be_u16()? as u32;
    let elapsed_secs = reader.read_be_f64()?;

    let timestamp: DateTime<Utc> = Utc
        .with_ymd_and_hms(year, month.max(1), day.max(1), hour, minute, second)
        .single()
        .unwrap_or_else(Utc::now);

    Ok(Label { text, timestamp, elapsed: Duration::from_secs_f64(elapsed_secs.max(0.0)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn round_trips_real_image_with_labels() {
        let mut image = Image::new_real(3, 2, 1.0, 2.0);
        for x in 0..3 {
            for y in 0..2 {
                image.set_real(x, y, (x * 10 + y) as f64);
            }
        }
        image.push_label("rasterize", Duration::from_millis(250));

        let mut buf = Vec::new();
        write_image(&mut buf, &image).unwrap();

        let mut cursor = Cursor::new(buf);
        let restored = read_image(&mut cursor).unwrap();

        assert_eq!(restored.nx(), 3);
        assert_eq!(restored.ny(), 2);
        assert_eq!(restored.labels().len(), 1);
        assert_eq!(restored.labels()[0].text, "rasterize");
        for x in 0..3 {
            for y in 0..2 {
                assert_eq!(restored.get_real(x, y), image.get_real(x, y));
            }
        }
    }

    #[test]
    fn round_trips_complex_image() {
        let mut image = Image::new_complex(2, 2, 1.0, 1.0);
        image.set_complex(0, 0, Complex64::new(1.5, -2.5));
        image.set_complex(1, 1, Complex64::new(-3.0, 4.0));

        let mut buf = Vec::new();
        write_image(&mut buf, &image).unwrap();
        let mut cursor = Cursor::new(buf);
        let restored = read_image(&mut cursor).unwrap();

        assert!(restored.pixel_format().is_complex());
        assert_eq!(restored.get_complex(0, 0), Complex64::new(1.5, -2.5));
        assert_eq!(restored.get_complex(1, 1), Complex64::new(-3.0, 4.0));
    }

    #[test]
    fn rejects_bad_signature() {
        let buf = vec![0u8; 32];
        let mut cursor = Cursor::new(buf);
        assert!(matches!(read_image(&mut cursor), Err(CtError::Decode(_))));
    }
}
