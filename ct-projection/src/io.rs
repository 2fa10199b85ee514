// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The native big-endian projection file container (§6): a fixed header followed by
//! `nView` view records of `(viewAngle, nDet, f32[nDet])`.

use crate::geometry::Geometry;
use crate::projection::{Projection, ProjectionHeader, ViewRecord};
use chrono::{TimeZone, Utc};
use ct_core::error::{CtError, Result};
use ct_core::io::{ReadBytes, WriteBytes};

/// `'P'*256 + 'J'` per §6.
const SIGNATURE: u16 = 0x504A;

/// The fixed-size header preceding the view records, not counting the variable-length
/// remark that follows it; used for the on-disk `headerSize` field.
const FIXED_HEADER_LEN: u16 = 2 + 2 + 4 + 4 + 4 + 8 + 8 + 8 + 8 + 8 + 8 + 8 + 8 + 8 + 2 * 6 + 2;

pub fn write_projection<W: std::io::Write>(writer: &mut W, projection: &Projection) -> Result<()> {
    let h = &projection.header;
    let remark = h.remark.as_bytes();
    let header_size = FIXED_HEADER_LEN + remark.len() as u16;

    writer.write_be_u16(header_size)?;
    writer.write_be_u16(SIGNATURE)?;
    writer.write_be_u32(projection.n_view() as u32)?;
    writer.write_be_u32(projection.n_det() as u32)?;
    writer.write_be_u32(h.geometry.to_wire())?;
    writer.write_be_f64(h.calc_time)?;
    writer.write_be_f64(h.rot_start)?;
    writer.write_be_f64(h.rot_inc)?;
    writer.write_be_f64(h.det_start)?;
    writer.write_be_f64(h.det_inc)?;
    writer.write_be_f64(h.view_diameter)?;
    writer.write_be_f64(h.focal_length)?;
    writer.write_be_f64(h.source_detector_length)?;
    writer.write_be_f64(h.fan_beam_angle)?;
    writer.write_be_u16(h.created_at.format("%Y").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(h.created_at.format("%m").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(h.created_at.format("%d").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(h.created_at.format("%H").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(h.created_at.format("%M").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(h.created_at.format("%S").to_string().parse().unwrap_or(0))?;
    writer.write_be_u16(remark.len() as u16)?;
    writer.write_buf(remark)?;

    for view in projection.views() {
        writer.write_be_f64(view.view_angle)?;
        writer.write_be_u32(view.det_values.len() as u32)?;
        for &v in &view.det_values {
            writer.write_be_f32(v as f32)?;
        }
    }

    Ok(())
}

pub fn read_projection<R: std::io::Read>(reader: &mut R) -> Result<Projection> {
    let _header_size = reader.read_be_u16()?;
    let signature = reader.read_be_u16()?;
    if signature != SIGNATURE {
        return Err(CtError::Decode("projection file signature mismatch"));
    }

    let n_view = reader.read_be_u32()? as usize;
    let n_det = reader.read_be_u32()? as usize;
    let geometry = Geometry::from_wire(reader.read_be_u32()?);

    let calc_time = reader.read_be_f64()?;
    let rot_start = reader.read_be_f64()?;
    let rot_inc = reader.read_be_f64()?;
    let det_start = reader.read_be_f64()?;
    let det_inc = reader.read_be_f64()?;
    let view_diameter = reader.read_be_f64()?;
    let focal_length = reader.read_be_f64()?;
    let source_detector_length = reader.read_be_f64()?;
    let fan_beam_angle = reader.read_be_f64()?;

    let year = reader.read_be_u16()? as i32;
    let month = reader.read_be_u16()? as u32;
    let day = reader.read_be_u16()? as u32;
    let hour = reader.read_be_u16()? as u32;
    let minute = reader.read_be_u16()? as u32;
    let second = reader.read_be_u16()? as u32;

    let remark_len = reader.read_be_u16()? as usize;
    let remark = String::from_utf8(reader.read_bytes(remark_len)?)
        .map_err(|_| CtError::Decode("projection remark is not valid UTF-8"))?;

    let created_at = Utc
        .with_ymd_and_hms(year, month.max(1), day.max(1), hour, minute, second)
        .single()
        .unwrap_or_else(Utc::now);

    let header = ProjectionHeader {
        geometry,
        focal_length,
        source_detector_length,
        view_diameter,
        fan_beam_angle,
        det_inc,
        det_start,
        rot_start,
        rot_inc,
        calc_time,
        created_at,
        remark,
    };

    let mut projection = Projection::new(header, 0, n_det);
    for _ in 0..n_view {
        let view_angle = reader.read_be_f64()?;
        let n_det_view = reader.read_be_u32()? as usize;
        let mut det_values = Vec::with_capacity(n_det_view);
        for _ in 0..n_det_view {
            det_values.push(reader.read_be_f32()? as f64);
        }
        projection.push_view(ViewRecord { view_angle, det_values });
    }

    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_header_and_views() {
        let mut header = ProjectionHeader::new(Geometry::Equiangular);
        header.focal_length = 100.0;
        header.rot_inc = std::f64::consts::PI / 180.0;
        header.remark = "unit test".to_string();

        let mut projection = Projection::new(header, 2, 3);
        projection.view_mut(0).view_angle = 0.0;
        projection.view_mut(0).det_values = vec![1.0, 2.0, 3.0];
        projection.view_mut(1).view_angle = 1.0;
        projection.view_mut(1).det_values = vec![4.0, 5.0, 6.0];

        let mut buf = Vec::new();
        write_projection(&mut buf, &projection).unwrap();

        let mut cursor = Cursor::new(buf);
        let restored = read_projection(&mut cursor).unwrap();

        assert_eq!(restored.n_view(), 2);
        assert_eq!(restored.n_det(), 3);
        assert_eq!(restored.header.geometry, Geometry::Equiangular);
        assert_eq!(restored.header.remark, "unit test");
        assert!((restored.header.focal_length - 100.0).abs() < 1e-9);
        assert_eq!(restored.view(0).det_values, vec![1.0, 2.0, 3.0]);
        assert_eq!(restored.view(1).view_angle, 1.0);
    }

    #[test]
    fn rejects_bad_signature() {
        let buf = vec![0u8; 64];
        let mut cursor = Cursor::new(buf);
        assert!(matches!(read_projection(&mut cursor), Err(CtError::Decode(_))));
    }
}
