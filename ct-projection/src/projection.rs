// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The projection container (§3, §4.3): a header of scan geometry parameters plus an
//! ordered sequence of per-view detector-array records.

use crate::geometry::Geometry;
use chrono::{DateTime, Utc};

/// One acquired view: the rotation angle at which it was taken and its detector
/// samples, held as `f64` in memory even though the on-disk format is `f32`
/// (§3 "detector values are stored as 32-bit floats on disk but manipulated as
/// 64-bit in memory").
#[derive(Debug, Clone)]
pub struct ViewRecord {
    pub view_angle: f64,
    pub det_values: Vec<f64>,
}

impl ViewRecord {
    pub fn new(view_angle: f64, n_det: usize) -> Self {
        ViewRecord { view_angle, det_values: vec![0.0; n_det] }
    }
}

/// Scan geometry parameters and provenance carried by a [`Projection`] (§3, §6).
#[derive(Debug, Clone)]
pub struct ProjectionHeader {
    pub geometry: Geometry,
    pub focal_length: f64,
    pub source_detector_length: f64,
    pub view_diameter: f64,
    pub fan_beam_angle: f64,
    pub det_inc: f64,
    pub det_start: f64,
    pub rot_start: f64,
    pub rot_inc: f64,
    pub calc_time: f64,
    pub created_at: DateTime<Utc>,
    pub remark: String,
}

impl ProjectionHeader {
    pub fn new(geometry: Geometry) -> Self {
        ProjectionHeader {
            geometry,
            focal_length: 0.0,
            source_detector_length: 0.0,
            view_diameter: 0.0,
            fan_beam_angle: 0.0,
            det_inc: 0.0,
            det_start: 0.0,
            rot_start: 0.0,
            rot_inc: 0.0,
            calc_time: 0.0,
            created_at: Utc::now(),
            remark: String::new(),
        }
    }
}

/// An ordered sequence of `nView` detector-array records, plus the geometry under
/// which they were acquired (§3). Owns no relationship to the phantom/scanner that
/// produced it beyond the header's copied parameters.
#[derive(Debug, Clone)]
pub struct Projection {
    pub header: ProjectionHeader,
    views: Vec<ViewRecord>,
}

impl Projection {
    pub fn new(header: ProjectionHeader, n_view: usize, n_det: usize) -> Self {
        let views = (0..n_view).map(|_| ViewRecord::new(0.0, n_det)).collect();
        Projection { header, views }
    }

    pub fn n_view(&self) -> usize {
        self.views.len()
    }

    pub fn n_det(&self) -> usize {
        self.views.first().map_or(0, |v| v.det_values.len())
    }

    pub fn view(&self, index: usize) -> &ViewRecord {
        &self.views[index]
    }

    pub fn view_mut(&mut self, index: usize) -> &mut ViewRecord {
        &mut self.views[index]
    }

    pub fn views(&self) -> &[ViewRecord] {
        &self.views
    }

    /// Iterates `(viewIndex, viewAngle, detValues)` in acquisition order (§4.3).
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64, &[f64])> {
        self.views.iter().enumerate().map(|(i, v)| (i, v.view_angle, v.det_values.as_slice()))
    }

    /// Resizes the view count, truncating or zero-extending the detector array of
    /// every view (§4.3 "resize view count").
    pub fn set_view_count(&mut self, n_view: usize) {
        let n_det = self.n_det();
        self.views.resize_with(n_view, || ViewRecord::new(0.0, n_det));
    }

    pub fn push_view(&mut self, view: ViewRecord) {
        self.views.push(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_projection_is_zero_filled() {
        let header = ProjectionHeader::new(Geometry::Parallel);
        let proj = Projection::new(header, 4, 8);
        assert_eq!(proj.n_view(), 4);
        assert_eq!(proj.n_det(), 8);
        for (_, angle, dets) in proj.iter() {
            assert_eq!(angle, 0.0);
            assert!(dets.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn resize_preserves_existing_views() {
        let header = ProjectionHeader::new(Geometry::Parallel);
        let mut proj = Projection::new(header, 2, 4);
        proj.view_mut(0).view_angle = 1.5;
        proj.set_view_count(4);
        assert_eq!(proj.n_view(), 4);
        assert_eq!(proj.view(0).view_angle, 1.5);
        assert_eq!(proj.view(3).det_values.len(), 4);
    }
}
