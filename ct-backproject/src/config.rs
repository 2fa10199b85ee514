// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output-image extents and detector geometry shared by every backprojection
//! strategy (§4.8 "Common state").

use crate::interp::InterpMode;
use crate::roi::Roi;
use ct_projection::Geometry;

/// The geometry-independent state a [`crate::Backprojector`] is constructed with:
/// output image extents, detector array geometry, and interpolation choice.
#[derive(Debug, Clone)]
pub struct BackprojectConfig {
    pub nx: usize,
    pub ny: usize,
    pub x_min: f64,
    pub y_min: f64,
    pub x_inc: f64,
    pub y_inc: f64,
    pub n_det: usize,
    pub det_inc: f64,
    pub n_view: usize,
    pub geometry: Geometry,
    pub focal_length: f64,
    pub source_detector_length: f64,
    pub interp: InterpMode,
    pub roi: Option<Roi>,
}

impl BackprojectConfig {
    pub fn detector_centre(&self) -> f64 {
        (self.n_det as f64 - 1.0) / 2.0
    }

    /// `pi/nView` for parallel geometry, `2*pi/nView` for fan geometry (§4.8, glossary
    /// "Backprojection rotation scale").
    pub fn rotation_scale(&self) -> f64 {
        let span = if self.geometry == Geometry::Parallel {
            std::f64::consts::PI
        } else {
            2.0 * std::f64::consts::PI
        };
        span / self.n_view.max(1) as f64
    }
}
