// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scanner acquisition configuration (§3 "Scanner": "Derived from a phantom and
//! acquisition parameters").

use ct_projection::Geometry;

/// The acquisition parameters a [`crate::Scanner`] is configured with, independent of
/// any particular phantom.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub geometry: Geometry,
    pub n_det: usize,
    pub n_view: usize,
    /// Detector-array window size as a fraction of the phantom's bounding-circle
    /// diameter.
    pub view_ratio: f64,
    /// Source-to-phantom-centre radius, as a multiple of the phantom's radius.
    pub scan_ratio: f64,
    /// Per-detector super-sampling factor used by the ray integrator.
    pub n_sample: usize,
    /// Total angular span the scan covers, radians. `2*PI` for a full equiangular /
    /// equilinear scan, `PI` for a full parallel scan; a helical acquisition may
    /// exceed these.
    pub rotation: f64,
    pub focal_length: f64,
    pub center_detector_length: f64,
    /// View index offset added to every generated view (§4.5 "partial scans").
    pub offset_view: usize,
}

impl ScannerConfig {
    pub fn parallel(n_det: usize, n_view: usize) -> Self {
        ScannerConfig {
            geometry: Geometry::Parallel,
            n_det,
            n_view,
            view_ratio: 1.0,
            scan_ratio: 2.0,
            n_sample: 1,
            rotation: std::f64::consts::PI,
            focal_length: 0.0,
            center_detector_length: 0.0,
            offset_view: 0,
        }
    }

    pub fn fan(geometry: Geometry, n_det: usize, n_view: usize, focal_length: f64) -> Self {
        ScannerConfig {
            geometry,
            n_det,
            n_view,
            view_ratio: 1.0,
            scan_ratio: 2.0,
            n_sample: 1,
            rotation: 2.0 * std::f64::consts::PI,
            focal_length,
            center_detector_length: focal_length * 2.0,
            offset_view: 0,
        }
    }
}
