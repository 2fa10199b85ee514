// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Divergent-beam pre-weighting (§4.7): scales each detector sample before filtering
//! to compensate for the fan geometry. Parallel geometry needs none.

use ct_projection::Geometry;

/// Applies the geometry-dependent pre-weight in place. `d` below is the index offset
/// of a detector from the array centre, `(nDet-1)/2`.
pub fn preweight(det_values: &mut [f64], geometry: Geometry, det_inc: f64, focal_length: f64) {
    let n_det = det_values.len();
    if n_det == 0 {
        return;
    }
    let centre = (n_det as f64 - 1.0) / 2.0;

    match geometry {
        Geometry::Equilinear => {
            for (k, v) in det_values.iter_mut().enumerate() {
                let s = (k as f64 - centre) * det_inc;
                *v *= focal_length / (focal_length * focal_length + s * s).sqrt();
            }
        }
        Geometry::Equiangular => {
            for (k, v) in det_values.iter_mut().enumerate() {
                let gamma = (k as f64 - centre) * det_inc;
                *v *= focal_length * gamma.cos();
            }
        }
        Geometry::Parallel | Geometry::Invalid => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_geometry_is_a_no_op() {
        let mut values = vec![1.0, 2.0, 3.0];
        let original = values.clone();
        preweight(&mut values, Geometry::Parallel, 0.01, 100.0);
        assert_eq!(values, original);
    }

    #[test]
    fn equilinear_centre_detector_is_unscaled() {
        let mut values = vec![1.0, 1.0, 1.0];
        preweight(&mut values, Geometry::Equilinear, 0.01, 100.0);
        assert!((values[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn equiangular_scales_by_focal_length_at_centre() {
        let mut values = vec![1.0, 1.0, 1.0];
        preweight(&mut values, Geometry::Equiangular, 0.01, 100.0);
        assert!((values[1] - 100.0).abs() < 1e-9);
    }
}
