// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The six concrete backprojection strategies, as a tagged-variant enum rather than
//! virtual dispatch (Design Note "Backprojector polymorphism"): four algorithmic
//! variants for parallel geometry (trig, table, difference, integer difference), plus
//! one strategy each for the equilinear and equiangular fan-beam geometries.

use crate::config::BackprojectConfig;
use crate::interp::InterpMode;
use std::f64::consts::PI;

/// Fixed-point fractional bits used by [`Strategy::ParallelIntDiff`] (Design Note
/// "Signed/unsigned detector index arithmetic": 2^32 on 64-bit).
const FIXED_POINT_BITS: u32 = 32;

#[derive(Debug, Clone)]
pub enum Strategy {
    ParallelTrig,
    /// `(r, phi)` precomputed once per pixel at construction, flat column-major
    /// `i*ny+j` indexed to match the accumulator image.
    ParallelTable { r: Vec<f64>, phi: Vec<f64> },
    ParallelDiff,
    ParallelIntDiff,
    Equilinear,
    Equiangular,
}

impl Strategy {
    pub fn parallel_table(cfg: &BackprojectConfig) -> Self {
        let mut r = Vec::with_capacity(cfg.nx * cfg.ny);
        let mut phi = Vec::with_capacity(cfg.nx * cfg.ny);
        for i in 0..cfg.nx {
            let x = cfg.x_min + (i as f64 + 0.5) * cfg.x_inc;
            for j in 0..cfg.ny {
                let y = cfg.y_min + (j as f64 + 0.5) * cfg.y_inc;
                r.push((x * x + y * y).sqrt());
                phi.push(y.atan2(x));
            }
        }
        Strategy::ParallelTable { r, phi }
    }

    /// Accumulates one view's filtered row into `image` (flat column-major `i*ny+j`,
    /// size `cfg.nx * cfg.ny`), interpolating with `cfg.interp` and skipping pixels
    /// outside `cfg.roi` when set.
    pub fn backproject_view(
        &self,
        cfg: &BackprojectConfig,
        filtered: &[f64],
        beta: f64,
        image: &mut [f64],
    ) {
        match self {
            Strategy::ParallelTrig => self.trig(cfg, filtered, beta, image),
            Strategy::ParallelTable { r, phi } => table(cfg, filtered, beta, r, phi, image),
            Strategy::ParallelDiff => diff(cfg, filtered, beta, image),
            Strategy::ParallelIntDiff => int_diff(cfg, filtered, beta, image),
            Strategy::Equilinear => equilinear(cfg, filtered, beta, image),
            Strategy::Equiangular => equiangular(cfg, filtered, beta, image),
        }
    }

    fn trig(&self, cfg: &BackprojectConfig, filtered: &[f64], beta: f64, image: &mut [f64]) {
        let centre = cfg.detector_centre();
        for i in 0..cfg.nx {
            let x = cfg.x_min + (i as f64 + 0.5) * cfg.x_inc;
            for j in 0..cfg.ny {
                let y = cfg.y_min + (j as f64 + 0.5) * cfg.y_inc;
                if !pixel_in_roi(cfg, x, y) {
                    continue;
                }
                let r = (x * x + y * y).sqrt();
                let phi = y.atan2(x);
                let l = r * (beta - phi).cos();
                let idx = l / cfg.det_inc + centre;
                image[i * cfg.ny + j] += cfg.interp.sample(filtered, idx);
            }
        }
    }
}

fn pixel_in_roi(cfg: &BackprojectConfig, x: f64, y: f64) -> bool {
    cfg.roi.map_or(true, |roi| roi.contains(x, y))
}

fn table(
    cfg: &BackprojectConfig,
    filtered: &[f64],
    beta: f64,
    r: &[f64],
    phi: &[f64],
    image: &mut [f64],
) {
    let centre = cfg.detector_centre();
    for i in 0..cfg.nx {
        let x = cfg.x_min + (i as f64 + 0.5) * cfg.x_inc;
        for j in 0..cfg.ny {
            let y = cfg.y_min + (j as f64 + 0.5) * cfg.y_inc;
            if !pixel_in_roi(cfg, x, y) {
                continue;
            }
            let idx_flat = i * cfg.ny + j;
            let l = r[idx_flat] * (beta - phi[idx_flat]).cos();
            let idx = l / cfg.det_inc + centre;
            image[idx_flat] += cfg.interp.sample(filtered, idx);
        }
    }
}

fn diff(cfg: &BackprojectConfig, filtered: &[f64], beta: f64, image: &mut [f64]) {
    let centre = cfg.detector_centre();
    let cos_b = beta.cos();
    let sin_b = beta.sin();
    let d_lx = cfg.x_inc * cos_b / cfg.det_inc;
    let d_ly = cfg.y_inc * sin_b / cfg.det_inc;
    let x0 = cfg.x_min + 0.5 * cfg.x_inc;
    let y0 = cfg.y_min + 0.5 * cfg.y_inc;
    let l00 = (x0 * cos_b + y0 * sin_b) / cfg.det_inc;

    for j in 0..cfg.ny {
        let y = y0 + j as f64 * cfg.y_inc;
        let mut l = l00 + j as f64 * d_ly;
        for i in 0..cfg.nx {
            let x = x0 + i as f64 * cfg.x_inc;
            if pixel_in_roi(cfg, x, y) {
                let idx = l + centre;
                image[i * cfg.ny + j] += cfg.interp.sample(filtered, idx);
            }
            l += d_lx;
        }
    }
}

fn int_diff(cfg: &BackprojectConfig, filtered: &[f64], beta: f64, image: &mut [f64]) {
    let centre = cfg.detector_centre();
    let cos_b = beta.cos();
    let sin_b = beta.sin();
    let scale = (1i64 << FIXED_POINT_BITS) as f64;
    let d_lx = (cfg.x_inc * cos_b / cfg.det_inc * scale).round() as i64;
    let d_ly = (cfg.y_inc * sin_b / cfg.det_inc * scale).round() as i64;
    let x0 = cfg.x_min + 0.5 * cfg.x_inc;
    let y0 = cfg.y_min + 0.5 * cfg.y_inc;
    let l00 = ((x0 * cos_b + y0 * sin_b) / cfg.det_inc * scale).round() as i64;

    for j in 0..cfg.ny {
        let y = y0 + j as f64 * cfg.y_inc;
        let mut l_fixed = l00 + j as i64 * d_ly;
        for i in 0..cfg.nx {
            let x = x0 + i as f64 * cfg.x_inc;
            if pixel_in_roi(cfg, x, y) {
                let value = match cfg.interp {
                    InterpMode::Nearest => {
                        let idx = (l_fixed >> FIXED_POINT_BITS) + centre.round() as i64;
                        if idx >= 0 && (idx as usize) < filtered.len() {
                            filtered[idx as usize]
                        } else {
                            0.0
                        }
                    }
                    InterpMode::Linear => {
                        let whole = l_fixed >> FIXED_POINT_BITS;
                        let frac = (l_fixed & ((1i64 << FIXED_POINT_BITS) - 1)) as f64 / scale;
                        let idx = whole + centre.round() as i64;
                        if idx >= 0 && ((idx as usize) + 1) < filtered.len() {
                            let a = filtered[idx as usize];
                            let b = filtered[idx as usize + 1];
                            a + frac * (b - a)
                        } else {
                            0.0
                        }
                    }
                    InterpMode::Cubic => {
                        let l = l_fixed as f64 / scale;
                        cfg.interp.sample(filtered, l + centre)
                    }
                };
                image[i * cfg.ny + j] += value;
            }
            l_fixed += d_lx;
        }
    }
}

fn equilinear(cfg: &BackprojectConfig, filtered: &[f64], beta: f64, image: &mut [f64]) {
    let centre = cfg.detector_centre();
    for i in 0..cfg.nx {
        let x = cfg.x_min + (i as f64 + 0.5) * cfg.x_inc;
        for j in 0..cfg.ny {
            let y = cfg.y_min + (j as f64 + 0.5) * cfg.y_inc;
            if !pixel_in_roi(cfg, x, y) {
                continue;
            }
            let r = (x * x + y * y).sqrt();
            let phi = y.atan2(x);
            let s = r * (beta - phi).cos();
            let denom = cfg.focal_length + r * (beta - phi).sin();
            if denom.abs() < 1e-9 {
                continue;
            }
            let u = denom / cfg.focal_length;
            let t = cfg.source_detector_length * s / denom;
            let idx = t / cfg.det_inc + centre;
            image[i * cfg.ny + j] += cfg.interp.sample(filtered, idx) / (u * u);
        }
    }
}

fn equiangular(cfg: &BackprojectConfig, filtered: &[f64], beta: f64, image: &mut [f64]) {
    let centre = cfg.detector_centre();
    for i in 0..cfg.nx {
        let x = cfg.x_min + (i as f64 + 0.5) * cfg.x_inc;
        for j in 0..cfg.ny {
            let y = cfg.y_min + (j as f64 + 0.5) * cfg.y_inc;
            if !pixel_in_roi(cfg, x, y) {
                continue;
            }
            let r = (x * x + y * y).sqrt();
            let phi = y.atan2(x);
            let num = r * (beta - phi).cos();
            let denom = cfg.focal_length + r * (beta - phi).sin();
            let l_sq = denom * denom + num * num;
            if l_sq < 1e-9 {
                continue;
            }
            let gamma = num.atan2(denom);
            let idx = gamma / cfg.det_inc + centre;
            image[i * cfg.ny + j] += cfg.interp.sample(filtered, idx) / l_sq;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackprojectConfig;
    use crate::interp::InterpMode;
    use ct_projection::Geometry;

    fn cfg() -> BackprojectConfig {
        BackprojectConfig {
            nx: 8,
            ny: 8,
            x_min: -1.0,
            y_min: -1.0,
            x_inc: 0.25,
            y_inc: 0.25,
            n_det: 9,
            det_inc: 0.25,
            n_view: 4,
            geometry: Geometry::Parallel,
            focal_length: 0.0,
            source_detector_length: 0.0,
            interp: InterpMode::Linear,
            roi: None,
        }
    }

    #[test]
    fn trig_and_table_strategies_agree() {
        let c = cfg();
        let filtered = vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let mut trig_image = vec![0.0; c.nx * c.ny];
        Strategy::ParallelTrig.backproject_view(&c, &filtered, 0.3, &mut trig_image);

        let table_strategy = Strategy::parallel_table(&c);
        let mut table_image = vec![0.0; c.nx * c.ny];
        table_strategy.backproject_view(&c, &filtered, 0.3, &mut table_image);

        for (a, b) in trig_image.iter().zip(table_image.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn trig_and_diff_strategies_agree() {
        let c = cfg();
        let filtered = vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let mut trig_image = vec![0.0; c.nx * c.ny];
        Strategy::ParallelTrig.backproject_view(&c, &filtered, 0.3, &mut trig_image);

        let mut diff_image = vec![0.0; c.nx * c.ny];
        Strategy::ParallelDiff.backproject_view(&c, &filtered, 0.3, &mut diff_image);

        for (a, b) in trig_image.iter().zip(diff_image.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn roi_restricts_updated_pixels() {
        let mut c = cfg();
        c.roi = Some(crate::roi::Roi { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 });
        let filtered = vec![1.0; 9];
        let mut image = vec![0.0; c.nx * c.ny];
        Strategy::ParallelTrig.backproject_view(&c, &filtered, 0.0, &mut image);
        // Bottom-left pixel (i=0, j=0) sits at x=-0.875, y=-0.875, outside the ROI.
        assert_eq!(image[0], 0.0);
    }
}
