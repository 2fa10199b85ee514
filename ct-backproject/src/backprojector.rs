// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The backprojector contract (§4.8): `backproject_view` accumulates one filtered
//! view into an image; `post_processing` applies the rotation-increment scaling
//! deferred until every view has been summed.

use crate::config::BackprojectConfig;
use crate::strategy::Strategy;
use ct_image::Image;
use ct_projection::Geometry;

/// Which of the six concrete strategies to construct (§4.8, Design Note
/// "Backprojector polymorphism").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Trig,
    Table,
    Diff,
    IntDiff,
}

impl StrategyKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "trig" => StrategyKind::Trig,
            "table" => StrategyKind::Table,
            "diff" | "difference" => StrategyKind::Diff,
            "int-diff" | "intdiff" | "integer-difference" => StrategyKind::IntDiff,
            _ => return None,
        })
    }
}

/// Accumulates filtered projection views into a reconstructed image (§4.8). Owns its
/// accumulator as a flat column-major buffer (`i*ny+j`) and applies the
/// rotation-increment scaling once, in [`Backprojector::post_processing`], rather
/// than per view.
pub struct Backprojector {
    config: BackprojectConfig,
    strategy: Strategy,
    accumulator: Vec<f64>,
    finalized: bool,
}

impl Backprojector {
    /// Builds a backprojector for `config`'s geometry. `strategy_kind` selects among
    /// the four parallel-geometry algorithms and is ignored for fan geometries, which
    /// have exactly one strategy each (§4.8 "Fan-beam variants").
    pub fn new(config: BackprojectConfig, strategy_kind: StrategyKind) -> Self {
        let strategy = match config.geometry {
            Geometry::Equilinear => Strategy::Equilinear,
            Geometry::Equiangular => Strategy::Equiangular,
            Geometry::Parallel | Geometry::Invalid => match strategy_kind {
                StrategyKind::Trig => Strategy::ParallelTrig,
                StrategyKind::Table => Strategy::parallel_table(&config),
                StrategyKind::Diff => Strategy::ParallelDiff,
                StrategyKind::IntDiff => Strategy::ParallelIntDiff,
            },
        };
        let accumulator = vec![0.0; config.nx * config.ny];
        Backprojector { config, strategy, accumulator, finalized: false }
    }

    pub fn config(&self) -> &BackprojectConfig {
        &self.config
    }

    /// Accumulates one view's filtered detector row, taken at rotation angle `beta`,
    /// into the running image (§4.8 "backproject_view(filtered[0..nDet), beta)").
    pub fn backproject_view(&mut self, filtered: &[f64], beta: f64) {
        self.strategy.backproject_view(&self.config, filtered, beta, &mut self.accumulator);
    }

    /// Applies the deferred rotation-increment scale to the accumulated image. Calling
    /// this more than once is a no-op (§4.9 "post_processing").
    pub fn post_processing(&mut self) {
        if self.finalized {
            return;
        }
        let scale = self.config.rotation_scale();
        for v in self.accumulator.iter_mut() {
            *v *= scale;
        }
        self.finalized = true;
    }

    /// Materialises the accumulated buffer as an [`Image`]. Safe to call before
    /// [`Backprojector::post_processing`] to inspect partial progress.
    pub fn image(&self) -> Image {
        let cfg = &self.config;
        let mut image = Image::new_real(cfg.nx, cfg.ny, cfg.x_inc, cfg.y_inc);
        for i in 0..cfg.nx {
            for j in 0..cfg.ny {
                image.set_real(i, j, self.accumulator[i * cfg.ny + j]);
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::InterpMode;

    fn config() -> BackprojectConfig {
        BackprojectConfig {
            nx: 16,
            ny: 16,
            x_min: -1.0,
            y_min: -1.0,
            x_inc: 0.125,
            y_inc: 0.125,
            n_det: 17,
            det_inc: 0.125,
            n_view: 4,
            geometry: Geometry::Parallel,
            focal_length: 0.0,
            source_detector_length: 0.0,
            interp: InterpMode::Linear,
            roi: None,
        }
    }

    #[test]
    fn post_processing_scales_by_rotation_increment() {
        let mut bp = Backprojector::new(config(), StrategyKind::Trig);
        let filtered = vec![1.0; 17];
        bp.backproject_view(&filtered, 0.0);
        let before = bp.image().get_real(8, 8);
        bp.post_processing();
        let after = bp.image().get_real(8, 8);
        assert!((after - before * bp.config.rotation_scale()).abs() < 1e-9);
    }

    #[test]
    fn post_processing_is_idempotent() {
        let mut bp = Backprojector::new(config(), StrategyKind::Trig);
        bp.backproject_view(&vec![1.0; 17], 0.0);
        bp.post_processing();
        let once = bp.image().get_real(8, 8);
        bp.post_processing();
        let twice = bp.image().get_real(8, 8);
        assert_eq!(once, twice);
    }

    #[test]
    fn fan_geometry_ignores_strategy_kind_argument() {
        let mut fan_cfg = config();
        fan_cfg.geometry = Geometry::Equiangular;
        fan_cfg.focal_length = 100.0;
        fan_cfg.source_detector_length = 150.0;
        let bp = Backprojector::new(fan_cfg, StrategyKind::Diff);
        assert!(matches!(bp.strategy, Strategy::Equiangular));
    }
}
