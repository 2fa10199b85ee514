// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The reconstructor façade (§4.9): owns a filter kernel, a backprojector, and a
//! (possibly rebinned) copy of the input projections, and exposes a single
//! "reconstruct one view" operation so an orchestrator can divide views across
//! workers and sum the resulting images (§5).

use crate::config::{FilterMethod as ReconstructFilterMethod, ReconstructConfig};
use ct_backproject::{BackprojectConfig, Backprojector};
use ct_core::diagnostics::Diagnostics;
use ct_core::error::{construction_error, Result};
use ct_filter::{Filter, FilterKernel};
use ct_image::Image;
use ct_projection::rebin::rebin_to_parallel;
use ct_projection::Projection;
use ct_signal::{apply_filter, preweight};

/// Orchestrates filter generation, signal processing, and backprojection over a
/// fixed set of projections (§4.9).
pub struct Reconstructor {
    config: ReconstructConfig,
    projections: Projection,
    kernel: FilterKernel,
    backprojector: Backprojector,
    diagnostics: Diagnostics,
}

impl Reconstructor {
    /// Builds a reconstructor for `projections` under `config`. Rebins to parallel
    /// geometry first if `config.rebin_to_parallel` is set and the input is
    /// divergent-beam. Fails construction if the filter kind cannot be realised in
    /// the requested method (§4.7 "Failure semantics").
    pub fn new(projections: &Projection, config: ReconstructConfig) -> Result<Self> {
        let diagnostics = Diagnostics::new(config.trace_level);

        let projections = if config.rebin_to_parallel && projections.header.geometry.is_divergent() {
            rebin_to_parallel(projections)?
        } else {
            projections.clone()
        };

        let n_det = projections.n_det();
        if n_det == 0 {
            return construction_error("reconstructor requires at least one detector");
        }
        let det_inc = projections.header.det_inc;
        if det_inc <= 0.0 {
            return construction_error("reconstructor requires a positive detector increment");
        }

        let filter = Filter::new(config.filter_kind, config.filter_domain, 0.5 / det_inc)
            .with_param(config.filter_param);

        let padded_n_det = n_det + config.zeropad;
        let kernel = match config.filter_method {
            ReconstructFilterMethod::Convolution => {
                FilterKernel::build_convolution(&filter, n_det, det_inc, projections.header.geometry)
            }
            ReconstructFilterMethod::Frequency => {
                FilterKernel::build_frequency(&filter, padded_n_det, det_inc, projections.header.geometry)
            }
            ReconstructFilterMethod::Table => {
                FilterKernel::build_table(&filter, padded_n_det, det_inc, projections.header.geometry)
            }
        };

        let radius = (n_det as f64 - 1.0) * det_inc / 2.0;
        let x_inc = 2.0 * radius / config.nx as f64;
        let y_inc = 2.0 * radius / config.ny as f64;

        let backproject_config = BackprojectConfig {
            nx: config.nx,
            ny: config.ny,
            x_min: -radius,
            y_min: -radius,
            x_inc,
            y_inc,
            n_det,
            det_inc,
            n_view: projections.n_view(),
            geometry: projections.header.geometry,
            focal_length: projections.header.focal_length,
            source_detector_length: projections.header.source_detector_length,
            interp: config.interp,
            roi: config.roi,
        };
        let backprojector = Backprojector::new(backproject_config, config.backproject);

        Ok(Reconstructor { config, projections, kernel, backprojector, diagnostics })
    }

    /// Filters and backprojects `count` views starting at `view_start` (§4.9
    /// "reconstruct_view(viewIndex, count)"). Checks the diagnostics cancellation
    /// flag once per view (§5 "Cancellation").
    pub fn reconstruct_view(&mut self, view_start: usize, count: usize) {
        let geometry = self.projections.header.geometry;
        let det_inc = self.projections.header.det_inc;
        let focal_length = self.projections.header.focal_length;

        let view_end = (view_start + count).min(self.projections.n_view());
        for v in view_start..view_end {
            if self.diagnostics.is_cancelled() {
                break;
            }
            let view = self.projections.view(v);
            let mut input = view.det_values.clone();
            if geometry.is_divergent() {
                preweight(&mut input, geometry, det_inc, focal_length);
            }
            let filtered = apply_filter(&self.kernel, &input, self.config.pre_interp_factor);
            self.backprojector.backproject_view(&filtered, view.view_angle);
        }
    }

    /// Applies the deferred rotation-increment scaling (§4.9 "post_processing").
    pub fn post_processing(&mut self) {
        self.backprojector.post_processing();
    }

    pub fn image(&self) -> Image {
        self.backprojector.image()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconstructConfig;
    use ct_backproject::StrategyKind;
    use ct_filter::{Domain, FilterKind};
    use ct_projection::{Geometry, ProjectionHeader};

    fn unit_disc_projection() -> Projection {
        let mut header = ProjectionHeader::new(Geometry::Parallel);
        header.det_inc = 2.0 / 16.0;
        let n_det = 17;
        let n_view = 8;
        let mut proj = Projection::new(header, n_view, n_det);
        for v in 0..n_view {
            proj.view_mut(v).view_angle = v as f64 * std::f64::consts::PI / n_view as f64;
            for k in 0..n_det {
                proj.view_mut(v).det_values[k] = 1.0;
            }
        }
        proj
    }

    #[test]
    fn construction_rejects_non_positive_detector_increment() {
        let mut header = ProjectionHeader::new(Geometry::Parallel);
        header.det_inc = 0.0;
        let proj = Projection::new(header, 4, 8);
        let config =
            ReconstructConfig::new(16, 16, FilterKind::Bandlimit, StrategyKind::Trig);
        assert!(Reconstructor::new(&proj, config).is_err());
    }

    #[test]
    fn reconstructs_without_panicking_and_produces_an_image() {
        let proj = unit_disc_projection();
        let mut config = ReconstructConfig::new(16, 16, FilterKind::Bandlimit, StrategyKind::Table);
        config.filter_domain = Domain::Spatial;
        let mut recon = Reconstructor::new(&proj, config).unwrap();
        recon.reconstruct_view(0, proj.n_view());
        recon.post_processing();
        let image = recon.image();
        assert_eq!(image.nx(), 16);
        assert_eq!(image.ny(), 16);
    }
}
