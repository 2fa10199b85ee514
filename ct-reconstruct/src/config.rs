// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction parameters for a [`crate::Reconstructor`] (§4.9): filter choice,
//! signal-processing method, backprojection strategy, and the interpolation and ROI
//! settings threaded through to [`ct_backproject`].

use ct_backproject::{InterpMode, Roi, StrategyKind};
use ct_core::diagnostics::ReportLevel;
use ct_filter::{Domain, FilterKind};

/// Which [`ct_filter::kernel::FilterMethod`] a reconstruction uses to realise its
/// filter kernel (§4.6 "Modes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMethod {
    Convolution,
    Frequency,
    Table,
}

/// The full parameter set a [`crate::Reconstructor`] is built from (§4.9 "A single
/// constructor takes...").
#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    pub nx: usize,
    pub ny: usize,
    pub filter_kind: FilterKind,
    pub filter_param: f64,
    pub filter_domain: Domain,
    pub filter_method: FilterMethod,
    /// Extra zero-padding bins requested on top of `nDet` before rounding the
    /// frequency-domain kernel size up to a power of two.
    pub zeropad: usize,
    pub interp: InterpMode,
    /// Pre-interpolation upsampling factor used by frequency-domain filtering
    /// (§4.7 "pre-interpolation factor p>=1").
    pub pre_interp_factor: usize,
    pub backproject: StrategyKind,
    pub trace_level: ReportLevel,
    pub roi: Option<Roi>,
    pub rebin_to_parallel: bool,
}

impl ReconstructConfig {
    pub fn new(nx: usize, ny: usize, filter_kind: FilterKind, backproject: StrategyKind) -> Self {
        ReconstructConfig {
            nx,
            ny,
            filter_kind,
            filter_param: 0.0,
            filter_domain: Domain::Spatial,
            filter_method: FilterMethod::Convolution,
            zeropad: 0,
            interp: InterpMode::Linear,
            pre_interp_factor: 1,
            backproject,
            trace_level: ReportLevel::Silent,
            roi: None,
            rebin_to_parallel: false,
        }
    }
}
