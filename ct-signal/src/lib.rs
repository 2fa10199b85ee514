// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-signal` applies a reconstruction filter to a projection row (§4.7):
//! divergent-beam pre-weighting, spatial convolution, and frequency multiplication
//! with optional pre-interpolation upsampling.

pub mod preweight;
pub mod process;

pub use preweight::preweight;
pub use process::{apply_filter, convolve, process_frequency};
