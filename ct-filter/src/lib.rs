// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-filter` generates reconstruction filter kernels (§3, §4.6): named filter kinds
//! with closed-form spatial and/or frequency responses, realised as a spatial
//! convolution kernel, a frequency-domain kernel, or a table-cached DFT kernel.

pub mod filter;
pub mod kernel;
pub mod kind;

pub use filter::{Domain, Filter};
pub use kernel::{zeropad_to_power_of_two, FilterKernel, FilterMethod};
pub use kind::FilterKind;
