// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-reconstruct` is the façade over [`ct_filter`], [`ct_signal`], and
//! [`ct_backproject`] (§4.9): a single [`Reconstructor`] owns the filter kernel and
//! backprojector a reconstruction run needs, and exposes `reconstruct_view`/
//! `post_processing` so an orchestrator can divide work across views without
//! knowing anything about filtering or backprojection internals.

pub mod config;
pub mod fourier;
pub mod reconstructor;

pub use config::{FilterMethod, ReconstructConfig};
pub use fourier::fourier_reconstruct;
pub use reconstructor::Reconstructor;
