// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-core` holds the primitives shared by every crate in the CT simulator
//! workspace: the common error type, byte-order stream I/O, the 2D homogeneous
//! transform and line clippers, and the stateless interpolators used throughout
//! rasterization, signal processing, and backprojection.

pub mod clip;
pub mod diagnostics;
pub mod error;
pub mod interp;
pub mod io;
pub mod transform;
pub mod units;

pub use error::{CtError, Result};
