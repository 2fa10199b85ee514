// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-backproject` accumulates filtered projection rows into an image (§4.8): four
//! algorithmic variants for parallel geometry (trig, table, difference, integer
//! difference) and one strategy each for the equilinear and equiangular fan-beam
//! geometries, behind a single [`Backprojector`] contract.

pub mod backprojector;
pub mod config;
pub mod interp;
pub mod roi;
pub mod strategy;

pub use backprojector::{Backprojector, StrategyKind};
pub use config::BackprojectConfig;
pub use interp::InterpMode;
pub use roi::Roi;
pub use strategy::Strategy;
