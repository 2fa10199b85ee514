// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-projection` holds the sinogram container (§3, §4.3): per-view detector arrays
//! under a scan geometry, the native projection file format, and rebinning between
//! acquisition geometries.

pub mod geometry;
pub mod io;
pub mod projection;
pub mod rebin;

pub use geometry::Geometry;
pub use projection::{Projection, ProjectionHeader, ViewRecord};
