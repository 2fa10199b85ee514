// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-image` holds the rectangular image container shared by rasterized phantoms,
//! reconstructed slices, and filter-response tables: flat storage, pixel arithmetic,
//! bilinear resampling, 2D FFT analysis, the native image file format, and the
//! comparative statistics used to score a reconstruction against ground truth.

pub mod fft;
pub mod image;
pub mod io;
pub mod label;
pub mod pixel;

pub use image::{ComparativeStats, Image};
pub use label::Label;
pub use pixel::PixelFormat;
