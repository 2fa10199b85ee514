// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The pixel-format tag that governs how an [`crate::Image`]'s storage is interpreted
//! (§3 "Invariants: storage always matches the pixel-format tag").

/// Which numeric representation an [`crate::Image`]'s samples are stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single-precision real samples, used only for on-disk storage (§6); in memory an
    /// `Image` always widens to `f64`.
    Real32,
    /// Double-precision real samples.
    Real64,
    /// Complex samples, real and imaginary planes both `f64`.
    Complex,
}

impl PixelFormat {
    pub fn is_complex(self) -> bool {
        matches!(self, PixelFormat::Complex)
    }
}
