// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-phantom` models an analytic cross-sectional object as a set of geometric
//! primitives (§3, §4.4): ray/primitive line integrals for forward projection, and
//! column-parallel rasterization into a displayable [`ct_image::Image`].

pub mod builtins;
pub mod element;
pub mod phantom;
pub mod text_format;

pub use element::{ElementKind, PhantomElement};
pub use phantom::Phantom;
