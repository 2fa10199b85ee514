// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ct-scanner` simulates a scan acquisition (§3, §4.5): given a phantom and a
//! [`ScannerConfig`], it generates view angles and detector-ray endpoints for the
//! configured geometry and fills a [`ct_projection::Projection`] by calling into the
//! phantom's forward line integrator.

pub mod config;
pub mod scanner;

pub use config::ScannerConfig;
pub use scanner::Scanner;
