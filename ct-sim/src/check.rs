// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A QA tool comparing a reconstructed image against its ground-truth rasterized
//! phantom via [`ct_image::Image::comparative_statistics`] (§4.2, §8 scenario 4).

use ct_core::error::Result;
use ct_image::io::read_image;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct CheckResult {
    pub d: f64,
    pub r: f64,
    pub e: f64,
    pub passed: bool,
}

/// Reads `target_path` and `reference_path`, computes the §4.2 comparative
/// statistics, and reports pass/fail against `max_d` (§8 scenario 4 uses `0.08` for a
/// full Shepp-Logan reconstruction).
pub fn run(target_path: &Path, reference_path: &Path, max_d: f64) -> Result<CheckResult> {
    let target = read_image(&mut BufReader::new(File::open(target_path)?))?;
    let reference = read_image(&mut BufReader::new(File::open(reference_path)?))?;

    let stats = target.comparative_statistics(&reference)?;
    let passed = stats.d <= max_d;

    println!(
        "d={:.6} r={:.6} e={:.6} (threshold d<={:.6}) -> {}",
        stats.d,
        stats.r,
        stats.e,
        max_d,
        if passed { "PASS" } else { "FAIL" }
    );

    Ok(CheckResult { d: stats.d, r: stats.r, e: stats.e, passed })
}
