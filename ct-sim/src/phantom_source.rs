// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolves a command-line `--phantom` argument to a [`Phantom`]: a named built-in
//! phantom first, falling back to the phantom text format read from a file path (§6).

use ct_core::diagnostics::Diagnostics;
use ct_core::error::{decode_error, Result};
use ct_phantom::{builtins, text_format, Phantom};
use std::path::Path;

pub fn resolve(spec: &str, diagnostics: &mut Diagnostics) -> Result<Phantom> {
    if let Some(phantom) = builtins::builtin(spec, diagnostics) {
        return Ok(phantom);
    }

    let path = Path::new(spec);
    if !path.exists() {
        log::warn!("\"{}\" is neither a built-in phantom name nor an existing file", spec);
        return decode_error("unrecognised phantom name and no such file");
    }

    let text = std::fs::read_to_string(path)?;
    text_format::parse(&text, diagnostics)
}
