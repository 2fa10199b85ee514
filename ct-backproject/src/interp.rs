// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interpolation mode selection for sampling a filtered detector row at a real-valued
//! index (§4.8 "Interpolation modes"). An enum dispatch rather than virtual calls,
//! since the inner loop is the hottest region in the program (Design Note
//! "Interpolator selection").

use ct_core::interp::{cubic_polynomial, linear, nearest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpMode {
    Nearest,
    Linear,
    Cubic,
}

impl InterpMode {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "nearest" => InterpMode::Nearest,
            "linear" => InterpMode::Linear,
            "cubic" => InterpMode::Cubic,
            _ => return None,
        })
    }

    /// Samples `values` at real-valued index `idx`; out-of-bounds queries return
    /// `0.0` (§4.8 "Out-of-bounds samples contribute zero").
    pub fn sample(self, values: &[f64], idx: f64) -> f64 {
        match self {
            InterpMode::Nearest => nearest(values, idx),
            InterpMode::Linear => linear(values, idx, true),
            InterpMode::Cubic => cubic_polynomial(values, idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_index_contributes_zero() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(InterpMode::Nearest.sample(&values, 10.0), 0.0);
        assert_eq!(InterpMode::Linear.sample(&values, -10.0), 0.0);
        assert_eq!(InterpMode::Cubic.sample(&values, 10.0), 0.0);
    }

    #[test]
    fn resolves_known_names() {
        assert_eq!(InterpMode::from_name("Linear"), Some(InterpMode::Linear));
        assert_eq!(InterpMode::from_name("bogus"), None);
    }
}
