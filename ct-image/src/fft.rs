// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fourier-domain support for [`crate::Image`]: the centred-spectrum quadrant shuffle
//! and a thin wrapper around a third-party FFT library so its plan type never leaks
//! into callers (Design Note "FFT").

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::sync::Arc;

/// A forward or inverse complex 1D FFT of a fixed size, built once and reused across
/// rows/columns. Wraps `rustfft`'s plan without exposing its type to callers.
pub struct Fft1D {
    plan: Arc<dyn rustfft::Fft<f64>>,
}

impl Fft1D {
    pub fn forward(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Fft1D { plan: planner.plan_fft_forward(len) }
    }

    pub fn inverse(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Fft1D { plan: planner.plan_fft_inverse(len) }
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    /// Executes the plan in place. Forward transforms are unnormalized (matching the
    /// classic Cooley-Tukey convention); callers wanting an orthonormal round trip
    /// divide by `len()` after the inverse transform (see `Image::fft2d`).
    pub fn process(&self, buf: &mut [Complex64]) {
        self.plan.process(buf);
    }
}

/// Cyclically shifts a `nx`-by-`ny` column-major grid so that the sample at the origin
/// (index `(0, 0)`) is relocated to the geometric centre of the grid: `shuffle_to_centre`
/// performs the "shuffle natural order to Fourier order" step run before a forward
/// transform, and `shuffle_from_centre` performs its inverse, run after an inverse
/// transform, so that DC ends up back at the origin (§4.2). The two agree for even
/// dimensions; for odd dimensions the shift amount differs by one sample, matching the
/// conventional `fftshift`/`ifftshift` asymmetry.
pub fn shuffle_to_centre(data: &[Complex64], nx: usize, ny: usize) -> Vec<Complex64> {
    cyclic_shift(data, nx, ny, nx / 2, ny / 2)
}

pub fn shuffle_from_centre(data: &[Complex64], nx: usize, ny: usize) -> Vec<Complex64> {
    cyclic_shift(data, nx, ny, (nx + 1) / 2, (ny + 1) / 2)
}

fn cyclic_shift(
    data: &[Complex64],
    nx: usize,
    ny: usize,
    sx: usize,
    sy: usize,
) -> Vec<Complex64> {
    assert_eq!(data.len(), nx * ny);
    let mut out = vec![Complex64::new(0.0, 0.0); data.len()];
    for x in 0..nx {
        let dx = (x + sx) % nx;
        for y in 0..ny {
            let dy = (y + sy) % ny;
            out[dx * ny + dy] = data[x * ny + y];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_round_trip_reproduces_input() {
        let n = 8;
        let input: Vec<Complex64> =
            (0..n).map(|i| Complex64::new(i as f64, -(i as f64))).collect();

        let fwd = Fft1D::forward(n);
        let inv = Fft1D::inverse(n);

        let mut buf = input.clone();
        fwd.process(&mut buf);
        inv.process(&mut buf);
        for v in buf.iter_mut() {
            *v /= n as f64;
        }

        for (a, b) in input.iter().zip(buf.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn shuffle_round_trips_even_grid() {
        let nx = 4;
        let ny = 4;
        let input: Vec<Complex64> =
            (0..(nx * ny)).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let shifted = shuffle_to_centre(&input, nx, ny);
        let restored = shuffle_from_centre(&shifted, nx, ny);
        assert_eq!(input, restored);
    }

    #[test]
    fn shuffle_round_trips_odd_grid() {
        let nx = 5;
        let ny = 3;
        let input: Vec<Complex64> =
            (0..(nx * ny)).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let shifted = shuffle_to_centre(&input, nx, ny);
        let restored = shuffle_from_centre(&shifted, nx, ny);
        assert_eq!(input, restored);
    }

    #[test]
    fn origin_moves_to_centre() {
        let nx = 4;
        let ny = 4;
        let mut input = vec![Complex64::new(0.0, 0.0); nx * ny];
        input[0] = Complex64::new(1.0, 0.0);
        let shifted = shuffle_to_centre(&input, nx, ny);
        let centre = (nx / 2) * ny + ny / 2;
        assert_eq!(shifted[centre], Complex64::new(1.0, 0.0));
    }
}
