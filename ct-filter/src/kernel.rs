// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Realises a [`Filter`] as a usable kernel for one of the three filtering methods
//! (§4.6): spatial convolution, frequency multiplication, or table-cached DFT.

use crate::filter::Filter;
use ct_image::fft::Fft1D;
use ct_projection::Geometry;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Which of the three filtering strategies a [`FilterKernel`] was built for (§4.6
/// "Modes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMethod {
    Convolution,
    Frequency,
    Table,
}

/// A realised filter kernel, ready to drive one of the three filtering methods
/// (§4.6). `Convolution` holds a spatial kernel sampled around zero; `Frequency` and
/// `Table` hold a frequency-order sample array of length `nFilter` (a power of two).
#[derive(Debug, Clone)]
pub enum FilterKernel {
    Convolution { samples: Vec<f64>, det_inc: f64 },
    Frequency { samples: Vec<f64> },
    Table { samples: Vec<f64>, cos_table: Vec<f64>, sin_table: Vec<f64> },
}

fn geometry_scale(geometry: Geometry, k_offset: f64, det_inc: f64) -> f64 {
    match geometry {
        Geometry::Equilinear => 0.5,
        Geometry::Equiangular => {
            let x = k_offset * det_inc;
            let s = sinc(x);
            0.5 / (s * s)
        }
        Geometry::Parallel | Geometry::Invalid => 1.0,
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        x.sin() / x
    }
}

pub fn zeropad_to_power_of_two(n: usize) -> usize {
    let mut p = 1usize;
    while p < n {
        p <<= 1;
    }
    p
}

impl FilterKernel {
    /// Builds the spatial kernel sampled at `2*(nDet-1)+1` points around zero, scaled
    /// by the geometry-dependent factor (§4.6 "Convolution filtering"). If `filter`'s
    /// kind has no closed-form spatial response, derives one through an inverse FFT of
    /// its frequency response (Design Note "Filter kernels").
    pub fn build_convolution(filter: &Filter, n_det: usize, det_inc: f64, geometry: Geometry) -> Self {
        let half = (n_det - 1) as i64;
        let mut samples = if filter.kind().has_closed_form_spatial() {
            (-half..=half)
                .map(|n| filter.spatial(n as f64 * det_inc))
                .collect::<Vec<_>>()
        } else {
            spatial_from_frequency(filter, 2 * n_det as usize, det_inc)
        };

        for (i, s) in samples.iter_mut().enumerate() {
            let k_offset = i as f64 - half as f64;
            *s *= geometry_scale(geometry, k_offset, det_inc);
        }

        FilterKernel::Convolution { samples, det_inc }
    }

    /// Builds the frequency-order kernel sampled at `nFilter =
    /// zeropad_to_power_of_two(nDet)` points, DC at index 0 (§4.6 "Frequency
    /// filtering").
    pub fn build_frequency(filter: &Filter, n_det: usize, det_inc: f64, geometry: Geometry) -> Self {
        let n_filter = zeropad_to_power_of_two(n_det);
        let samples = frequency_samples(filter, n_filter, det_inc, geometry);
        FilterKernel::Frequency { samples }
    }

    /// As [`FilterKernel::build_frequency`], additionally caching `cos`/`sin` tables
    /// for the DFT size so a table-mode transform avoids trig in its inner loop (§4.6
    /// "Table mode").
    pub fn build_table(filter: &Filter, n_det: usize, det_inc: f64, geometry: Geometry) -> Self {
        let n_filter = zeropad_to_power_of_two(n_det);
        let samples = frequency_samples(filter, n_filter, det_inc, geometry);
        let mut cos_table = Vec::with_capacity(n_filter);
        let mut sin_table = Vec::with_capacity(n_filter);
        for k in 0..n_filter {
            let angle = -2.0 * PI * k as f64 / n_filter as f64;
            cos_table.push(angle.cos());
            sin_table.push(angle.sin());
        }
        FilterKernel::Table { samples, cos_table, sin_table }
    }

    pub fn samples(&self) -> &[f64] {
        match self {
            FilterKernel::Convolution { samples, .. } => samples,
            FilterKernel::Frequency { samples } => samples,
            FilterKernel::Table { samples, .. } => samples,
        }
    }
}

/// Samples the closed-form frequency response onto `n_filter` points in Fourier
/// order (`f=0` at index 0, folding to negative frequencies past the Nyquist index),
/// deriving it from the spatial response through a forward FFT if no closed form
/// exists.
fn frequency_samples(filter: &Filter, n_filter: usize, det_inc: f64, geometry: Geometry) -> Vec<f64> {
    let mut samples = if filter.frequency(0.0).is_some() {
        (0..n_filter)
            .map(|i| {
                let idx = fold_index(i, n_filter);
                let f = idx as f64 / (n_filter as f64 * det_inc);
                filter.frequency(f).unwrap_or(0.0)
            })
            .collect::<Vec<_>>()
    } else {
        frequency_from_spatial(filter, n_filter, det_inc)
    };

    for (i, s) in samples.iter_mut().enumerate() {
        let idx = fold_index(i, n_filter) as f64;
        *s *= geometry_scale(geometry, idx, det_inc);
    }
    samples
}

fn fold_index(i: usize, n: usize) -> i64 {
    if i <= n / 2 {
        i as i64
    } else {
        i as i64 - n as i64
    }
}

fn spatial_from_frequency(filter: &Filter, n_filter: usize, det_inc: f64) -> Vec<f64> {
    let freq_samples = frequency_samples_raw(filter, n_filter, det_inc);
    let mut buf: Vec<Complex64> = freq_samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    let inv = Fft1D::inverse(n_filter);
    inv.process(&mut buf);

    let half = n_filter / 2;
    (0..n_filter)
        .map(|i| {
            let shifted = (i + half) % n_filter;
            buf[shifted].re / n_filter as f64
        })
        .collect()
}

fn frequency_from_spatial(filter: &Filter, n_filter: usize, det_inc: f64) -> Vec<f64> {
    let half = (n_filter / 2) as i64;
    let spatial: Vec<Complex64> = (0..n_filter)
        .map(|i| {
            let n = i as i64 - half;
            Complex64::new(filter.spatial(n as f64 * det_inc), 0.0)
        })
        .collect();
    let mut buf = spatial;
    let half_shift = n_filter / 2;
    let mut natural = vec![Complex64::new(0.0, 0.0); n_filter];
    for (i, v) in buf.drain(..).enumerate() {
        natural[(i + half_shift) % n_filter] = v;
    }
    let fwd = Fft1D::forward(n_filter);
    fwd.process(&mut natural);
    natural.iter().map(|c| c.re).collect()
}

fn frequency_samples_raw(filter: &Filter, n_filter: usize, det_inc: f64) -> Vec<f64> {
    (0..n_filter)
        .map(|i| {
            let idx = fold_index(i, n_filter);
            let f = idx as f64 / (n_filter as f64 * det_inc);
            filter.frequency(f).unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Domain;
    use crate::kind::FilterKind;

    #[test]
    fn zeropad_rounds_up_to_power_of_two() {
        assert_eq!(zeropad_to_power_of_two(257), 512);
        assert_eq!(zeropad_to_power_of_two(256), 256);
        assert_eq!(zeropad_to_power_of_two(1), 1);
    }

    #[test]
    fn convolution_kernel_has_expected_length() {
        let filter = Filter::new(FilterKind::Bandlimit, Domain::Spatial, 0.5);
        let kernel = FilterKernel::build_convolution(&filter, 17, 1.0, Geometry::Parallel);
        assert_eq!(kernel.samples().len(), 2 * 17 + 1);
    }

    #[test]
    fn table_mode_trig_tables_match_dft_size() {
        let filter = Filter::new(FilterKind::Bandlimit, Domain::Frequency, 0.5);
        let kernel = FilterKernel::build_table(&filter, 100, 1.0, Geometry::Parallel);
        if let FilterKernel::Table { cos_table, sin_table, samples } = kernel {
            assert_eq!(cos_table.len(), 128);
            assert_eq!(sin_table.len(), 128);
            assert_eq!(samples.len(), 128);
        } else {
            panic!("expected table kernel");
        }
    }

    #[test]
    fn spatial_and_frequency_round_trip_within_tolerance() {
        let filter = Filter::new(FilterKind::Bandlimit, Domain::Spatial, 0.5);
        let n_filter = 256;
        let det_inc = 1.0;

        let spatial: Vec<f64> =
            (0..n_filter).map(|i| filter.spatial((i as i64 - n_filter as i64 / 2) as f64 * det_inc)).collect();
        let dc_from_spatial: f64 = spatial.iter().sum::<f64>() * det_inc;

        let freq = frequency_samples(&filter, n_filter, det_inc, Geometry::Parallel);
        let dc_from_frequency = freq[0];

        assert!((dc_from_spatial - dc_from_frequency).abs() < 1e-6);
    }
}
