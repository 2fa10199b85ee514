// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Filter application (§4.7): spatial convolution against a [`FilterKernel`], or
//! frequency multiplication with optional pre-interpolation upsampling.

use ct_filter::kernel::zeropad_to_power_of_two;
use ct_filter::FilterKernel;
use ct_image::fft::Fft1D;
use num_complex::Complex64;

/// Direct spatial convolution: `output[n] = sum_i input[i] * kernel[n - i + (nDet -
/// 1)] * detInc` (§4.7). `O(nDet^2)` per view, allocation-free apart from the output.
pub fn convolve(input: &[f64], kernel_samples: &[f64], det_inc: f64) -> Vec<f64> {
    let n_det = input.len();
    let offset = n_det as i64 - 1;
    let mut output = vec![0.0; n_det];
    for n in 0..n_det {
        let mut sum = 0.0;
        for (i, &value) in input.iter().enumerate() {
            let idx = n as i64 - i as i64 + offset;
            sum += value * kernel_samples[idx as usize];
        }
        output[n] = sum * det_inc;
    }
    output
}

/// Frequency-domain filtering: zero-pads `input` to the kernel's `nFilter`, forward
/// transforms, multiplies pointwise by the real frequency kernel, inverse transforms,
/// and returns the first `nDet * preInterpFactor` samples (§4.7 "Frequency
/// multiplication"). `preInterpFactor > 1` upsamples by zero-padding the spectrum
/// before the inverse transform, so backprojection can use a denser detector grid.
pub fn process_frequency(input: &[f64], kernel_samples: &[f64], pre_interp_factor: usize) -> Vec<f64> {
    let n_det = input.len();
    let n_filter = kernel_samples.len();

    let mut buf = vec![Complex64::new(0.0, 0.0); n_filter];
    for (i, &value) in input.iter().enumerate().take(n_filter) {
        buf[i] = Complex64::new(value, 0.0);
    }

    let fwd = Fft1D::forward(n_filter);
    fwd.process(&mut buf);
    for (b, &k) in buf.iter_mut().zip(kernel_samples) {
        *b *= k;
    }

    let p = pre_interp_factor.max(1);
    if p == 1 {
        let inv = Fft1D::inverse(n_filter);
        inv.process(&mut buf);
        return buf.iter().take(n_det).map(|c| c.re / n_filter as f64).collect();
    }

    let upsampled_n = zeropad_to_power_of_two(n_filter * p);
    let mut up = vec![Complex64::new(0.0, 0.0); upsampled_n];
    let half = n_filter / 2;
    let scale = upsampled_n as f64 / n_filter as f64;
    for i in 0..=half {
        up[i] = buf[i] * scale;
    }
    for i in (half + 1)..n_filter {
        let shift = i as i64 - n_filter as i64;
        let dst = (upsampled_n as i64 + shift) as usize;
        up[dst] = buf[i] * scale;
    }

    let inv = Fft1D::inverse(upsampled_n);
    inv.process(&mut up);
    let take = (n_det * p).min(upsampled_n);
    up.iter().take(take).map(|c| c.re / upsampled_n as f64).collect()
}

/// Dispatches to [`convolve`] or [`process_frequency`] depending on which method the
/// kernel was built for.
pub fn apply_filter(kernel: &FilterKernel, input: &[f64], pre_interp_factor: usize) -> Vec<f64> {
    match kernel {
        FilterKernel::Convolution { samples, det_inc } => convolve(input, samples, *det_inc),
        FilterKernel::Frequency { samples } | FilterKernel::Table { samples, .. } => {
            process_frequency(input, samples, pre_interp_factor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convolution_with_identity_kernel_selects_centre_sample() {
        let n_det = 4;
        let mut kernel = vec![0.0; 2 * n_det - 1];
        kernel[n_det - 1] = 1.0;
        let input = vec![1.0, 2.0, 3.0, 4.0];
        let output = convolve(&input, &kernel, 1.0);
        assert_eq!(output, input);
    }

    #[test]
    fn frequency_filtering_preserves_length_without_preinterp() {
        let input = vec![1.0, 0.0, 0.0, 0.0];
        let kernel = vec![1.0; 4];
        let output = process_frequency(&input, &kernel, 1);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn preinterp_factor_upsamples_output_length() {
        let input = vec![1.0, 0.0, 0.0, 0.0];
        let kernel = vec![1.0; 4];
        let output = process_frequency(&input, &kernel, 2);
        assert_eq!(output.len(), 8);
    }
}
