// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The rectangular image container (§3, §4.2): flat column-major storage, pixel
//! arithmetic, bilinear resampling, 2D FFT analysis, and comparative statistics.

use crate::fft::{shuffle_from_centre, shuffle_to_centre, Fft1D};
use crate::label::Label;
use crate::pixel::PixelFormat;
use ct_core::error::{CtError, Result};
use ct_core::interp::{bilinear, Grid2D};
use num_complex::Complex64;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Storage {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

/// Comparative statistics between a reconstructed image and its ground-truth
/// rasterized phantom, per §4.2 / §8: normalized RMS distance `d`, normalized mean
/// absolute distance `r`, and the worst-case 2x2-block-averaged error `e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparativeStats {
    pub d: f64,
    pub r: f64,
    pub e: f64,
}

/// A rectangular raster of real or complex samples, addressed in column-major order
/// (`index = x * ny + y`), carrying physical pixel spacing and a history of labels
/// describing the operations that produced it (§3).
#[derive(Debug, Clone)]
pub struct Image {
    nx: usize,
    ny: usize,
    x_inc: f64,
    y_inc: f64,
    storage: Storage,
    labels: Vec<Label>,
}

impl Image {
    pub fn new_real(nx: usize, ny: usize, x_inc: f64, y_inc: f64) -> Self {
        Image {
            nx,
            ny,
            x_inc,
            y_inc,
            storage: Storage::Real(vec![0.0; nx * ny]),
            labels: Vec::new(),
        }
    }

    pub fn new_complex(nx: usize, ny: usize, x_inc: f64, y_inc: f64) -> Self {
        Image {
            nx,
            ny,
            x_inc,
            y_inc,
            storage: Storage::Complex(vec![Complex64::new(0.0, 0.0); nx * ny]),
            labels: Vec::new(),
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn x_inc(&self) -> f64 {
        self.x_inc
    }

    pub fn y_inc(&self) -> f64 {
        self.y_inc
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match &self.storage {
            Storage::Real(_) => PixelFormat::Real64,
            Storage::Complex(_) => PixelFormat::Complex,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn push_label(&mut self, text: impl Into<String>, elapsed: Duration) {
        self.labels.push(Label::new(text, elapsed));
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x * self.ny + y
    }

    /// Reallocates storage to the given dimensions, zero-filled, preserving the
    /// current real/complex format and pixel spacing (§4.2 "set_array_size").
    pub fn set_array_size(&mut self, nx: usize, ny: usize) {
        self.nx = nx;
        self.ny = ny;
        self.storage = match &self.storage {
            Storage::Real(_) => Storage::Real(vec![0.0; nx * ny]),
            Storage::Complex(_) => Storage::Complex(vec![Complex64::new(0.0, 0.0); nx * ny]),
        };
    }

    pub fn get_real(&self, x: usize, y: usize) -> f64 {
        match &self.storage {
            Storage::Real(v) => v[self.index(x, y)],
            Storage::Complex(v) => v[self.index(x, y)].re,
        }
    }

    pub fn set_real(&mut self, x: usize, y: usize, value: f64) {
        let idx = self.index(x, y);
        match &mut self.storage {
            Storage::Real(v) => v[idx] = value,
            Storage::Complex(v) => v[idx] = Complex64::new(value, 0.0),
        }
    }

    pub fn get_complex(&self, x: usize, y: usize) -> Complex64 {
        match &self.storage {
            Storage::Real(v) => Complex64::new(v[self.index(x, y)], 0.0),
            Storage::Complex(v) => v[self.index(x, y)],
        }
    }

    pub fn set_complex(&mut self, x: usize, y: usize, value: Complex64) {
        let idx = self.index(x, y);
        match &mut self.storage {
            Storage::Real(v) => v[idx] = value.re,
            Storage::Complex(v) => v[idx] = value,
        }
    }

    pub fn real_slice(&self) -> Option<&[f64]> {
        match &self.storage {
            Storage::Real(v) => Some(v),
            Storage::Complex(_) => None,
        }
    }

    pub fn complex_slice(&self) -> Option<&[Complex64]> {
        match &self.storage {
            Storage::Real(_) => None,
            Storage::Complex(v) => Some(v),
        }
    }

    pub fn convert_real_to_complex(&mut self) {
        if let Storage::Real(v) = &self.storage {
            let complex = v.iter().map(|&re| Complex64::new(re, 0.0)).collect();
            self.storage = Storage::Complex(complex);
        }
    }

    /// Discards the imaginary plane, keeping the real part of every sample.
    pub fn convert_complex_to_real(&mut self) {
        if let Storage::Complex(v) = &self.storage {
            let real = v.iter().map(|c| c.re).collect();
            self.storage = Storage::Real(real);
        }
    }

    fn check_same_shape(&self, other: &Image) -> Result<()> {
        if self.nx != other.nx || self.ny != other.ny {
            return Err(CtError::DimensionMismatch {
                expected: (self.nx, self.ny),
                found: (other.nx, other.ny),
            });
        }
        Ok(())
    }

    fn binary_op(
        &self,
        other: &Image,
        real_op: impl Fn(f64, f64) -> f64,
        complex_op: impl Fn(Complex64, Complex64) -> Complex64,
    ) -> Result<Image> {
        self.check_same_shape(other)?;
        let either_complex =
            self.pixel_format().is_complex() || other.pixel_format().is_complex();

        let mut result = if either_complex {
            let data: Vec<Complex64> = (0..self.nx * self.ny)
                .map(|i| {
                    let a = match &self.storage {
                        Storage::Real(v) => Complex64::new(v[i], 0.0),
                        Storage::Complex(v) => v[i],
                    };
                    let b = match &other.storage {
                        Storage::Real(v) => Complex64::new(v[i], 0.0),
                        Storage::Complex(v) => v[i],
                    };
                    complex_op(a, b)
                })
                .collect();
            Image {
                nx: self.nx,
                ny: self.ny,
                x_inc: self.x_inc,
                y_inc: self.y_inc,
                storage: Storage::Complex(data),
                labels: Vec::new(),
            }
        } else {
            let sa = self.real_slice().expect("checked not complex");
            let sb = other.real_slice().expect("checked not complex");
            let data: Vec<f64> =
                sa.iter().zip(sb.iter()).map(|(&a, &b)| real_op(a, b)).collect();
            Image {
                nx: self.nx,
                ny: self.ny,
                x_inc: self.x_inc,
                y_inc: self.y_inc,
                storage: Storage::Real(data),
                labels: Vec::new(),
            }
        };
        result.labels = self.labels.clone();
        Ok(result)
    }

    pub fn add(&self, other: &Image) -> Result<Image> {
        self.binary_op(other, |a, b| a + b, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Image) -> Result<Image> {
        self.binary_op(other, |a, b| a - b, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Image) -> Result<Image> {
        self.binary_op(other, |a, b| a * b, |a, b| a * b)
    }

    /// Pairwise division; a zero denominator yields zero rather than infinity or NaN,
    /// matching the original's saturating-division convention for display images.
    pub fn divide(&self, other: &Image) -> Result<Image> {
        self.binary_op(
            other,
            |a, b| if b == 0.0 { 0.0 } else { a / b },
            |a, b| if b == Complex64::new(0.0, 0.0) { Complex64::new(0.0, 0.0) } else { a / b },
        )
    }

    fn map_real(&mut self, f: impl Fn(f64) -> f64) {
        match &mut self.storage {
            Storage::Real(v) => v.iter_mut().for_each(|x| *x = f(*x)),
            Storage::Complex(v) => v.iter_mut().for_each(|c| *c = Complex64::new(f(c.re), f(c.im))),
        }
    }

    pub fn invert(&mut self) {
        match &mut self.storage {
            Storage::Real(v) => v.iter_mut().for_each(|x| *x = if *x == 0.0 { 0.0 } else { 1.0 / *x }),
            Storage::Complex(v) => v.iter_mut().for_each(|c| {
                if *c != Complex64::new(0.0, 0.0) {
                    *c = c.conj() / c.norm_sqr();
                }
            }),
        }
    }

    /// Takes the square root of every sample; a negative real sample promotes the
    /// whole image to complex storage rather than producing NaN (§4.2 "sqrt").
    pub fn sqrt(&mut self) {
        match &self.storage {
            Storage::Real(v) => {
                if v.iter().any(|&x| x < 0.0) {
                    let data: Vec<Complex64> =
                        v.iter().map(|&x| Complex64::new(x, 0.0).sqrt()).collect();
                    self.storage = Storage::Complex(data);
                } else {
                    self.map_real(f64::sqrt);
                }
            }
            Storage::Complex(v) => {
                let data: Vec<Complex64> = v.iter().map(|c| c.sqrt()).collect();
                self.storage = Storage::Complex(data);
            }
        }
    }

    /// Natural logarithm; non-positive real samples map to zero rather than `-inf`/NaN
    /// (§4.2 "log").
    pub fn log(&mut self) {
        match &mut self.storage {
            Storage::Real(v) => v.iter_mut().for_each(|x| *x = if *x > 0.0 { x.ln() } else { 0.0 }),
            Storage::Complex(v) => v.iter_mut().for_each(|c| *c = c.ln()),
        }
    }

    pub fn exp(&mut self) {
        match &mut self.storage {
            Storage::Real(v) => v.iter_mut().for_each(|x| *x = x.exp()),
            Storage::Complex(v) => v.iter_mut().for_each(|c| *c = c.exp()),
        }
    }

    pub fn square(&mut self) {
        match &mut self.storage {
            Storage::Real(v) => v.iter_mut().for_each(|x| *x = *x * *x),
            Storage::Complex(v) => v.iter_mut().for_each(|c| *c = *c * *c),
        }
    }

    /// Collapses a complex image to its magnitude, converting storage to real.
    pub fn magnitude(&mut self) {
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Real(v.iter().map(|c| c.norm()).collect());
        }
    }

    /// Collapses a complex image to its phase angle (radians), converting storage to
    /// real.
    pub fn phase(&mut self) {
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Real(v.iter().map(|c| c.arg()).collect());
        }
    }

    pub fn real_part(&mut self) {
        self.convert_complex_to_real();
    }

    pub fn imaginary_part(&mut self) {
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Real(v.iter().map(|c| c.im).collect());
        }
    }

    /// Resamples to a new grid size with bilinear interpolation over the unit square
    /// `[0, nx-1] x [0, ny-1]` (§4.2 "scale_to").
    pub fn scale_to(&self, nx: usize, ny: usize) -> Image {
        let mut out = Image::new_real(nx, ny, self.x_inc * self.nx as f64 / nx as f64, self.y_inc * self.ny as f64 / ny as f64);
        let src: Vec<f64> = match &self.storage {
            Storage::Real(v) => v.clone(),
            Storage::Complex(v) => v.iter().map(|c| c.re).collect(),
        };
        let grid = Grid2D::new(&src, self.nx, self.ny);
        for x in 0..nx {
            let fx = if nx > 1 { x as f64 * (self.nx - 1) as f64 / (nx - 1) as f64 } else { 0.0 };
            for y in 0..ny {
                let fy = if ny > 1 { y as f64 * (self.ny - 1) as f64 / (ny - 1) as f64 } else { 0.0 };
                out.set_real(x, y, bilinear(&grid, fx, fy));
            }
        }
        out
    }

    fn fft_axis(&mut self, forward: bool, along_x: bool) {
        self.convert_real_to_complex();
        let (outer, inner) = (self.nx, self.ny);
        let plan = if forward { Fft1D::forward(if along_x { outer } else { inner }) } else { Fft1D::inverse(if along_x { outer } else { inner }) };
        let data = match &mut self.storage {
            Storage::Complex(v) => v,
            Storage::Real(_) => unreachable!("converted above"),
        };
        if along_x {
            let mut col = vec![Complex64::new(0.0, 0.0); outer];
            for y in 0..inner {
                for x in 0..outer {
                    col[x] = data[x * inner + y];
                }
                plan.process(&mut col);
                for x in 0..outer {
                    data[x * inner + y] = col[x];
                }
            }
        } else {
            for x in 0..outer {
                let row = &mut data[x * inner..(x + 1) * inner];
                plan.process(row);
            }
        }
        if !forward {
            let n = if along_x { outer } else { inner } as f64;
            data.iter_mut().for_each(|c| *c /= n);
        }
    }

    /// Forward 2D FFT with quadrant shuffling so DC lands at the image centre (§4.2).
    pub fn fft2d(&mut self) {
        self.convert_real_to_complex();
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Complex(shuffle_to_centre(v, self.nx, self.ny));
        }
        self.fft_axis(true, false);
        self.fft_axis(true, true);
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Complex(shuffle_to_centre(v, self.nx, self.ny));
        }
    }

    /// Inverse 2D FFT, undoing the shuffle performed by [`Image::fft2d`].
    pub fn ifft2d(&mut self) {
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Complex(shuffle_from_centre(v, self.nx, self.ny));
        }
        self.fft_axis(false, false);
        self.fft_axis(false, true);
        if let Storage::Complex(v) = &self.storage {
            self.storage = Storage::Complex(shuffle_from_centre(v, self.nx, self.ny));
        }
    }

    pub fn fft_rows(&mut self) {
        self.fft_axis(true, false);
    }

    pub fn ifft_rows(&mut self) {
        self.fft_axis(false, false);
    }

    pub fn fft_cols(&mut self) {
        self.fft_axis(true, true);
    }

    pub fn ifft_cols(&mut self) {
        self.fft_axis(false, true);
    }

    /// Builds an image whose pixel values are `f` applied to the radial distance of
    /// each pixel from the image centre, used to materialize a frequency-domain filter
    /// response as a displayable/multipliable image (§4.2 "table" filter application).
    pub fn from_radial_fn(nx: usize, ny: usize, x_inc: f64, y_inc: f64, f: impl Fn(f64) -> f64) -> Image {
        let mut img = Image::new_real(nx, ny, x_inc, y_inc);
        let cx = ct_core::units::centre_index(nx);
        let cy = ct_core::units::centre_index(ny);
        for x in 0..nx {
            let dx = x as f64 - cx;
            for y in 0..ny {
                let dy = y as f64 - cy;
                let r = (dx * dx + dy * dy).sqrt();
                img.set_real(x, y, f(r));
            }
        }
        img
    }

    /// Computes the normalized RMS distance `d`, normalized mean absolute distance
    /// `r`, and worst-case 2x2-block-averaged error `e` between `self` (taken as the
    /// reconstruction under test) and `reference` (the ground truth), per §4.2/§8.
    pub fn comparative_statistics(&self, reference: &Image) -> Result<ComparativeStats> {
        self.check_same_shape(reference)?;
        let a = self.real_slice().ok_or_else(|| {
            CtError::Unsupported("comparative statistics require real-valued images")
        })?;
        let b = reference.real_slice().ok_or_else(|| {
            CtError::Unsupported("comparative statistics require real-valued images")
        })?;

        let n = a.len() as f64;
        let mean_ref: f64 = b.iter().sum::<f64>() / n;

        let mut sq_error_sum = 0.0;
        let mut sq_diff_from_mean_sum = 0.0;
        let mut abs_error_sum = 0.0;
        let mut abs_value_sum = 0.0;
        for (&av, &bv) in a.iter().zip(b.iter()) {
            let err = av - bv;
            sq_error_sum += err * err;
            sq_diff_from_mean_sum += (bv - mean_ref) * (bv - mean_ref);
            abs_error_sum += err.abs();
            abs_value_sum += bv.abs();
        }

        let d = if sq_diff_from_mean_sum > 0.0 {
            (sq_error_sum / sq_diff_from_mean_sum).sqrt()
        } else {
            0.0
        };
        let r = if abs_value_sum > 0.0 { abs_error_sum / abs_value_sum } else { 0.0 };

        let mut e: f64 = 0.0;
        let (nx, ny) = (self.nx, self.ny);
        let mut x = 0;
        while x + 1 < nx {
            let mut y = 0;
            while y + 1 < ny {
                let avg_a = (self.get_real(x, y)
                    + self.get_real(x + 1, y)
                    + self.get_real(x, y + 1)
                    + self.get_real(x + 1, y + 1))
                    / 4.0;
                let avg_b = (reference.get_real(x, y)
                    + reference.get_real(x + 1, y)
                    + reference.get_real(x, y + 1)
                    + reference.get_real(x + 1, y + 1))
                    / 4.0;
                e = e.max((avg_a - avg_b).abs());
                y += 2;
            }
            x += 2;
        }

        Ok(ComparativeStats { d, r, e })
    }
}

/// Times an image-producing operation and attaches the elapsed wall-clock time as a
/// label, mirroring the original's per-step timing labels (§3).
pub fn timed_label(image: &mut Image, text: impl Into<String>, start: Instant) {
    image.push_label(text, start.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_array_size_zero_fills_and_preserves_format() {
        let mut img = Image::new_complex(2, 2, 1.0, 1.0);
        img.set_complex(0, 0, Complex64::new(3.0, 4.0));
        img.set_array_size(4, 4);
        assert_eq!(img.nx(), 4);
        assert!(img.pixel_format().is_complex());
        assert_eq!(img.get_complex(0, 0), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn add_promotes_to_complex_when_either_operand_is() {
        let mut a = Image::new_real(2, 2, 1.0, 1.0);
        a.set_real(0, 0, 1.0);
        let mut b = Image::new_complex(2, 2, 1.0, 1.0);
        b.set_complex(0, 0, Complex64::new(0.0, 2.0));
        let sum = a.add(&b).unwrap();
        assert!(sum.pixel_format().is_complex());
        assert_eq!(sum.get_complex(0, 0), Complex64::new(1.0, 2.0));
    }

    #[test]
    fn divide_by_zero_yields_zero() {
        let mut a = Image::new_real(1, 1, 1.0, 1.0);
        a.set_real(0, 0, 5.0);
        let b = Image::new_real(1, 1, 1.0, 1.0);
        let result = a.divide(&b).unwrap();
        assert_eq!(result.get_real(0, 0), 0.0);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let a = Image::new_real(2, 2, 1.0, 1.0);
        let b = Image::new_real(3, 3, 1.0, 1.0);
        assert!(matches!(a.add(&b), Err(CtError::DimensionMismatch { .. })));
    }

    #[test]
    fn sqrt_of_negative_promotes_to_complex() {
        let mut img = Image::new_real(1, 1, 1.0, 1.0);
        img.set_real(0, 0, -4.0);
        img.sqrt();
        assert!(img.pixel_format().is_complex());
        let v = img.get_complex(0, 0);
        assert!((v.norm() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn log_of_non_positive_is_zero() {
        let mut img = Image::new_real(1, 1, 1.0, 1.0);
        img.set_real(0, 0, 0.0);
        img.log();
        assert_eq!(img.get_real(0, 0), 0.0);
    }

    #[test]
    fn fft2d_round_trip_reproduces_input() {
        let mut img = Image::new_real(4, 4, 1.0, 1.0);
        for x in 0..4 {
            for y in 0..4 {
                img.set_real(x, y, (x + y) as f64);
            }
        }
        let original = img.clone();
        img.fft2d();
        img.ifft2d();
        let restored = img.real_slice_or_magnitude();
        let orig = original.real_slice().unwrap();
        for (a, b) in restored.iter().zip(orig.iter()) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn comparative_statistics_of_identical_images_is_zero() {
        let mut img = Image::new_real(4, 4, 1.0, 1.0);
        for i in 0..16 {
            img.set_real(i / 4, i % 4, i as f64);
        }
        let stats = img.comparative_statistics(&img).unwrap();
        assert_eq!(stats.d, 0.0);
        assert_eq!(stats.r, 0.0);
        assert_eq!(stats.e, 0.0);
    }

    #[test]
    fn scale_to_preserves_corner_values() {
        let mut img = Image::new_real(2, 2, 1.0, 1.0);
        img.set_real(0, 0, 10.0);
        img.set_real(1, 1, 20.0);
        let scaled = img.scale_to(4, 4);
        assert!((scaled.get_real(0, 0) - 10.0).abs() < 1e-9);
        assert!((scaled.get_real(3, 3) - 20.0).abs() < 1e-9);
    }
}

impl Image {
    /// Test/debug helper: magnitude for complex storage, the value itself for real.
    #[cfg(test)]
    fn real_slice_or_magnitude(&self) -> Vec<f64> {
        match &self.storage {
            Storage::Real(v) => v.clone(),
            Storage::Complex(v) => v.iter().map(|c| c.norm()).collect(),
        }
    }
}
