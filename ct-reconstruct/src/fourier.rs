// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Direct Fourier (central-slice) reconstruction (§2 "Fourier path: Projections →
//! polar-resample → FFT per view → inverse 2D FFT → Image"). By the central-slice
//! theorem, the 1D FFT of a parallel-beam view taken at angle `theta` equals the
//! radial slice of the image's 2D FFT through the origin at that same angle. This
//! module FFTs every view, resamples the resulting polar grid of slices onto a
//! Cartesian frequency grid with [`bilinear_polar`], and inverse-FFTs the result.

use ct_core::error::{construction_error, Result};
use ct_core::interp::{bilinear_polar, Grid2D};
use ct_image::fft::Fft1D;
use ct_image::Image;
use ct_projection::rebin::rebin_to_parallel;
use ct_projection::Projection;
use num_complex::Complex64;
use std::f64::consts::PI;

fn rotate(buf: &[Complex64], shift: usize) -> Vec<Complex64> {
    let n = buf.len();
    let mut out = vec![Complex64::new(0.0, 0.0); n];
    for (i, value) in buf.iter().enumerate() {
        out[(i + shift) % n] = *value;
    }
    out
}

/// FFTs a single view's detector samples, rotating before and after the transform so
/// the zero frequency lands at the middle bin (the 1D analogue of
/// [`ct_image::Image::fft2d`]'s quadrant shuffle).
fn centred_fft(samples: &[f64]) -> Vec<Complex64> {
    let n = samples.len();
    let buf: Vec<Complex64> = samples.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    let mut shifted = rotate(&buf, n / 2);
    Fft1D::forward(n).process(&mut shifted);
    rotate(&shifted, n / 2)
}

/// Reconstructs an `nx`-by-`ny` image from `projection` via the central-slice
/// theorem. Divergent-beam acquisitions are rebinned to parallel geometry first
/// (§4.3), since the theorem applies directly only to parallel-beam views.
pub fn fourier_reconstruct(projection: &Projection, nx: usize, ny: usize) -> Result<Image> {
    if nx == 0 || ny == 0 {
        return construction_error("fourier reconstruction requires a non-empty output grid");
    }

    let rebinned;
    let proj = if projection.header.geometry.is_divergent() {
        rebinned = rebin_to_parallel(projection)?;
        &rebinned
    } else {
        projection
    };

    let n_view = proj.n_view();
    let n_det = proj.n_det();
    if n_view == 0 || n_det == 0 {
        return construction_error("fourier reconstruction requires at least one view and detector");
    }

    // One centred radial slice per view, laid out as an (angle, position) polar grid.
    let mut polar_real = vec![0.0; n_view * n_det];
    let mut polar_imag = vec![0.0; n_view * n_det];
    for v in 0..n_view {
        let slice = centred_fft(&proj.view(v).det_values);
        for (k, sample) in slice.into_iter().enumerate() {
            polar_real[v * n_det + k] = sample.re;
            polar_imag[v * n_det + k] = sample.im;
        }
    }
    let real_grid = Grid2D::new(&polar_real, n_view, n_det);
    let imag_grid = Grid2D::new(&polar_imag, n_view, n_det);

    let det_inc = proj.header.det_inc;
    let rot_inc = PI / n_view as f64;
    let centre_pos = n_det as f64 / 2.0;
    let radius = (n_det as f64 - 1.0) * det_inc / 2.0;
    let x_inc = 2.0 * radius / nx as f64;
    let y_inc = 2.0 * radius / ny as f64;

    let mut output = Image::new_complex(nx, ny, x_inc, y_inc);
    let cx = nx as f64 / 2.0;
    let cy = ny as f64 / 2.0;
    for i in 0..nx {
        let kx = (i as f64 - cx) * (n_det as f64 / nx as f64);
        for j in 0..ny {
            let ky = (j as f64 - cy) * (n_det as f64 / ny as f64);
            let mut r = (kx * kx + ky * ky).sqrt();

            // Each view's slice spans only the half-plane `[0, PI)`; the conjugate
            // half is the same slice with the radial axis mirrored, which is exactly
            // the wraparound `bilinear_polar` already performs at its domain edges.
            let mut angle = ky.atan2(kx);
            if angle < 0.0 {
                angle += 2.0 * PI;
            }
            if angle >= PI {
                angle -= PI;
                r = -r;
            }

            let angle_idx = angle / rot_inc;
            let pos_idx = r + centre_pos;
            let re = bilinear_polar(&real_grid, angle_idx, pos_idx);
            let im = bilinear_polar(&imag_grid, angle_idx, pos_idx);
            output.set_complex(i, j, Complex64::new(re, im));
        }
    }

    output.ifft2d();
    output.real_part();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_projection::{Geometry, ProjectionHeader};

    fn uniform_disc_projection(n_view: usize, n_det: usize) -> Projection {
        let mut header = ProjectionHeader::new(Geometry::Parallel);
        header.det_inc = 1.0;
        header.rot_inc = PI / n_view as f64;
        let mut proj = Projection::new(header, n_view, n_det);
        for v in 0..n_view {
            proj.view_mut(v).view_angle = v as f64 * PI / n_view as f64;
            for k in 0..n_det {
                proj.view_mut(v).det_values[k] = 1.0;
            }
        }
        proj
    }

    #[test]
    fn fourier_reconstruct_rejects_empty_output_grid() {
        let proj = uniform_disc_projection(8, 8);
        assert!(fourier_reconstruct(&proj, 0, 8).is_err());
    }

    #[test]
    fn fourier_reconstruct_produces_requested_image_size() {
        let proj = uniform_disc_projection(16, 16);
        let image = fourier_reconstruct(&proj, 16, 16).unwrap();
        assert_eq!(image.nx(), 16);
        assert_eq!(image.ny(), 16);
    }

    #[test]
    fn fourier_reconstruct_rebins_divergent_geometry_first() {
        let mut header = ProjectionHeader::new(Geometry::Equiangular);
        header.focal_length = 100.0;
        header.det_inc = 0.02;
        header.rot_inc = 2.0 * PI / 32.0;
        header.fan_beam_angle = 15.0 * 0.02;
        let mut proj = Projection::new(header, 32, 16);
        for v in 0..32 {
            proj.view_mut(v).view_angle = v as f64 * 2.0 * PI / 32.0;
            for k in 0..16 {
                proj.view_mut(v).det_values[k] = 1.0;
            }
        }
        let image = fourier_reconstruct(&proj, 16, 16).unwrap();
        assert_eq!(image.nx(), 16);
    }
}
