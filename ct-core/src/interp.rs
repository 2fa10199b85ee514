// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stateless interpolators parameterized by a source array (§3, §4.1). Ported from
//! `libctsupport/interpolator.cpp`'s `CubicSplineInterpolator`/`CubicPolyInterpolator`
//! and `include/interpolator.h`'s `LinearInterpolator`/`BilinearInterpolator`/
//! `BilinearPolarInterpolator`.

/// Nearest-neighbour lookup into `y`; out-of-range queries return `0.0`.
pub fn nearest(y: &[f64], x: f64) -> f64 {
    if x < -0.5 || x > (y.len() as f64 - 0.5) {
        return 0.0;
    }
    let idx = x.round() as i64;
    if idx < 0 || idx as usize >= y.len() {
        0.0
    } else {
        y[idx as usize]
    }
}

/// Linearly interpolates `y` at regularly spaced indices `0..n-1`. Out-of-range queries
/// return `0.0` when `zero_outside` is set, otherwise clamp to the nearest endpoint.
pub fn linear(y: &[f64], x: f64, zero_outside: bool) -> f64 {
    let n = y.len();
    if n == 0 {
        return 0.0;
    }
    if x <= 0.0 {
        return if x == 0.0 { y[0] } else if zero_outside { 0.0 } else { y[0] };
    }
    let last = (n - 1) as f64;
    if x >= last {
        return if x == last { y[n - 1] } else if zero_outside { 0.0 } else { y[n - 1] };
    }
    let floor = x.floor() as usize;
    y[floor] + (y[floor + 1] - y[floor]) * (x - floor as f64)
}

/// A linear interpolator over irregularly spaced sample positions `x[0..n)`, with a
/// "last floor" hint carried between calls to amortize sequential access via binary
/// search (spec.md §4.1).
pub struct IrregularLinearInterpolator<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    zero_outside: bool,
    last_floor: Option<usize>,
}

impl<'a> IrregularLinearInterpolator<'a> {
    pub fn new(xs: &'a [f64], ys: &'a [f64], zero_outside: bool) -> Self {
        assert_eq!(xs.len(), ys.len());
        IrregularLinearInterpolator { xs, ys, zero_outside, last_floor: None }
    }

    pub fn interpolate(&mut self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 0 {
            return 0.0;
        }

        let mut lower: isize = -1;
        let mut upper: isize = n as isize;
        if let Some(hint) = self.last_floor {
            if self.xs[hint] < x {
                lower = hint as isize;
            }
        }

        while upper - lower > 1 {
            let mid = (upper + lower) / 2;
            if x >= self.xs[mid as usize] {
                lower = mid;
            } else {
                upper = mid;
            }
        }

        if x == self.xs[0] {
            return self.ys[0];
        }
        if x < self.xs[0] {
            return if self.zero_outside { 0.0 } else { self.ys[0] };
        }
        if x == self.xs[n - 1] {
            return self.ys[n - 1];
        }
        if x > self.xs[n - 1] {
            return if self.zero_outside { 0.0 } else { self.ys[n - 1] };
        }

        let lo = lower as usize;
        let hi = upper as usize;
        self.last_floor = Some(lo);
        self.ys[lo] + (self.ys[hi] - self.ys[lo]) * ((x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]))
    }
}

/// Lagrange 4-point cubic polynomial interpolation over `y[0..n)` at regularly spaced
/// indices. Falls back to linear interpolation in the first and last unit interval,
/// where fewer than 4 neighbours exist.
pub fn cubic_polynomial(y: &[f64], x: f64) -> f64 {
    let n = y.len() as i64;
    let lo = x.floor() as i64 - 1;
    let hi = lo + 3;

    if lo < -1 {
        return 0.0;
    }
    if lo == -1 {
        return y[0] + x * (y[1] - y[0]);
    }
    if hi > n {
        return 0.0;
    }
    if hi == n {
        let frac = x - (lo + 1) as f64;
        return y[(n - 2) as usize] + frac * (y[(n - 1) as usize] - y[(n - 2) as usize]);
    }

    let one_sixth = 1.0 / 6.0;
    let xd0 = x - lo as f64;
    let xd1 = x - (lo + 1) as f64;
    let xd2 = x - (lo + 2) as f64;
    let xd3 = x - (lo + 3) as f64;

    let (lo, lo1, lo2, lo3) = (lo as usize, (lo + 1) as usize, (lo + 2) as usize, (lo + 3) as usize);

    xd1 * xd2 * xd3 * -one_sixth * y[lo]
        + xd0 * xd2 * xd3 * 0.5 * y[lo1]
        + xd0 * xd1 * xd3 * -0.5 * y[lo2]
        + xd0 * xd1 * xd2 * one_sixth * y[lo3]
}

/// A natural cubic spline over `y[0..n)`, with its second derivatives precomputed in a
/// single O(n) pass at construction so each query is O(1).
pub struct CubicSpline {
    y: Vec<f64>,
    y2: Vec<f64>,
}

impl CubicSpline {
    pub fn new(y: &[f64]) -> Self {
        let n = y.len();
        let mut y2 = vec![0.0; n];
        if n < 3 {
            return CubicSpline { y: y.to_vec(), y2 };
        }

        let mut temp = vec![0.0; n - 1];
        for i in 1..n - 1 {
            let t = 2.0 + 0.5 * y2[i - 1];
            let mut ti = y[i + 1] + y[i - 1] - y[i] - y[i];
            ti = (3.0 * ti - 0.5 * temp[i - 1]) / t;
            temp[i] = ti;
            y2[i] = -0.5 / t;
        }

        for i in (0..=n - 2).rev() {
            y2[i] = temp[i] + y2[i] * y2[i + 1];
        }

        CubicSpline { y: y.to_vec(), y2 }
    }

    pub fn interpolate(&self, x: f64) -> f64 {
        let one_sixth = 1.0 / 6.0;
        let n = self.y.len();
        let lo = x.floor() as i64;
        let hi = lo + 1;

        if lo < 0 || hi as usize >= n {
            return 0.0;
        }
        let (lo, hi) = (lo as usize, hi as usize);

        let lo_fr = hi as f64 - x;
        let hi_fr = 1.0 - lo_fr;
        let mut y = lo_fr * self.y[lo] + hi_fr * self.y[hi];
        y += one_sixth
            * ((lo_fr.powi(3) - lo_fr) * self.y2[lo] + (hi_fr.powi(3) - hi_fr) * self.y2[hi]);
        y
    }
}

/// A row-major (stride `ny`) 2D sample grid as viewed by the bilinear interpolators.
pub struct Grid2D<'a> {
    pub data: &'a [f64],
    pub nx: usize,
    pub ny: usize,
}

impl<'a> Grid2D<'a> {
    pub fn new(data: &'a [f64], nx: usize, ny: usize) -> Self {
        assert_eq!(data.len(), nx * ny);
        Grid2D { data, nx, ny }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> f64 {
        self.data[x * self.ny + y]
    }
}

/// Standard bilinear interpolation over a 2D grid. Out-of-range queries return `0.0`.
pub fn bilinear(grid: &Grid2D<'_>, x_pos: f64, y_pos: f64) -> f64 {
    let floor_x = x_pos.floor();
    let floor_y = y_pos.floor();
    let x_frac = x_pos - floor_x;
    let y_frac = y_pos - floor_y;
    let (ix, iy) = (floor_x as i64, floor_y as i64);

    if ix < 0 || iy < 0 || ix as usize > grid.nx - 1 || iy as usize > grid.ny - 1 {
        return 0.0;
    }
    let (ix, iy) = (ix as usize, iy as usize);

    if ix == grid.nx - 1 && iy == grid.ny - 1 {
        return grid.at(ix, iy);
    }
    if ix == grid.nx - 1 {
        return grid.at(ix, iy) + y_frac * (grid.at(ix, iy + 1) - grid.at(ix, iy));
    }
    if iy == grid.ny - 1 {
        return grid.at(ix, iy) + x_frac * (grid.at(ix + 1, iy) - grid.at(ix, iy));
    }

    (1.0 - x_frac) * (1.0 - y_frac) * grid.at(ix, iy)
        + x_frac * (1.0 - y_frac) * grid.at(ix + 1, iy)
        + (1.0 - x_frac) * y_frac * grid.at(ix, iy + 1)
        + x_frac * y_frac * grid.at(ix + 1, iy + 1)
}

/// Bilinear interpolation treating the first axis (`angle`) as circular: index `-1`
/// aliases to `nAngle - 1` with the radial (`pos`) axis mirrored about its centre, per
/// spec.md §4.1.
pub fn bilinear_polar(grid: &Grid2D<'_>, angle: f64, pos: f64) -> f64 {
    let n_angle = grid.nx;
    let n_pos = grid.ny;

    let floor_angle = angle.floor();
    let floor_pos = pos.floor();
    let angle_frac = angle - floor_angle;
    let pos_frac = pos - floor_pos;
    let (ia, ip) = (floor_angle as i64, floor_pos as i64);

    if ia < -1 || ip < 0 || ia as usize > n_angle - 1 || ip as usize > n_pos - 1 {
        return 0.0;
    }

    if ia == -1 && ip as usize == n_pos - 1 {
        let ip = ip as usize;
        return grid.at(0, ip) + angle_frac * (grid.at(n_angle - 1, ip) - grid.at(0, ip));
    }
    if ia as usize == n_angle - 1 && ip as usize == n_pos - 1 {
        let ip = ip as usize;
        return grid.at(n_angle - 1, ip) + angle_frac * (grid.at(0, ip) - grid.at(n_angle - 1, ip));
    }
    if ip as usize == n_pos - 1 {
        let (ia, ip) = (ia as usize, ip as usize);
        return grid.at(ia, ip) + angle_frac * (grid.at(ia + 1, ip) - grid.at(ia, ip));
    }

    if ia as usize == n_angle - 1 {
        let ip = ip as usize;
        let upper_angle = 0usize;
        let lower_pos = (n_pos - 1) - ip;
        let upper_pos = (n_pos - 1) - (ip + 1);
        let ia = ia as usize;
        return (1.0 - angle_frac) * (1.0 - pos_frac) * grid.at(ia, ip)
            + angle_frac * (1.0 - pos_frac) * grid.at(upper_angle, lower_pos)
            + pos_frac * (1.0 - angle_frac) * grid.at(ia, ip + 1)
            + angle_frac * pos_frac * grid.at(upper_angle, upper_pos);
    }
    if ia == -1 {
        let ip = ip as usize;
        let lower_angle = n_angle - 1;
        let lower_pos = (n_pos - 1) - ip;
        let upper_pos = (n_pos - 1) - (ip + 1);
        return (1.0 - angle_frac) * (1.0 - pos_frac) * grid.at(lower_angle, lower_pos)
            + angle_frac * (1.0 - pos_frac) * grid.at(0, ip)
            + pos_frac * (1.0 - angle_frac) * grid.at(lower_angle, upper_pos)
            + angle_frac * pos_frac * grid.at(0, ip + 1);
    }

    let (ia, ip) = (ia as usize, ip as usize);
    (1.0 - angle_frac) * (1.0 - pos_frac) * grid.at(ia, ip)
        + angle_frac * (1.0 - pos_frac) * grid.at(ia + 1, ip)
        + pos_frac * (1.0 - angle_frac) * grid.at(ia, ip + 1)
        + angle_frac * pos_frac * grid.at(ia + 1, ip + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_polynomial_reduces_to_linear_at_ends() {
        let y = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((cubic_polynomial(&y, 0.5) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn cubic_polynomial_is_exact_on_a_line() {
        let y = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((cubic_polynomial(&y, 2.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn cubic_spline_passes_through_samples() {
        let y = [0.0, 1.0, 4.0, 9.0, 16.0];
        let spline = CubicSpline::new(&y);
        for (i, &v) in y.iter().enumerate() {
            assert!((spline.interpolate(i as f64) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn bilinear_interpolates_midpoint() {
        let data = [0.0, 1.0, 1.0, 2.0]; // nx=2, ny=2, column-major
        let grid = Grid2D::new(&data, 2, 2);
        assert!((bilinear(&grid, 0.5, 0.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bilinear_polar_wraps_angle_axis() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // nx=3 angles, ny=2 pos
        let grid = Grid2D::new(&data, 3, 2);
        let at_zero = bilinear_polar(&grid, 0.0, 0.0);
        let wrapped = bilinear_polar(&grid, -1.0 + 1e-9, 0.0);
        // Near index -1 should approach the mirrored sample at the last angle index,
        // not panic or silently clamp to 0.
        assert!(wrapped.is_finite());
        assert!(at_zero.is_finite());
    }

    #[test]
    fn irregular_linear_uses_hint_across_calls() {
        let xs = [0.0, 1.0, 3.0, 7.0];
        let ys = [0.0, 10.0, 30.0, 70.0];
        let mut interp = IrregularLinearInterpolator::new(&xs, &ys, true);
        assert!((interp.interpolate(2.0) - 20.0).abs() < 1e-9);
        assert!((interp.interpolate(5.0) - 50.0).abs() < 1e-9);
    }
}
