// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line clippers (§4.1). Each clipper takes a segment `(x1, y1)-(x2, y2)` and returns
//! the clipped segment plus whether any of it remains visible. Ported from the
//! Cohen-Sutherland/triangle/circle clippers in the original `libctsupport/clip.cpp`.

use std::f64::consts::PI;

const EPSILON: f64 = 1e-10;

/// The clipped form of a line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Segment { x1, y1, x2, y2 }
    }

    pub fn length(&self) -> f64 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }
}

/// Cohen-Sutherland outcodes: left=1, right=2, bottom=4, top=8.
fn rect_code(x: f64, y: f64, rect: [f64; 4]) -> u8 {
    let mut c = 0u8;
    if x < rect[0] {
        c |= 1;
    } else if x > rect[2] {
        c |= 2;
    }
    if y < rect[1] {
        c |= 4;
    } else if y > rect[3] {
        c |= 8;
    }
    c
}

/// Clips a segment against an axis-aligned rectangle `[xmin, ymin, xmax, ymax]` using
/// Cohen-Sutherland outcodes.
pub fn clip_rect(seg: Segment, rect: [f64; 4]) -> Option<Segment> {
    let Segment { mut x1, mut y1, mut x2, mut y2 } = seg;
    let mut c1 = rect_code(x1, y1, rect);
    let mut c2 = rect_code(x2, y2, rect);

    while c1 != 0 || c2 != 0 {
        if c1 & c2 != 0 {
            return None;
        }
        let c = if c1 != 0 { c1 } else { c2 };
        let (mut x, mut y) = (0.0, 0.0);

        if c & 1 != 0 {
            y = y1 + (y2 - y1) * (rect[0] - x1) / (x2 - x1);
            x = rect[0];
        } else if c & 2 != 0 {
            y = y1 + (y2 - y1) * (rect[2] - x1) / (x2 - x1);
            x = rect[2];
        } else if c & 4 != 0 {
            x = x1 + (x2 - x1) * (rect[1] - y1) / (y2 - y1);
            y = rect[1];
        } else if c & 8 != 0 {
            x = x1 + (x2 - x1) * (rect[3] - y1) / (y2 - y1);
            y = rect[3];
        }

        if c == c1 {
            x1 = x;
            y1 = y;
            c1 = rect_code(x1, y1, rect);
        } else {
            x2 = x;
            y2 = y;
            c2 = rect_code(x2, y2, rect);
        }
    }

    Some(Segment::new(x1, y1, x2, y2))
}

/// Region code for `clip_triangle`'s apex-on-+Y, base-on-X-axis triangle with vertices
/// `(-u, 0)`, `(u, 0)`, `(0, v)`, normalized so the routine operates as if `(u, v) =
/// (1, 1)` (matches the original's parametrization via slope/intercept).
fn tri_code(x: f64, y: f64, m: f64, b: f64, clip_x_axis: bool) -> u8 {
    let mut c = 0u8;
    if clip_x_axis && y < 0.0 {
        c |= 1;
    }
    if y > -m * x + b + EPSILON {
        c |= 2;
    }
    if y > m * x + b + EPSILON {
        c |= 4;
    }
    c
}

/// Clips a segment against a triangle with apex `(0, v)` and base corners `(-u, 0)`,
/// `(u, 0)`. `clip_x_axis` should be `true` for a standalone triangle primitive and
/// `false` when called internally by [`clip_sector`] (the base edge is handled there by
/// the circle clip instead).
pub fn clip_triangle(seg: Segment, u: f64, v: f64, clip_x_axis: bool) -> Option<Segment> {
    let m = v / u;
    let b = v;

    let Segment { mut x1, mut y1, mut x2, mut y2 } = seg;
    let mut c1 = tri_code(x1, y1, m, b, clip_x_axis);
    let mut c2 = tri_code(x2, y2, m, b, clip_x_axis);

    while c1 != 0 || c2 != 0 {
        if c1 & c2 != 0 {
            return None;
        }
        let c = if c1 != 0 { c1 } else { c2 };
        let (mut x, mut y) = (0.0, 0.0);

        if c & 1 != 0 {
            x = x1 + (x2 - x1) * (0.0 - y1) / (y2 - y1);
            y = 0.0;
        } else if c & 2 != 0 {
            let dx = x2 - x1;
            let dy = y2 - y1;
            x = if dx.abs() > EPSILON { (-y1 + b + x1 * dy / dx) / (m + dy / dx) } else { x1 };
            y = -m * x + b;
        } else if c & 4 != 0 {
            let dx = x2 - x1;
            let dy = y2 - y1;
            x = if dx.abs() > EPSILON { (y1 - b - x1 * dy / dx) / (m - dy / dx) } else { x1 };
            y = m * x + b;
        }

        if c == c1 {
            x1 = x;
            y1 = y;
            c1 = tri_code(x1, y1, m, b, clip_x_axis);
        } else {
            x2 = x;
            y2 = y;
            c2 = tri_code(x2, y2, m, b, clip_x_axis);
        }
    }

    Some(Segment::new(x1, y1, x2, y2))
}

/// Clips a segment against a circle centred at `(cx, cy)` with the given `radius`, with
/// an optional angular window `[t1, t2)` (radians). Uses one `sqrt` and one `atan2`, per
/// spec.md §4.1.
pub fn clip_circle(seg: Segment, cx: f64, cy: f64, radius: f64, t1: f64, t2: f64) -> Option<Segment> {
    let Segment { x1, y1, x2, y2 } = seg;

    // Translate so (x1, y1) is at the origin.
    let xtrans = -x1;
    let ytrans = -y1;
    let mut xc1 = 0.0_f64;
    let mut yc1 = 0.0_f64;
    let mut xc2 = x2 + xtrans;
    let mut yc2 = y2 + ytrans;
    let mut ccx = cx + xtrans;
    let mut ccy = cy + ytrans;

    // Rotate so the line lies along +X.
    let theta = -yc2.atan2(xc2);
    let (s, c) = theta.sin_cos();
    let rotate = |x: f64, y: f64| (x * c + y * s, -x * s + y * c);
    let (rx2, ry2) = rotate(xc2, yc2);
    xc2 = rx2;
    yc2 = ry2;
    let (rccx, rccy) = rotate(ccx, ccy);
    ccx = rccx;
    ccy = rccy;

    let wt1 = crate::units::normalize_angle(t1 + theta);
    let wt2 = crate::units::normalize_angle(t2 + theta);

    if ccy.abs() > radius {
        return None;
    }

    let half_chord = (radius * radius - ccy * ccy).sqrt();
    let xcmin = ccx - half_chord;
    let xcmax = ccx + half_chord;

    if (wt2 - wt1).abs() < 1e-10 {
        if xc1 < xcmin {
            xc1 = xcmin;
        }
        if xc2 > xcmax {
            xc2 = xcmax;
        }
    } else if wt1 < wt2 {
        if wt1 < PI && wt2 > PI && xc1 < xcmin {
            xc1 = xcmin;
        }
    } else {
        if wt1 < PI && xc1 < xcmin {
            xc1 = xcmin;
        }
        if xc2 > xcmax {
            xc2 = xcmax;
        }
    }

    if xc1 >= xc2 {
        return None;
    }

    // Rotate and translate back.
    let (s2, c2) = (-theta).sin_cos();
    let unrotate = |x: f64, y: f64| (x * c2 + y * s2, -x * s2 + y * c2);
    let (fx1, fy1) = unrotate(xc1, yc1);
    let (fx2, fy2) = unrotate(xc2, yc2);

    Some(Segment::new(fx1 - xtrans, fy1 - ytrans, fx2 - xtrans, fy2 - ytrans))
}

/// Clips a segment against a sector: the intersection of a circle of radius
/// `sqrt(u^2 + v^2)` and the triangle used by [`clip_triangle`] (with the x-axis edge
/// left to the circle clip, per the original's `clip_sector`).
pub fn clip_sector(seg: Segment, u: f64, v: f64) -> Option<Segment> {
    let radius = (u * u + v * v).sqrt();
    let circle_clipped = clip_circle(seg, 0.0, v, radius, 0.0, 0.0)?;
    clip_triangle(circle_clipped, u, v, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_clip_trims_outside_segment() {
        let seg = Segment::new(-2.0, 0.0, 2.0, 0.0);
        let clipped = clip_rect(seg, [-1.0, -1.0, 1.0, 1.0]).unwrap();
        assert!((clipped.x1 - -1.0).abs() < 1e-9);
        assert!((clipped.x2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rect_clip_rejects_disjoint_segment() {
        let seg = Segment::new(5.0, 5.0, 6.0, 6.0);
        assert!(clip_rect(seg, [-1.0, -1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn circle_clip_chord_length_matches_diameter_through_centre() {
        let seg = Segment::new(-2.0, 0.0, 2.0, 0.0);
        let clipped = clip_circle(seg, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
        assert!((clipped.length() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_clip_rejects_line_above_apex() {
        let seg = Segment::new(-0.5, 2.0, 0.5, 2.0);
        assert!(clip_triangle(seg, 1.0, 1.0, true).is_none());
    }
}
