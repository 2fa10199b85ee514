// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single geometric primitive making up a phantom (§3, §4.4): a unit-local shape
//! (rectangle, triangle, ellipse, sector, or line segment), scaled/rotated/translated
//! into world space, with a constant additive attenuation.

use ct_core::clip::{clip_circle, clip_rect, clip_sector, clip_triangle, Segment};
use ct_core::diagnostics::Diagnostics;
use ct_core::transform::Transform2D;

/// The shape of a [`PhantomElement`], defined in a "unit-local" frame before the
/// element's scale/rotate/translate transform is applied (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Axis-aligned unit square `[-1, 1] x [-1, 1]` in local space.
    Rectangle,
    /// Apex at `(0, 1)`, base corners at `(-1, 0)` and `(1, 0)`.
    Triangle,
    /// Unit circle, scaled anisotropically by the element's `(u, v)`.
    Ellipse,
    /// Intersection of the unit circle (restricted to an angular window) and the
    /// triangle above, used for pie-slice attenuators.
    Sector,
    /// A degenerate primitive: a line of zero width used only to carve seams in a
    /// phantom (contributes no attenuation under normal rasterization).
    Segment,
}

/// One analytic attenuator within a [`crate::Phantom`] (§3, §4.4). Caches its forward
/// and inverse transforms and its world-space axis-aligned bounding box at
/// construction, since every ray intersection test needs the inverse transform and
/// every rasterization pass needs the bounding box.
#[derive(Debug, Clone)]
pub struct PhantomElement {
    kind: ElementKind,
    cx: f64,
    cy: f64,
    u: f64,
    v: f64,
    theta: f64,
    attenuation: f64,
    /// Angular window `(start, stop)` in local coordinates, used only by `Sector`.
    sector_window: (f64, f64),
    forward: Transform2D,
    inverse: Transform2D,
    bbox: (f64, f64, f64, f64),
}

impl PhantomElement {
    /// Builds a primitive of the given `kind`, centred at `(cx, cy)` with half-widths
    /// `(u, v)`, rotated `theta` radians counter-clockwise, with additive attenuation
    /// `a`. `sector_window` is ignored for every kind but `Sector`.
    pub fn new(
        kind: ElementKind,
        cx: f64,
        cy: f64,
        u: f64,
        v: f64,
        theta: f64,
        attenuation: f64,
        sector_window: (f64, f64),
        diagnostics: &mut Diagnostics,
    ) -> Option<Self> {
        if u <= 0.0 || v <= 0.0 {
            diagnostics.record_domain_error(
                "PhantomElement::new",
                "half-widths (u, v) must be positive",
            );
            return None;
        }

        // Forward: local unit shape -> world. Applied in scale, rotate, translate
        // order (§3 "the 3x3 forward transform (scale.rotate.translate)").
        let forward = Transform2D::scale(u, v)
            .then(&Transform2D::rotate(theta))
            .then(&Transform2D::translate(cx, cy));
        let inverse = forward.invert(diagnostics)?;

        let corners = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)];
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for (lx, ly) in corners {
            let (wx, wy) = forward.apply(lx, ly);
            min_x = min_x.min(wx);
            max_x = max_x.max(wx);
            min_y = min_y.min(wy);
            max_y = max_y.max(wy);
        }

        Some(PhantomElement {
            kind,
            cx,
            cy,
            u,
            v,
            theta,
            attenuation,
            sector_window,
            forward,
            inverse,
            bbox: (min_x, max_x, min_y, max_y),
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn centre(&self) -> (f64, f64) {
        (self.cx, self.cy)
    }

    pub fn half_widths(&self) -> (f64, f64) {
        (self.u, self.v)
    }

    pub fn rotation(&self) -> f64 {
        self.theta
    }

    pub fn attenuation(&self) -> f64 {
        self.attenuation
    }

    /// World-space axis-aligned bounding box `(xMin, xMax, yMin, yMax)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        self.bbox
    }

    /// The additive attenuation this element contributes to the world-space ray
    /// `(x1,y1)-(x2,y2)` (§4.4 "Primitive line integrals"): the ray is carried into
    /// local space by the inverse transform, clipped against the primitive's unit
    /// shape, and the fraction of the local segment retained is applied to the
    /// world-space length of the full ray to recover a world-space chord length.
    pub fn line_integral(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        if matches!(self.kind, ElementKind::Segment) {
            return 0.0;
        }

        let (lx1, ly1) = self.inverse.apply(x1, y1);
        let (lx2, ly2) = self.inverse.apply(x2, y2);
        let local_full = Segment::new(lx1, ly1, lx2, ly2);
        let local_full_len = local_full.length();
        if local_full_len == 0.0 {
            return 0.0;
        }

        let clipped = match self.kind {
            ElementKind::Rectangle => clip_rect(local_full, [-1.0, -1.0, 1.0, 1.0]),
            ElementKind::Ellipse => clip_circle(local_full, 0.0, 0.0, 1.0, 0.0, 0.0),
            ElementKind::Triangle => clip_triangle(local_full, 1.0, 1.0, false),
            ElementKind::Sector => clip_sector(local_full, 1.0, 1.0),
            ElementKind::Segment => None,
        };

        let Some(clipped) = clipped else {
            return 0.0;
        };

        let world_full_len = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
        let ratio = clipped.length() / local_full_len;
        ratio * world_full_len * self.attenuation
    }

    /// Whether the world-space point `(x, y)` falls inside this primitive, used by
    /// rasterization's super-sampling (§4.4).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (lx, ly) = self.inverse.apply(x, y);
        match self.kind {
            ElementKind::Rectangle => lx.abs() <= 1.0 && ly.abs() <= 1.0,
            ElementKind::Ellipse => lx * lx + ly * ly <= 1.0,
            ElementKind::Triangle => triangle_contains(lx, ly, 1.0, 1.0),
            ElementKind::Sector => {
                triangle_contains(lx, ly, 1.0, 1.0)
                    && lx * lx + ly * ly <= 1.0
                    && angle_in_window(ly.atan2(lx), self.sector_window)
            }
            ElementKind::Segment => false,
        }
    }
}

fn triangle_contains(x: f64, y: f64, u: f64, v: f64) -> bool {
    if y < 0.0 || y > v {
        return false;
    }
    let half_width_at_y = u * (1.0 - y / v);
    x.abs() <= half_width_at_y
}

fn angle_in_window(angle: f64, (start, stop): (f64, f64)) -> bool {
    let a = ct_core::units::normalize_angle(angle);
    let s = ct_core::units::normalize_angle(start);
    let e = ct_core::units::normalize_angle(stop);
    if s <= e {
        a >= s && a <= e
    } else {
        a >= s || a <= e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag() -> Diagnostics {
        Diagnostics::default()
    }

    #[test]
    fn rectangle_line_integral_matches_chord_length() {
        let mut d = diag();
        let el = PhantomElement::new(
            ElementKind::Rectangle,
            0.0,
            0.0,
            2.0,
            1.0,
            0.0,
            1.0,
            (0.0, 0.0),
            &mut d,
        )
        .unwrap();
        // A horizontal ray through y=0 crosses the full width of 4 (local [-1,1] scaled
        // by u=2 gives world x in [-2, 2]).
        let integral = el.line_integral(-5.0, 0.0, 5.0, 0.0);
        assert!((integral - 4.0).abs() < 1e-9);
    }

    #[test]
    fn ray_missing_primitive_contributes_nothing() {
        let mut d = diag();
        let el = PhantomElement::new(
            ElementKind::Ellipse,
            0.0,
            0.0,
            1.0,
            1.0,
            0.0,
            1.0,
            (0.0, 0.0),
            &mut d,
        )
        .unwrap();
        let integral = el.line_integral(-5.0, 5.0, 5.0, 5.0);
        assert_eq!(integral, 0.0);
    }

    #[test]
    fn contains_matches_local_unit_circle() {
        let mut d = diag();
        let el = PhantomElement::new(
            ElementKind::Ellipse,
            1.0,
            1.0,
            2.0,
            2.0,
            0.0,
            1.0,
            (0.0, 0.0),
            &mut d,
        )
        .unwrap();
        assert!(el.contains(1.0, 1.0));
        assert!(!el.contains(10.0, 10.0));
    }

    #[test]
    fn degenerate_half_width_is_rejected() {
        let mut d = diag();
        let el = PhantomElement::new(
            ElementKind::Rectangle,
            0.0,
            0.0,
            0.0,
            1.0,
            0.0,
            1.0,
            (0.0, 0.0),
            &mut d,
        );
        assert!(el.is_none());
        assert_eq!(d.error_count(), 1);
    }
}
