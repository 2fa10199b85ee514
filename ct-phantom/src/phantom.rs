// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An ordered collection of [`PhantomElement`]s (§3, §4.4): line-integral summation
//! across every element and column-parallel rasterization into a [`ct_image::Image`].

use crate::element::PhantomElement;
use ct_core::diagnostics::Diagnostics;
use ct_image::Image;

/// An immutable analytic phantom: an ordered set of attenuating primitives plus their
/// combined world-space bounding box (§3 "A phantom also caches its total bounding
/// box").
#[derive(Debug, Clone)]
pub struct Phantom {
    elements: Vec<PhantomElement>,
    bbox: (f64, f64, f64, f64),
}

impl Phantom {
    pub fn new(elements: Vec<PhantomElement>) -> Self {
        let bbox = elements.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), el| {
                let (x0, x1, y0, y1) = el.bounding_box();
                (min_x.min(x0), max_x.max(x1), min_y.min(y0), max_y.max(y1))
            },
        );
        Phantom { elements, bbox }
    }

    pub fn elements(&self) -> &[PhantomElement] {
        &self.elements
    }

    /// World-space bounding box `(xMin, xMax, yMin, yMax)` over every element, or a
    /// unit box around the origin for an empty phantom.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        if self.elements.is_empty() {
            (-1.0, 1.0, -1.0, 1.0)
        } else {
            self.bbox
        }
    }

    /// The diameter of the phantom's bounding circle, used by the scanner to size its
    /// field of view relative to `viewRatio` (§4.5).
    pub fn diameter(&self) -> f64 {
        let (x0, x1, y0, y1) = self.bounding_box();
        ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
    }

    /// Sums every element's line-integral contribution for the world-space ray
    /// `(x1, y1)-(x2, y2)` (§4.4 "Primitive line integrals").
    pub fn line_integral(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        self.elements.iter().map(|el| el.line_integral(x1, y1, x2, y2)).sum()
    }

    fn attenuation_at(&self, x: f64, y: f64) -> f64 {
        self.elements.iter().filter(|el| el.contains(x, y)).map(|el| el.attenuation()).sum()
    }

    /// Rasterizes the phantom into an `nx`-by-`ny` real image covering
    /// `[-radius, radius]` on both axes, where `radius = diameter * view_ratio / 2`
    /// (§4.4). Each output cell is the average of `sample*sample` uniformly placed
    /// sample points, each tested against every element via [`PhantomElement::contains`].
    /// Checks `diagnostics` for cancellation once per output column; a cancelled run
    /// returns the partial image built so far.
    pub fn rasterize(
        &self,
        nx: usize,
        ny: usize,
        view_ratio: f64,
        sample: usize,
        diagnostics: &mut Diagnostics,
    ) -> Image {
        self.rasterize_columns(nx, ny, view_ratio, sample, 0, nx, diagnostics)
    }

    /// Rasterizes only the half-open column range `[col_start, col_end)`, writing into
    /// an image of the full `(nx, ny)` extent with every other column left at zero.
    /// This is the unit an orchestrator distributes across worker threads (§4.4
    /// "Rasterization is embarrassingly parallel over columns").
    pub fn rasterize_columns(
        &self,
        nx: usize,
        ny: usize,
        view_ratio: f64,
        sample: usize,
        col_start: usize,
        col_end: usize,
        diagnostics: &mut Diagnostics,
    ) -> Image {
        let radius = self.diameter() * view_ratio / 2.0;
        let x_inc = 2.0 * radius / nx as f64;
        let y_inc = 2.0 * radius / ny as f64;
        let mut image = Image::new_real(nx, ny, x_inc, y_inc);

        let sample = sample.max(1);
        let sub = 1.0 / sample as f64;

        for i in col_start..col_end.min(nx) {
            if diagnostics.is_cancelled() {
                break;
            }
            let cell_x = -radius + (i as f64 + 0.5) * x_inc;
            for j in 0..ny {
                let cell_y = -radius + (j as f64 + 0.5) * y_inc;
                let mut sum = 0.0;
                for sx in 0..sample {
                    let px = cell_x - x_inc / 2.0 + (sx as f64 + 0.5) * x_inc * sub;
                    for sy in 0..sample {
                        let py = cell_y - y_inc / 2.0 + (sy as f64 + 0.5) * y_inc * sub;
                        sum += self.attenuation_at(px, py);
                    }
                }
                image.set_real(i, j, sum / (sample * sample) as f64);
            }
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn unit_circle() -> Phantom {
        let mut d = Diagnostics::default();
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
        Phantom::new(vec![el])
    }

    #[test]
    fn bounding_box_covers_every_element() {
        let phantom = unit_circle();
        let (x0, x1, y0, y1) = phantom.bounding_box();
        assert!((x0 - -1.0).abs() < 1e-9);
        assert!((x1 - 1.0).abs() < 1e-9);
        assert!((y0 - -1.0).abs() < 1e-9);
        assert!((y1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rasterize_centre_pixel_is_attenuated() {
        let phantom = unit_circle();
        let mut d = Diagnostics::default();
        let image = phantom.rasterize(16, 16, 2.0, 2, &mut d);
        let centre = image.get_real(8, 8);
        assert!(centre > 0.0);
    }

    #[test]
    fn rasterize_corner_is_zero() {
        let phantom = unit_circle();
        let mut d = Diagnostics::default();
        let image = phantom.rasterize(16, 16, 2.0, 2, &mut d);
        assert_eq!(image.get_real(0, 0), 0.0);
    }

    #[test]
    fn cancellation_stops_remaining_columns() {
        let phantom = unit_circle();
        let mut d = Diagnostics::default();
        d.cancel();
        let image = phantom.rasterize(8, 8, 2.0, 1, &mut d);
        // Every column is skipped once cancelled, so the whole image stays zero.
        for i in 0..8 {
            for j in 0..8 {
                assert_eq!(image.get_real(i, j), 0.0);
            }
        }
    }
}
