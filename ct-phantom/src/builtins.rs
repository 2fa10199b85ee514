// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named built-in phantoms resolvable without a phantom-text-format file (§6 "Named
//! built-in phantoms (Herman head, Shepp-Logan, hollow circle, two-hollow-circle,
//! etc.) are resolvable by name without a file").

use crate::element::{ElementKind, PhantomElement};
use crate::phantom::Phantom;
use ct_core::diagnostics::Diagnostics;

/// Builds the named built-in phantom, or returns `None` if `name` is not recognised.
/// Recognised names: `"shepp-logan"`, `"hollow-circle"`, `"two-hollow-circles"`.
pub fn builtin(name: &str, diagnostics: &mut Diagnostics) -> Option<Phantom> {
    match name {
        "shepp-logan" => Some(shepp_logan(diagnostics)),
        "hollow-circle" => Some(hollow_circle(diagnostics)),
        "two-hollow-circles" => Some(two_hollow_circles(diagnostics)),
        _ => None,
    }
}

/// A single large ellipse of attenuation 1 enclosing a thin annular ring of negative
/// attenuation, a minimal smoke-test phantom with a simple analytic reconstruction.
pub fn hollow_circle(diagnostics: &mut Diagnostics) -> Phantom {
    let elements = vec![
        PhantomElement::new(
            ElementKind::Ellipse, 0.0, 0.0, 0.92, 0.92, 0.0, 1.0, (0.0, 0.0), diagnostics,
        ),
        PhantomElement::new(
            ElementKind::Ellipse, 0.0, 0.0, 0.6, 0.6, 0.0, -1.0, (0.0, 0.0), diagnostics,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();
    Phantom::new(elements)
}

/// Two hollow circles side by side, used to exercise off-centre reconstruction
/// artifacts.
pub fn two_hollow_circles(diagnostics: &mut Diagnostics) -> Phantom {
    let elements = vec![
        PhantomElement::new(
            ElementKind::Ellipse, -0.5, 0.0, 0.4, 0.4, 0.0, 1.0, (0.0, 0.0), diagnostics,
        ),
        PhantomElement::new(
            ElementKind::Ellipse, -0.5, 0.0, 0.25, 0.25, 0.0, -1.0, (0.0, 0.0), diagnostics,
        ),
        PhantomElement::new(
            ElementKind::Ellipse, 0.5, 0.0, 0.4, 0.4, 0.0, 1.0, (0.0, 0.0), diagnostics,
        ),
        PhantomElement::new(
            ElementKind::Ellipse, 0.5, 0.0, 0.25, 0.25, 0.0, -1.0, (0.0, 0.0), diagnostics,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();
    Phantom::new(elements)
}

/// The classic Shepp-Logan head phantom: a large outer skull ellipse, two smaller
/// "ventricle" ellipses of negative attenuation, and several small high-contrast
/// ellipses scattered within, per the standard parametrization (Shepp & Logan, 1974).
pub fn shepp_logan(diagnostics: &mut Diagnostics) -> Phantom {
    // (cx, cy, u, v, theta_degrees, attenuation)
    const ELLIPSES: [(f64, f64, f64, f64, f64, f64); 10] = [
        (0.0, 0.0, 0.69, 0.92, 90.0, 2.0),
        (0.0, -0.0184, 0.6624, 0.874, 90.0, -0.98),
        (0.22, 0.0, 0.11, 0.31, 72.0, -0.02),
        (-0.22, 0.0, 0.16, 0.41, 108.0, -0.02),
        (0.0, 0.35, 0.21, 0.25, 90.0, 0.01),
        (0.0, 0.1, 0.046, 0.046, 0.0, 0.01),
        (0.0, -0.1, 0.046, 0.046, 0.0, 0.01),
        (-0.08, -0.605, 0.046, 0.023, 0.0, 0.01),
        (0.0, -0.605, 0.023, 0.023, 0.0, 0.01),
        (0.06, -0.605, 0.023, 0.046, 0.0, 0.01),
    ];

    let elements = ELLIPSES
        .iter()
        .filter_map(|&(cx, cy, u, v, theta_deg, a)| {
            PhantomElement::new(
                ElementKind::Ellipse,
                cx,
                cy,
                u,
                v,
                theta_deg.to_radians(),
                a,
                (0.0, 0.0),
                diagnostics,
            )
        })
        .collect();
    Phantom::new(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shepp_logan_has_ten_ellipses() {
        let mut d = Diagnostics::default();
        let phantom = shepp_logan(&mut d);
        assert_eq!(phantom.elements().len(), 10);
    }

    #[test]
    fn unknown_name_is_not_resolved() {
        let mut d = Diagnostics::default();
        assert!(builtin("not-a-real-phantom", &mut d).is_none());
    }

    #[test]
    fn hollow_circle_centre_is_positive() {
        let mut d = Diagnostics::default();
        let phantom = hollow_circle(&mut d);
        // Just inside the outer ring but outside the inner hole.
        let integral = phantom.line_integral(-0.8, 0.75, 0.8, 0.75);
        assert!(integral > 0.0);
    }
}
