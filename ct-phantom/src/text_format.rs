// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for the line-oriented phantom text format (§6): comment lines start with
//! `#`; each other line describes one primitive as `type cx cy u v theta a`.

use crate::element::{ElementKind, PhantomElement};
use crate::phantom::Phantom;
use ct_core::diagnostics::Diagnostics;
use ct_core::error::{CtError, Result};

fn kind_from_str(token: &str) -> Option<ElementKind> {
    match token {
        "rectangle" => Some(ElementKind::Rectangle),
        "triangle" => Some(ElementKind::Triangle),
        "ellipse" => Some(ElementKind::Ellipse),
        "sector" => Some(ElementKind::Sector),
        "segment" => Some(ElementKind::Segment),
        _ => None,
    }
}

/// Parses a complete phantom description, one primitive per non-comment,
/// non-whitespace-only line. Rejects the whole phantom on the first malformed line
/// (§7 "Construction-failure... no further operations permitted").
pub fn parse(text: &str, diagnostics: &mut Diagnostics) -> Result<Phantom> {
    let mut elements = Vec::new();

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 7 {
            return Err(CtError::Decode(phantom_line_error(lineno, "expected 7 fields")));
        }

        let kind = kind_from_str(tokens[0])
            .ok_or_else(|| CtError::Decode(phantom_line_error(lineno, "unrecognized primitive type")))?;

        let mut values = [0.0_f64; 6];
        for (i, tok) in tokens[1..].iter().enumerate() {
            values[i] = tok
                .parse()
                .map_err(|_| CtError::Decode(phantom_line_error(lineno, "non-numeric field")))?;
        }
        let [cx, cy, u, v, theta, a] = values;

        let element = PhantomElement::new(kind, cx, cy, u, v, theta, a, (0.0, 0.0), diagnostics)
            .ok_or_else(|| {
                CtError::Decode(phantom_line_error(lineno, "invalid primitive parameters"))
            })?;
        elements.push(element);
    }

    Ok(Phantom::new(elements))
}

fn phantom_line_error(lineno: usize, reason: &str) -> &'static str {
    // The concrete line number is logged rather than embedded in the static error
    // message, since `CtError::Decode` carries a `&'static str`.
    log::warn!("phantom text format: line {}: {}", lineno + 1, reason);
    match reason {
        "expected 7 fields" => "phantom line does not have 7 fields",
        "unrecognized primitive type" => "phantom line names an unrecognized primitive type",
        "non-numeric field" => "phantom line contains a non-numeric field",
        "invalid primitive parameters" => "phantom line has invalid primitive parameters",
        _ => "malformed phantom line",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_whitespace() {
        let text = "# a comment\n\nellipse 0 0 1 1 0 1\n";
        let mut d = Diagnostics::default();
        let phantom = parse(text, &mut d).unwrap();
        assert_eq!(phantom.elements().len(), 1);
    }

    #[test]
    fn rejects_unknown_primitive_type() {
        let text = "hexagon 0 0 1 1 0 1\n";
        let mut d = Diagnostics::default();
        assert!(matches!(parse(text, &mut d), Err(CtError::Decode(_))));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let text = "ellipse 0 0 1 1\n";
        let mut d = Diagnostics::default();
        assert!(matches!(parse(text, &mut d), Err(CtError::Decode(_))));
    }

    #[test]
    fn parses_multiple_primitives() {
        let text = "ellipse 0 0 1 1 0 1\nrectangle 0.5 0.5 0.2 0.2 0 -0.5\n";
        let mut d = Diagnostics::default();
        let phantom = parse(text, &mut d).unwrap();
        assert_eq!(phantom.elements().len(), 2);
    }
}
