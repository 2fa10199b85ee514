// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the error type shared by every crate in the workspace.

use std::fmt;

/// Reasons a seek or rebin operation that depends on a particular acquisition geometry
/// can fail.
#[derive(Debug)]
pub enum GeometryErrorKind {
    /// The acquisition does not span the angular range an operation requires.
    InsufficientRotation,
    /// A geometry tag was expected to be one of a specific set but was not.
    UnexpectedGeometry,
}

impl GeometryErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            GeometryErrorKind::InsufficientRotation => {
                "acquisition does not span the rotation the operation requires"
            }
            GeometryErrorKind::UnexpectedGeometry => "unexpected scan geometry",
        }
    }
}

/// `CtError` enumerates every failure this workspace's crates can report. There is no
/// exception mechanism: every fallible operation returns a `Result<_, CtError>`.
#[derive(Debug)]
pub enum CtError {
    /// An I/O error occurred while reading or writing a projection or image file.
    Io(std::io::Error),
    /// The stream contained malformed data (bad magic, truncated record, ...).
    Decode(&'static str),
    /// A constructor was given invalid or mismatched parameters. Construction errors
    /// are sticky: once returned, the object that would have been constructed does not
    /// exist and no further operations are permitted.
    Construction(&'static str),
    /// A requested feature or combination of parameters is not implemented.
    Unsupported(&'static str),
    /// Two images or projections that were expected to share dimensions did not.
    DimensionMismatch { expected: (usize, usize), found: (usize, usize) },
    /// A geometry-dependent operation could not proceed.
    Geometry(GeometryErrorKind),
    /// The operation was cooperatively cancelled before it completed.
    Cancelled,
}

impl fmt::Display for CtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtError::Io(err) => write!(f, "io error: {}", err),
            CtError::Decode(msg) => write!(f, "malformed stream: {}", msg),
            CtError::Construction(msg) => write!(f, "construction failed: {}", msg),
            CtError::Unsupported(feature) => write!(f, "unsupported: {}", feature),
            CtError::DimensionMismatch { expected, found } => write!(
                f,
                "dimension mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            CtError::Geometry(kind) => write!(f, "geometry error: {}", kind.as_str()),
            CtError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for CtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CtError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CtError {
    fn from(err: std::io::Error) -> Self {
        CtError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, CtError>;

/// Convenience function to create a decode error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(CtError::Decode(desc))
}

/// Convenience function to create a construction error.
pub fn construction_error<T>(desc: &'static str) -> Result<T> {
    Err(CtError::Construction(desc))
}

/// Convenience function to create an unsupported-feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(CtError::Unsupported(feature))
}

/// Convenience function to create a geometry error.
pub fn geometry_error<T>(kind: GeometryErrorKind) -> Result<T> {
    Err(CtError::Geometry(kind))
}
