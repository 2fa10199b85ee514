// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-operation diagnostic context.
//!
//! The original CTSim implementation kept a process-wide "max error count" and "report
//! level" to throttle diagnostic output across an entire run. Those become an explicit
//! context object here: every long-running entry point (rasterize, project,
//! reconstruct) takes a `&mut Diagnostics` instead of touching global state.

/// How verbosely an operation should report non-fatal domain errors (sqrt of a
/// negative value, divide-by-zero, a near-singular transform) as it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportLevel {
    /// Do not log clamped domain errors at all.
    Silent,
    /// Log a summary once the operation completes.
    Summary,
    /// Log every clamped domain error as it occurs.
    Verbose,
}

/// Cooperative cancellation and error-accounting context threaded through the
/// rasterize/project/reconstruct entry points.
///
/// `Diagnostics` is checked at view/column granularity inside long-running loops
/// (§5 "Suspension points"/"Cancellation"); it is never consulted inside a hot inner
/// loop over pixels or detectors.
pub struct Diagnostics {
    report_level: ReportLevel,
    max_errors: Option<u32>,
    error_count: u32,
    cancelled: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics { report_level: ReportLevel::Summary, max_errors: None, error_count: 0, cancelled: false }
    }
}

impl Diagnostics {
    pub fn new(report_level: ReportLevel) -> Self {
        Diagnostics { report_level, ..Default::default() }
    }

    /// Caps the number of clamped domain errors this context will log individually
    /// before falling silent, even at `ReportLevel::Verbose`.
    pub fn with_max_errors(mut self, max_errors: u32) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Records a clamped domain error (e.g. a near-singular transform inversion) and
    /// logs it according to the current report level.
    pub fn record_domain_error(&mut self, context: &str, message: &str) {
        self.error_count += 1;

        let should_log = match self.report_level {
            ReportLevel::Silent => false,
            _ => self.max_errors.map_or(true, |max| self.error_count <= max),
        };

        if should_log {
            log::warn!("{}: {}", context, message);
        }
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Requests cancellation of the operation currently holding this context. Safe to
    /// call from another thread's perspective only if the caller synchronizes access;
    /// orchestration code typically wraps this in an `Arc<AtomicBool>`-backed flag
    /// instead (see `ct-sim`) and only constructs a fresh `Diagnostics` per worker.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_errors_caps_logged_count() {
        let mut diag = Diagnostics::new(ReportLevel::Verbose).with_max_errors(2);
        for _ in 0..5 {
            diag.record_domain_error("test", "clamped");
        }
        assert_eq!(diag.error_count(), 5);
    }

    #[test]
    fn cancellation_is_sticky() {
        let mut diag = Diagnostics::default();
        assert!(!diag.is_cancelled());
        diag.cancel();
        assert!(diag.is_cancelled());
    }
}
