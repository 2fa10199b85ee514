// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A shareable cancellation flag the orchestrator hands to every worker's
//! [`ct_core::diagnostics::Diagnostics`], per the Design Note on global mutable state:
//! "orchestration code typically wraps this in an `Arc<AtomicBool>`-backed flag".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Spawns a detached timer thread that cancels this flag after `timeout`. The
    /// thread outlives the call and is reaped when the process exits.
    pub fn cancel_after(&self, timeout: Duration) {
        let flag = self.clone();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            flag.cancel();
        });
    }
}
