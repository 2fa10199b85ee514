// CTSim-rs
// Copyright (c) 2024 The CTSim-rs Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! History labels carried by an [`crate::Image`]: a textual description, a creation
//! timestamp, and the elapsed wall-clock time the operation that produced the label
//! took (§3 "a list of textual labels (history/description with timestamps and elapsed
//! calc times)").

use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub elapsed: Duration,
}

impl Label {
    pub fn new(text: impl Into<String>, elapsed: Duration) -> Self {
        Label { text: text.into(), timestamp: Utc::now(), elapsed }
    }
}
