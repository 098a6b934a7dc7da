// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event delivery toward the embedded runtime.

use serde_json::Value;
use tracing::debug;

/// Sink for container-to-runtime events (keyboard shown, app foregrounded,
/// download progress). Implemented by whatever hosts the runtime: a webview
/// wrapper, the console host, a test recorder.
pub trait EventEngine: Send + Sync {
    fn fire_event(&self, name: &str, params: Value);
}

/// Engine that logs and drops every event. Used where no runtime is
/// listening yet but producers already fire.
pub struct NullEngine;

impl EventEngine for NullEngine {
    fn fire_event(&self, name: &str, _params: Value) {
        debug!(event = name, "event dropped (null engine)");
    }
}
