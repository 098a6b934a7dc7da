// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub host for desktop/CI builds where native media APIs are unavailable.
//
// Every capability fails with `PlatformUnavailable` — real implementations
// live in the platform shells that embed this workspace.

use std::path::Path;

use tracing::warn;

use sparkling_core::error::{Result, SparklingError};

use crate::platform::{MediaLibrary, MediaPicker, PickCallback, PickRequest, PlatformHost};

/// No-op host returned on non-mobile platforms.
pub struct StubHost;

impl PlatformHost for StubHost {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl MediaPicker for StubHost {
    fn pick_media(&self, request: PickRequest, done: PickCallback) {
        warn!(?request, "MediaPicker::pick_media called on stub host");
        done(Err(SparklingError::PlatformUnavailable));
    }
}

impl MediaLibrary for StubHost {
    fn save_to_album(&self, _path: &Path) -> Result<()> {
        warn!("MediaLibrary::save_to_album called on stub host");
        Err(SparklingError::PlatformUnavailable)
    }
}
