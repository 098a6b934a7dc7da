// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native media capabilities.
//
// Method bodies see the host only through these seams. Real pickers and
// photo libraries live in the platform shells (iOS/Android embedders);
// desktop and CI builds get the stub.

use std::path::Path;

use sparkling_core::error::Result;

/// Unified host that groups the native capabilities media methods need.
pub trait PlatformHost: MediaPicker + MediaLibrary + Send + Sync {
    /// Human-readable platform name (e.g. "iOS 18", "Android 15").
    fn platform_name(&self) -> &str;
}

/// Where picked media comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSource {
    Camera,
    Library,
}

/// What kind of media to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMediaType {
    Image,
    Video,
    Any,
}

/// One picker presentation.
#[derive(Debug, Clone)]
pub struct PickRequest {
    pub source: PickSource,
    pub media: PickMediaType,
    /// Maximum number of items the user may select (>= 1).
    pub count: u32,
}

/// A file the user selected, already copied into app-accessible storage.
#[derive(Debug, Clone)]
pub struct PickedItem {
    pub path: String,
    pub size_bytes: u64,
    pub mime: Option<String>,
}

/// How a picker presentation ended.
#[derive(Debug, Clone)]
pub enum PickOutcome {
    Picked(Vec<PickedItem>),
    /// The user dismissed the picker without choosing anything.
    Cancelled,
}

/// Fires once when the picker closes, on an arbitrary thread.
pub type PickCallback = Box<dyn FnOnce(Result<PickOutcome>) + Send + 'static>;

/// Present the system camera or media picker.
pub trait MediaPicker: Send + Sync {
    fn pick_media(&self, request: PickRequest, done: PickCallback);
}

/// Write files into the user's photo album.
pub trait MediaLibrary: Send + Sync {
    fn save_to_album(&self, path: &Path) -> Result<()>;
}
