// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sparkling — Method bridge core.
//
// Everything a container needs to expose native methods to an embedded
// runtime: declarative parameter/result models, the `Method` trait with its
// single-fire completion, name-keyed registries (per-container local plus
// process-wide global), the `MethodPipe` that runs the invocation protocol,
// the permission gate, and the platform capability seams with a desktop stub.

pub mod event;
pub mod method;
pub mod model;
pub mod permission;
pub mod pipe;
pub mod platform;
pub mod registry;
pub mod stub;

pub use event::{EventEngine, NullEngine};
pub use method::{Completion, Method, MethodCall};
pub use model::{
    EncodedResult, FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema,
    SchemaViolation,
};
pub use permission::{
    DenyAllPermissions, GrantAllPermissions, PermissionDecision, PermissionGate,
    PermissionProvider,
};
pub use pipe::MethodPipe;
pub use platform::{
    MediaLibrary, MediaPicker, PickMediaType, PickOutcome, PickRequest, PickSource,
    PickedItem, PlatformHost,
};
pub use registry::MethodRegistry;
pub use stub::StubHost;
