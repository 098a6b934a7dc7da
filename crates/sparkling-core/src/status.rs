// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method invocation outcomes.
//
// Every bridge call finishes in exactly one of these states. The set is
// closed on purpose: runtimes switch on the numeric code, so adding a
// variant is a wire-format change and must keep the existing codes stable.

use serde::{Deserialize, Serialize};

/// Outcome of a single method invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodStatus {
    /// The method ran and produced its declared result (possibly empty).
    Succeeded,
    /// Generic runtime failure inside the method body.
    Failed(String),
    /// Parameters decoded fine but were semantically rejected by the body
    /// (malformed data URL, unsupported scheme, bad enum value).
    InvalidParameter(String),
    /// Parameters violated the method's declared schema. Raised by the
    /// pipe before the body runs; the body never sees the call.
    InvalidInputParameter(String),
    /// A required capability was denied. Terminal for this call.
    UnauthorizedAccess(String),
    /// No method with the requested name in the local or global registry.
    NotFound(String),
    /// The body completed with a result whose model does not match the
    /// method's declared result model.
    ResultModelTypeWrong(String),
    /// The user backed out (picker dismissed, dialog cancelled).
    OperationCancelled(String),
}

impl MethodStatus {
    /// Stable numeric code reported to the runtime.
    pub fn code(&self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::Failed(_) => 1,
            Self::InvalidParameter(_) => 2,
            Self::InvalidInputParameter(_) => 3,
            Self::UnauthorizedAccess(_) => 4,
            Self::NotFound(_) => 5,
            Self::ResultModelTypeWrong(_) => 6,
            Self::OperationCancelled(_) => 7,
        }
    }

    /// Human-readable detail carried by the status (empty on success).
    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded => "",
            Self::Failed(m)
            | Self::InvalidParameter(m)
            | Self::InvalidInputParameter(m)
            | Self::UnauthorizedAccess(m)
            | Self::NotFound(m)
            | Self::ResultModelTypeWrong(m)
            | Self::OperationCancelled(m) => m,
        }
    }

    /// Status name as the runtime spells it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::InvalidParameter(_) => "invalidParameter",
            Self::InvalidInputParameter(_) => "invalidInputParameter",
            Self::UnauthorizedAccess(_) => "unauthorizedAccess",
            Self::NotFound(_) => "notFound",
            Self::ResultModelTypeWrong(_) => "resultModelTypeWrong",
            Self::OperationCancelled(_) => "operationCancelled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl std::fmt::Display for MethodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_success() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}: {}", self.name(), self.message())
        }
    }
}
