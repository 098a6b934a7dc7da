// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire encoding of method completions.
//
// The runtime sees every completion as a `{ code, message, data }` frame.
// Codes come from `MethodStatus::code()` and are frozen; `data` is present
// only when the method produced a result.

use crate::status::MethodStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completion frame as delivered to the embedding runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WireResponse {
    /// Build a frame from a finished invocation.
    ///
    /// Results accompany successful completions only; a failure status
    /// discards any data the body may have produced.
    pub fn from_completion(status: &MethodStatus, data: Option<Value>) -> Self {
        Self {
            code: status.code(),
            message: status.message().to_string(),
            data: if status.is_success() { data } else { None },
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}
