// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sparkling.
//
// These cover infrastructure failures inside method bodies and services.
// They never cross the bridge boundary: by the time a completion reaches the
// runtime, every error has been folded into a `MethodStatus`.

use thiserror::Error;

/// Top-level error type for all Sparkling operations.
#[derive(Debug, Error)]
pub enum SparklingError {
    // -- Bridge --
    #[error("method bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Network --
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("download exceeds the configured limit of {limit} bytes")]
    DownloadTooLarge { limit: u64 },

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SparklingError>;
