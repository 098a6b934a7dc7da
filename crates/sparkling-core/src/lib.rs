// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sparkling — Core types, statuses, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod status;
pub mod types;
pub mod wire;

pub use config::ContainerConfig;
pub use error::SparklingError;
pub use status::MethodStatus;
pub use types::*;
pub use wire::WireResponse;
