// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sparkling — Persistent key/value storage and the storage.* method family.

pub mod hash;
pub mod kv;
pub mod methods;

pub use hash::{hash_bytes, short_hash};
pub use kv::KvStore;
pub use methods::register_storage_methods;
