// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Name-keyed method registry.
//
// One instance backs each container's local table and another backs the
// process-wide global table. Handlers are `Arc`-shared, so resolution hands
// out a clone and drops the read guard before anything user-supplied runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::method::Method;

/// Thread-safe map from method name to handler.
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, Arc<dyn Method>>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a handler under its own name. Registering a name twice
    /// replaces the earlier handler; returns whether a replacement happened.
    pub fn register(&self, method: Arc<dyn Method>) -> bool {
        let name = method.name().to_string();
        let replaced = self
            .methods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), method)
            .is_some();
        debug!(method = %name, replaced, "method registered");
        replaced
    }

    /// Remove a handler by name. Unknown names are a no-op; returns whether
    /// anything was removed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self
            .methods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            debug!(method = name, "method unregistered");
        }
        removed
    }

    pub fn respond_to(&self, name: &str) -> bool {
        self.methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Method>> {
        self.methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered names in sorted order, for diagnostics.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.methods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}
