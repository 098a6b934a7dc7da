// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Permission-gated execution.
//
// Methods that touch the camera, photo library, or storage run behind a
// `PermissionGate`. The gate asks the platform provider for the current
// state, requests the permission when missing, and keeps at most one
// outstanding request per capability so a late OS dialog callback can never
// be attributed to the wrong call.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use sparkling_core::Capability;

/// Callback handed to the provider; fires once with the user's answer.
pub type PermissionCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform permission surface.
///
/// Providers collapse whatever state machine the OS exposes (limited,
/// provisional, ask-every-time) to a boolean before the gate sees it.
pub trait PermissionProvider: Send + Sync {
    /// Current state, without prompting.
    fn has_permission(&self, capability: Capability) -> bool;

    /// Prompt the user. `respond` must fire exactly once, on any thread.
    fn request_permission(&self, capability: Capability, respond: PermissionCallback);
}

/// What the gate decided for one protected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Already granted, or granted through the prompt. Proceed.
    Granted,
    /// The user said no. Terminal for this call; the gate never re-prompts.
    Denied,
    /// Another call already has a prompt up for this capability. The caller
    /// fails without disturbing the outstanding request.
    RequestPending,
}

/// Serialises permission prompts per capability.
pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
    pending: Arc<Mutex<HashSet<Capability>>>,
}

impl PermissionGate {
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Resolve `capability` for one call and hand the decision to
    /// `on_decision` (fired exactly once, possibly before this returns).
    pub fn run(
        &self,
        capability: Capability,
        on_decision: impl FnOnce(PermissionDecision) + Send + 'static,
    ) {
        if self.provider.has_permission(capability) {
            on_decision(PermissionDecision::Granted);
            return;
        }

        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if !pending.insert(capability) {
                debug!(capability = %capability, "permission request already pending");
                on_decision(PermissionDecision::RequestPending);
                return;
            }
        }

        debug!(capability = %capability, "requesting permission");
        let pending = Arc::clone(&self.pending);
        self.provider.request_permission(
            capability,
            Box::new(move |granted| {
                pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&capability);
                if granted {
                    on_decision(PermissionDecision::Granted);
                } else {
                    warn!(capability = %capability, "permission denied by user");
                    on_decision(PermissionDecision::Denied);
                }
            }),
        );
    }

    /// Current state without prompting, for preflight checks.
    pub fn check(&self, capability: Capability) -> bool {
        self.provider.has_permission(capability)
    }
}

/// Provider that grants everything without prompting. For trusted embedders
/// and tests.
pub struct GrantAllPermissions;

impl PermissionProvider for GrantAllPermissions {
    fn has_permission(&self, _capability: Capability) -> bool {
        true
    }

    fn request_permission(&self, _capability: Capability, respond: PermissionCallback) {
        respond(true);
    }
}

/// Provider that denies everything. Default for headless hosts where no one
/// can answer a prompt.
pub struct DenyAllPermissions;

impl PermissionProvider for DenyAllPermissions {
    fn has_permission(&self, _capability: Capability) -> bool {
        false
    }

    fn request_permission(&self, capability: Capability, respond: PermissionCallback) {
        debug!(capability = %capability, "headless host, denying permission request");
        respond(false);
    }
}
