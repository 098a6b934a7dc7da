// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The `Method` trait and the single-fire completion handle.
//
// `invoke` returns immediately; the body reports its outcome through the
// `Completion`, synchronously or from any thread it spawned. The completion
// owns the delivery closure in a take-once slot, so a second fire cannot
// reach the caller no matter what the body does.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use sparkling_core::{CallId, MethodScope, MethodStatus};

use crate::model::{EncodedResult, ParamMap, ResultModel, Schema};

/// A single dispatched call: identity plus schema-validated parameters.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub id: CallId,
    pub params: ParamMap,
}

impl MethodCall {
    pub fn new(params: ParamMap) -> Self {
        Self {
            id: CallId::new(),
            params,
        }
    }
}

/// A native method exposed to the runtime.
///
/// Implementations are shared across calls and containers, so any mutable
/// state lives behind the implementation's own synchronisation.
pub trait Method: Send + Sync {
    /// Dotted method name, e.g. `media.downloadFile`.
    fn name(&self) -> &str;

    /// Registry the method belongs in when registered through a pipe.
    fn scope(&self) -> MethodScope {
        MethodScope::Local
    }

    /// Declared parameter shape, enforced by the pipe before `invoke`.
    fn param_schema(&self) -> &'static Schema;

    /// Model name of a non-empty result, or `None` for methods that only
    /// ever complete empty. Checked by the pipe on every completion.
    fn result_model(&self) -> Option<&'static str> {
        None
    }

    /// Run the method. Must cause exactly one fire of `completion`, on any
    /// thread. Returning without firing strands the caller.
    fn invoke(&self, call: MethodCall, completion: Completion);
}

type CompletionFn = Box<dyn FnOnce(MethodStatus, Option<EncodedResult>) + Send + 'static>;

/// Single-fire completion handle passed to every method body.
///
/// Cloning shares the underlying slot: whichever clone fires first wins and
/// the rest become no-ops. A swallowed second fire is logged at `warn!` with
/// the call id so the offending body can be found.
#[derive(Clone)]
pub struct Completion {
    slot: Arc<Mutex<Option<CompletionFn>>>,
    call_id: CallId,
    method: Arc<str>,
}

impl Completion {
    pub fn new(
        call_id: CallId,
        method: &str,
        deliver: impl FnOnce(MethodStatus, Option<EncodedResult>) + Send + 'static,
    ) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::new(deliver)))),
            call_id,
            method: Arc::from(method),
        }
    }

    /// Deliver the outcome. First call wins; later calls are dropped.
    pub fn complete(&self, status: MethodStatus, result: Option<EncodedResult>) {
        let deliver = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match deliver {
            Some(deliver) => deliver(status, result),
            None => warn!(
                method = %self.method,
                call_id = %self.call_id,
                status = status.name(),
                "completion already fired; duplicate dropped"
            ),
        }
    }

    /// True once the outcome has been delivered (or is being delivered).
    pub fn is_spent(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn succeed(&self, result: impl ResultModel) {
        self.complete(MethodStatus::Succeeded, Some(EncodedResult::of(result)));
    }

    pub fn succeed_empty(&self) {
        self.complete(MethodStatus::Succeeded, None);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.complete(MethodStatus::Failed(message.into()), None);
    }

    pub fn invalid(&self, message: impl Into<String>) {
        self.complete(MethodStatus::InvalidParameter(message.into()), None);
    }

    pub fn deny(&self, message: impl Into<String>) {
        self.complete(MethodStatus::UnauthorizedAccess(message.into()), None);
    }

    pub fn cancel(&self, message: impl Into<String>) {
        self.complete(MethodStatus::OperationCancelled(message.into()), None);
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("method", &self.method)
            .field("call_id", &self.call_id)
            .field("spent", &self.is_spent())
            .finish()
    }
}
