// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-container method pipe.
//
// Each container owns one pipe: a local registry layered over the shared
// global one, an optional event engine, and the invocation protocol. The
// protocol is strict and short:
//
//   1. resolve (local first, then global)      -> notFound
//   2. params must be a JSON object            -> invalidInputParameter
//   3. schema validation                       -> invalidInputParameter
//   4. body runs with a single-fire completion
//   5. non-nil result checked against the declared result model
//                                              -> resultModelTypeWrong
//   6. caller's handler fires exactly once
//
// Failures before step 4 never enter the body. No registry guard is held
// while a body or a caller handler runs.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use sparkling_core::MethodStatus;

use crate::event::EventEngine;
use crate::method::{Completion, Method, MethodCall};
use crate::model::{EncodedResult, ParamMap, json_type_name};
use crate::registry::MethodRegistry;

/// A container's gateway to its methods.
pub struct MethodPipe {
    label: String,
    local: MethodRegistry,
    global: Arc<MethodRegistry>,
    engine: RwLock<Option<Arc<dyn EventEngine>>>,
}

impl MethodPipe {
    pub fn new(label: impl Into<String>, global: Arc<MethodRegistry>) -> Self {
        Self {
            label: label.into(),
            local: MethodRegistry::new(),
            global,
            engine: RwLock::new(None),
        }
    }

    /// Container label used in logs and event frames.
    pub fn label(&self) -> &str {
        &self.label
    }

    // -- registration -------------------------------------------------------

    pub fn register_local(&self, method: Arc<dyn Method>) -> bool {
        self.local.register(method)
    }

    pub fn unregister_local(&self, name: &str) -> bool {
        self.local.unregister(name)
    }

    pub fn register_global(&self, method: Arc<dyn Method>) -> bool {
        self.global.register(method)
    }

    pub fn unregister_global(&self, name: &str) -> bool {
        self.global.unregister(name)
    }

    /// Whether a method is reachable from this container.
    pub fn respond_to(&self, name: &str) -> bool {
        self.local.respond_to(name) || self.global.respond_to(name)
    }

    /// Local registrations shadow global ones with the same name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Method>> {
        self.local
            .resolve(name)
            .or_else(|| self.global.resolve(name))
    }

    // -- events -------------------------------------------------------------

    pub fn attach_engine(&self, engine: Arc<dyn EventEngine>) {
        *self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(engine);
    }

    pub fn detach_engine(&self) {
        *self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Push an event toward the runtime. Without an attached engine this is
    /// a logged no-op, never an error.
    pub fn fire_event(&self, name: &str, params: Value) {
        let engine = self
            .engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match engine {
            Some(engine) => {
                debug!(container = %self.label, event = name, "firing event");
                engine.fire_event(name, params);
            }
            None => {
                debug!(container = %self.label, event = name, "no engine attached, event dropped");
            }
        }
    }

    // -- invocation ---------------------------------------------------------

    /// Run a method by name. `on_complete` fires exactly once, possibly
    /// before this returns (synchronous bodies and early rejections) and
    /// possibly from another thread.
    pub fn invoke(
        &self,
        name: &str,
        params: Value,
        on_complete: impl FnOnce(MethodStatus, Option<Value>) + Send + 'static,
    ) {
        let Some(method) = self.resolve(name) else {
            warn!(container = %self.label, method = name, "method not found");
            on_complete(
                MethodStatus::NotFound(format!("method '{name}' is not registered")),
                None,
            );
            return;
        };

        let params = match params {
            Value::Object(map) => map,
            Value::Null => ParamMap::new(),
            other => {
                on_complete(
                    MethodStatus::InvalidInputParameter(format!(
                        "params must be an object, got {}",
                        json_type_name(&other)
                    )),
                    None,
                );
                return;
            }
        };

        if let Err(violation) = method.param_schema().validate(&params) {
            debug!(
                container = %self.label,
                method = name,
                %violation,
                "parameter validation failed"
            );
            on_complete(
                MethodStatus::InvalidInputParameter(violation.to_string()),
                None,
            );
            return;
        }

        let call = MethodCall::new(params);
        let call_id = call.id;
        debug!(container = %self.label, method = name, %call_id, "invoking method");

        let expected = method.result_model();
        let completion = Completion::new(call_id, name, move |status, result| {
            let (status, data) = finish(expected, status, result);
            on_complete(status, data);
        });
        method.invoke(call, completion);
    }
}

/// Apply the result-model check and encode the result for the caller.
fn finish(
    expected: Option<&'static str>,
    status: MethodStatus,
    result: Option<EncodedResult>,
) -> (MethodStatus, Option<Value>) {
    if !status.is_success() {
        return (status, None);
    }
    match (expected, result) {
        // An empty result is always acceptable, declared model or not.
        (_, None) => (MethodStatus::Succeeded, None),
        (Some(model), Some(result)) => {
            if result.model() == model {
                (MethodStatus::Succeeded, Some(result.into_value()))
            } else {
                (
                    MethodStatus::ResultModelTypeWrong(format!(
                        "expected result model '{model}', got '{}'",
                        result.model()
                    )),
                    None,
                )
            }
        }
        (None, Some(result)) => (
            MethodStatus::ResultModelTypeWrong(format!(
                "method declares no result model, got '{}'",
                result.model()
            )),
            None,
        ),
    }
}
