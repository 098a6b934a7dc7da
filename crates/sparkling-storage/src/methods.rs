// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The storage.* method family.
//
// Thin bridge methods over a shared `KvStore`. All three are global scope:
// they carry no per-container state, so every container sees the same data.
// Store failures complete as `failed`; they never panic the container.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::error;

use sparkling_bridge::model::{
    FieldSpec, FieldType, ParamMap, ParamModel, ResultModel, Schema, SchemaViolation, str_field,
};
use sparkling_bridge::{Completion, Method, MethodCall, MethodRegistry};
use sparkling_core::{MethodScope, MethodStatus};

use crate::kv::KvStore;

/// Handle shared by the three methods.
pub type SharedStore = Arc<Mutex<KvStore>>;

/// Register `storage.setItem`, `storage.getItem`, and `storage.removeItem`
/// over one shared store.
pub fn register_storage_methods(registry: &MethodRegistry, store: SharedStore) {
    registry.register(Arc::new(SetItem {
        store: store.clone(),
    }));
    registry.register(Arc::new(GetItem {
        store: store.clone(),
    }));
    registry.register(Arc::new(RemoveItem { store }));
}

fn lock_store(store: &SharedStore) -> std::sync::MutexGuard<'_, KvStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Parameter and result models
// ---------------------------------------------------------------------------

const SET_ITEM_SCHEMA: Schema = Schema::new(&[
    FieldSpec::required("key", FieldType::Str),
    FieldSpec::required("value", FieldType::Any),
]);

const KEY_ONLY_SCHEMA: Schema = Schema::new(&[FieldSpec::required("key", FieldType::Str)]);

struct SetItemParams {
    key: String,
    value: Value,
}

impl ParamModel for SetItemParams {
    fn schema() -> &'static Schema {
        &SET_ITEM_SCHEMA
    }

    fn decode(params: &ParamMap) -> Result<Self, SchemaViolation> {
        let value = match params.get("value") {
            Some(value) if !value.is_null() => value.clone(),
            _ => return Err(SchemaViolation::missing("value")),
        };
        Ok(Self {
            key: str_field(params, "key")?,
            value,
        })
    }
}

struct KeyOnlyParams {
    key: String,
}

impl ParamModel for KeyOnlyParams {
    fn schema() -> &'static Schema {
        &KEY_ONLY_SCHEMA
    }

    fn decode(params: &ParamMap) -> Result<Self, SchemaViolation> {
        Ok(Self {
            key: str_field(params, "key")?,
        })
    }
}

/// Result of `storage.getItem`. `value` is omitted when nothing is stored
/// under the key.
pub struct StorageValueResult {
    pub key: String,
    pub value: Option<Value>,
}

impl ResultModel for StorageValueResult {
    fn model_name(&self) -> &'static str {
        "StorageValueResult"
    }

    fn encode(self) -> ParamMap {
        let mut map = ParamMap::new();
        map.insert("key".into(), Value::String(self.key));
        if let Some(value) = self.value {
            map.insert("value".into(), value);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

struct SetItem {
    store: SharedStore,
}

impl Method for SetItem {
    fn name(&self) -> &str {
        "storage.setItem"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        SetItemParams::schema()
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match SetItemParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        match lock_store(&self.store).set(&params.key, &params.value) {
            Ok(()) => completion.succeed_empty(),
            Err(e) => {
                error!(key = %params.key, error = %e, "storage.setItem failed");
                completion.fail(e.to_string());
            }
        }
    }
}

struct GetItem {
    store: SharedStore,
}

impl Method for GetItem {
    fn name(&self) -> &str {
        "storage.getItem"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        KeyOnlyParams::schema()
    }

    fn result_model(&self) -> Option<&'static str> {
        Some("StorageValueResult")
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match KeyOnlyParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        match lock_store(&self.store).get(&params.key) {
            Ok(value) => completion.succeed(StorageValueResult {
                key: params.key,
                value,
            }),
            Err(e) => {
                error!(key = %params.key, error = %e, "storage.getItem failed");
                completion.fail(e.to_string());
            }
        }
    }
}

struct RemoveItem {
    store: SharedStore,
}

impl Method for RemoveItem {
    fn name(&self) -> &str {
        "storage.removeItem"
    }

    fn scope(&self) -> MethodScope {
        MethodScope::Global
    }

    fn param_schema(&self) -> &'static Schema {
        KeyOnlyParams::schema()
    }

    fn invoke(&self, call: MethodCall, completion: Completion) {
        let params = match KeyOnlyParams::decode(&call.params) {
            Ok(params) => params,
            Err(violation) => {
                completion.complete(
                    MethodStatus::InvalidInputParameter(violation.to_string()),
                    None,
                );
                return;
            }
        };
        // Removing an absent key still succeeds; removal is idempotent.
        match lock_store(&self.store).remove(&params.key) {
            Ok(_) => completion.succeed_empty(),
            Err(e) => {
                error!(key = %params.key, error = %e, "storage.removeItem failed");
                completion.fail(e.to_string());
            }
        }
    }
}
