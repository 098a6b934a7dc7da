// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parameter and result models.
//
// Methods declare their inputs as a static `Schema` so the pipe can reject
// bad calls before a body ever runs, and tag their outputs with a model name
// so the completion path can verify the result type. JSON `null` counts as
// absent throughout; unknown extra keys are ignored.

use serde_json::Value;
use thiserror::Error;

/// Parameter map as received from the runtime.
pub type ParamMap = serde_json::Map<String, Value>;

/// JSON value classes a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Num,
    Bool,
    Map,
    List,
    /// Any non-null value. For fields like a stored payload whose shape the
    /// method does not constrain.
    Any,
}

impl FieldType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Str => value.is_string(),
            Self::Num => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Map => value.is_object(),
            Self::List => value.is_array(),
            Self::Any => !value.is_null(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Num => "number",
            Self::Bool => "boolean",
            Self::Map => "object",
            Self::List => "array",
            Self::Any => "any",
        }
    }
}

/// JSON class of a concrete value, for violation messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

/// Declared parameter shape of a method.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Schema of a method that takes no parameters.
    pub const EMPTY: Schema = Schema { fields: &[] };

    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Check `params` against the declared fields.
    ///
    /// Reports the first violation in declaration order. Keys that no field
    /// declares pass through untouched so runtimes can ship forward-compat
    /// extras.
    pub fn validate(&self, params: &ParamMap) -> Result<(), SchemaViolation> {
        for spec in self.fields {
            match params.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        return Err(SchemaViolation::missing(spec.name));
                    }
                }
                Some(value) => {
                    if !spec.ty.matches(value) {
                        return Err(SchemaViolation::type_mismatch(spec.name, spec.ty, value));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A parameter that failed schema validation or decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': {reason}")]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.into(),
            reason: "required but missing".into(),
        }
    }

    pub fn type_mismatch(field: &str, expected: FieldType, got: &Value) -> Self {
        Self {
            field: field.into(),
            reason: format!("expected {}, got {}", expected.as_str(), json_type_name(got)),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Typed view of a method's parameters.
///
/// `decode` runs after `Schema::validate`, so implementations may assume the
/// declared fields are present with the declared types; the `Result` exists
/// for standalone use and for value-level checks the schema cannot express.
pub trait ParamModel: Sized {
    fn schema() -> &'static Schema;
    fn decode(params: &ParamMap) -> Result<Self, SchemaViolation>;
}

/// Typed result of a method, tagged with its model name.
pub trait ResultModel {
    /// Stable name used by the pipe to verify the completion result against
    /// the model the method declared.
    fn model_name(&self) -> &'static str;

    /// Encode to the JSON object handed to the runtime. Absent optional
    /// fields are omitted, not set to null.
    fn encode(self) -> ParamMap;
}

/// An encoded result plus the tag of the model that produced it.
#[derive(Debug, Clone)]
pub struct EncodedResult {
    model: &'static str,
    fields: ParamMap,
}

impl EncodedResult {
    pub fn of(result: impl ResultModel) -> Self {
        let model = result.model_name();
        Self {
            model,
            fields: result.encode(),
        }
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn fields(&self) -> &ParamMap {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

// ---------------------------------------------------------------------------
// Field accessors for decode implementations
// ---------------------------------------------------------------------------

/// Required string field.
pub fn str_field(params: &ParamMap, name: &str) -> Result<String, SchemaViolation> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(SchemaViolation::missing(name)),
        Some(other) => Err(SchemaViolation::type_mismatch(name, FieldType::Str, other)),
    }
}

/// Optional string field; `None` when absent or null.
pub fn opt_str_field(params: &ParamMap, name: &str) -> Result<Option<String>, SchemaViolation> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(SchemaViolation::type_mismatch(name, FieldType::Str, other)),
    }
}

/// Optional boolean field with a default.
pub fn bool_field_or(
    params: &ParamMap,
    name: &str,
    default: bool,
) -> Result<bool, SchemaViolation> {
    match params.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Null) | None => Ok(default),
        Some(other) => Err(SchemaViolation::type_mismatch(name, FieldType::Bool, other)),
    }
}

/// Optional non-negative integer field with a default.
pub fn u32_field_or(params: &ParamMap, name: &str, default: u32) -> Result<u32, SchemaViolation> {
    match params.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SchemaViolation::invalid(name, "expected a non-negative integer")),
        Some(Value::Null) | None => Ok(default),
        Some(other) => Err(SchemaViolation::type_mismatch(name, FieldType::Num, other)),
    }
}

/// Optional object field; `None` when absent or null.
pub fn opt_map_field(params: &ParamMap, name: &str) -> Result<Option<ParamMap>, SchemaViolation> {
    match params.get(name) {
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(SchemaViolation::type_mismatch(name, FieldType::Map, other)),
    }
}
