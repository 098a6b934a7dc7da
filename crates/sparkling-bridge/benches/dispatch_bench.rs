// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for method resolution, schema validation, and a full
// invoke round trip in the sparkling-bridge crate.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use sparkling_bridge::{
    Completion, FieldSpec, FieldType, Method, MethodCall, MethodPipe, MethodRegistry, Schema,
};

const BENCH_SCHEMA: Schema = Schema::new(&[
    FieldSpec::required("url", FieldType::Str),
    FieldSpec::optional("extension", FieldType::Str),
    FieldSpec::optional("saveToAlbum", FieldType::Bool),
    FieldSpec::optional("headers", FieldType::Map),
]);

/// Completes empty immediately; the floor cost of one dispatch.
struct Immediate;

impl Method for Immediate {
    fn name(&self) -> &str {
        "bench.immediate"
    }

    fn param_schema(&self) -> &'static Schema {
        &BENCH_SCHEMA
    }

    fn invoke(&self, _call: MethodCall, completion: Completion) {
        completion.succeed_empty();
    }
}

/// Benchmark name resolution against a registry of realistic size.
///
/// 64 registered methods approximates a full production container (media,
/// storage, device, navigation, and app-specific families).
fn bench_resolve(c: &mut Criterion) {
    let registry = MethodRegistry::new();
    for family in ["media", "storage", "device", "nav"] {
        for i in 0..16 {
            registry.register(Arc::new(NamedImmediate(format!("{family}.method{i}"))));
        }
    }

    c.bench_function("registry_resolve (64 methods)", |b| {
        b.iter(|| {
            let method = registry.resolve(black_box("storage.method7"));
            black_box(method);
        });
    });
}

struct NamedImmediate(String);

impl Method for NamedImmediate {
    fn name(&self) -> &str {
        &self.0
    }

    fn param_schema(&self) -> &'static Schema {
        &Schema::EMPTY
    }

    fn invoke(&self, _call: MethodCall, completion: Completion) {
        completion.succeed_empty();
    }
}

/// Benchmark schema validation of a typical download parameter map.
fn bench_validate(c: &mut Criterion) {
    let params = match json!({
        "url": "https://cdn.example.com/assets/hero.png",
        "extension": "png",
        "saveToAlbum": false,
        "headers": {"authorization": "Bearer token"}
    }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };

    c.bench_function("schema_validate (4 fields)", |b| {
        b.iter(|| {
            BENCH_SCHEMA
                .validate(black_box(&params))
                .expect("valid params");
        });
    });
}

/// Benchmark the full pipe protocol with a synchronous no-op body.
fn bench_invoke_round_trip(c: &mut Criterion) {
    let pipe = MethodPipe::new("bench", Arc::new(MethodRegistry::new()));
    pipe.register_local(Arc::new(Immediate));

    c.bench_function("pipe_invoke (sync no-op body)", |b| {
        b.iter(|| {
            pipe.invoke(
                black_box("bench.immediate"),
                json!({"url": "https://cdn.example.com/a.png"}),
                |status, _| {
                    assert!(status.is_success());
                },
            );
        });
    });
}

criterion_group!(
    benches,
    bench_resolve,
    bench_validate,
    bench_invoke_round_trip
);
criterion_main!(benches);
