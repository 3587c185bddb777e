// benches/translate_performance.rs
//! Benchmarks for the translation hot path.
//!
//! Translation runs once per failed request, so the interesting numbers are
//! classification cost per failure family and payload serialization.

use app_errors::{translate, AppError, RequestContext, RetryAfter, Translator, UpstreamFailure};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

fn failure_samples() -> Vec<(&'static str, Value)> {
    vec![
        (
            "missing_parameter",
            json!({ "output": { "payload": {
                "message": "child \"email\" fails because [\"email\" is required]",
                "validation": { "keys": ["email", "authPW"] }
            } } }),
        ),
        ("invalid_parameter", json!({ "output": { "payload": { "validation": { "source": "payload" } } } })),
        (
            "transient_reason",
            json!({ "output": { "payload": { "errno": 999, "statusCode": 500 } }, "reason": "socket hang up" }),
        ),
        ("signature", json!({ "output": { "payload": { "statusCode": 401, "message": "Stale timestamp" } } })),
        ("unspecified", json!({ "output": {} })),
    ]
}

fn sample_context() -> RequestContext {
    serde_json::from_value(json!({
        "app": {
            "acceptLanguage": "en, fr",
            "locale": "en",
            "geo": { "city": "Mountain View", "state": "California" },
            "ua": { "os": "Android", "osVersion": "9" }
        },
        "method": "GET",
        "path": "/v1/wibble",
        "query": { "foo": "bar" },
        "payload": { "baz": "qux" },
        "headers": { "wibble": "blee" }
    }))
    .unwrap_or_default()
}

// ============================================================================
// TRANSLATION BENCHMARKS
// ============================================================================

fn bench_translate_by_family(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for (name, value) in failure_samples() {
        let failure = UpstreamFailure::from_value(&value);
        group.bench_with_input(BenchmarkId::from_parameter(name), &failure, |b, failure| {
            b.iter(|| black_box(translate(failure.clone(), None)));
        });
    }
    group.finish();
}

fn bench_parse_and_translate(c: &mut Criterion) {
    let samples = failure_samples();
    c.bench_function("parse_and_translate_json", |b| {
        b.iter(|| {
            for (_, value) in &samples {
                black_box(translate(value, None));
            }
        })
    });
}

fn bench_unspecified_with_context(c: &mut Criterion) {
    let ctx = sample_context();
    let translator = Translator::default();
    c.bench_function("unspecified_with_context", |b| {
        b.iter(|| black_box(translator.unexpected_error(Some(&ctx))))
    });
}

fn bench_passthrough(c: &mut Criterion) {
    let err = AppError::too_many_requests(RetryAfter::seconds(900).localized("in 15 minutes"));
    c.bench_function("translate_passthrough", |b| {
        b.iter(|| black_box(translate(err.clone(), None)))
    });
}

// ============================================================================
// RENDERING BENCHMARKS
// ============================================================================

fn bench_payload_serialization(c: &mut Criterion) {
    let err = AppError::unexpected_error(Some(&sample_context()));
    c.bench_function("serialize_payload_with_request", |b| {
        b.iter(|| black_box(serde_json::to_string(err.payload())))
    });
}

fn bench_to_response(c: &mut Criterion) {
    let err = AppError::missing_request_parameter("email");
    c.bench_function("to_response", |b| b.iter(|| black_box(err.to_response())));
}

criterion_group!(
    translate_benches,
    bench_translate_by_family,
    bench_parse_and_translate,
    bench_unspecified_with_context,
    bench_passthrough,
);

criterion_group!(render_benches, bench_payload_serialization, bench_to_response);

criterion_main!(translate_benches, render_benches);
