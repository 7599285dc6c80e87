//! Binding benchmarks - signature binding and path resolution.
//!
//! These benchmarks measure the per-call work a stub does before any
//! network I/O: binding call arguments against a route signature and
//! substituting them into the path template.

use std::hint::black_box;
use std::sync::Arc;

use cirrus::{CallArgs, DefinitionBuilder, InterfaceDefinition, PreparedRequest, RouteDeclaration};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;

fn definition() -> Arc<InterfaceDefinition> {
    DefinitionBuilder::new("Bench")
        .route(RouteDeclaration::get("ping", "/ping"))
        .unwrap()
        .route(
            RouteDeclaration::get("get_item", "/users/{user}/items/{id}")
                .param("user")
                .param("id")
                .param_default("verbose", false),
        )
        .unwrap()
        .route(
            RouteDeclaration::post("create", "/users/{user}/items")
                .with_body()
                .param("user")
                .param("name")
                .param_default("tags", json!([])),
        )
        .unwrap()
        .build()
}

/// Benchmark signature binding with positional and keyword arguments.
fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");
    let definition = definition();
    let route = definition.route("get_item").unwrap();

    group.bench_function("positional", |b| {
        b.iter(|| {
            let args = CallArgs::new().arg("alice").arg(42);
            black_box(route.signature().bind("get_item", args).unwrap());
        });
    });

    group.bench_function("keyword", |b| {
        b.iter(|| {
            let args = CallArgs::new().kwarg("id", 42).kwarg("user", "alice");
            black_box(route.signature().bind("get_item", args).unwrap());
        });
    });

    group.finish();
}

/// Benchmark path resolution at various value lengths.
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let definition = definition();
    let route = definition.route("get_item").unwrap();

    for len in [4, 64, 1024] {
        let user = "a/b ".repeat(len / 4);
        let args = route
            .signature()
            .bind("get_item", CallArgs::new().arg(user).arg(42))
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(len), &args, |b, args| {
            b.iter(|| black_box(route.path().resolve("get_item", black_box(args)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark full request preparation for each transmission style.
fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare");
    let definition = definition();

    let cases = [
        ("no_params", "ping", CallArgs::new()),
        ("query", "get_item", CallArgs::new().arg("alice").arg(42).arg(true)),
        (
            "body",
            "create",
            CallArgs::new()
                .arg("alice")
                .arg("lamp")
                .kwarg("tags", json!(["home", "light"])),
        ),
    ];

    for (label, name, call) in cases {
        let route = definition.route(name).unwrap();
        let args = route.signature().bind(name, call).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(label), &args, |b, args| {
            b.iter(|| black_box(PreparedRequest::prepare(route, black_box(args)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bind, bench_resolve, bench_prepare);

criterion_main!(benches);
