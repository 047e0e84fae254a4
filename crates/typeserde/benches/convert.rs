// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion Benchmark
//!
//! Measures graph construction and per-value conversion cost:
//! - cold build of a recursive record graph
//! - build served from the shared cache
//! - decode/encode of a nested record payload

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use typeserde::descriptor::{RecordBuilder, TypeDescriptor};
use typeserde::{SerdeConfig, SerdeEngine, TypeContext, TypeRef, Wire};

fn order_context() -> (TypeContext, TypeRef) {
    let line = RecordBuilder::new("Line")
        .field("sku", TypeDescriptor::string())
        .field("qty", TypeDescriptor::int())
        .field("price", TypeDescriptor::float())
        .build();
    let order = RecordBuilder::new("Order")
        .field("id", TypeDescriptor::uuid())
        .field("placed", TypeDescriptor::datetime())
        .field("lines", TypeDescriptor::list(TypeDescriptor::reference("Line")))
        .optional_field("parent", TypeDescriptor::reference("Order"))
        .field(
            "tags",
            TypeDescriptor::dict(TypeDescriptor::string(), TypeDescriptor::string()),
        )
        .build();
    let ctx = TypeContext::new().with("Line", line).with("Order", order.clone());
    (ctx, order)
}

fn sample_order(lines: usize) -> Wire {
    let lines: Vec<Wire> = (0..lines)
        .map(|i| json!({"sku": format!("SKU-{}", i), "qty": i, "price": 9.5}))
        .collect();
    json!({
        "id": "5f0c1d2e-3a4b-4c5d-8e6f-708192a3b4c5",
        "placed": "2025-01-02T03:04:05.000006",
        "lines": lines,
        "parent": null,
        "tags": {"channel": "web"}
    })
}

fn bench_build(c: &mut Criterion) {
    let (ctx, order) = order_context();
    let cold = SerdeEngine::new(ctx.clone());
    c.bench_function("build_cold", |b| {
        b.iter(|| cold.build(black_box(&order)).expect("build"));
    });

    let cached = SerdeEngine::with_config(
        ctx,
        SerdeConfig {
            shared_cache: true,
            ..SerdeConfig::default()
        },
    );
    cached.build(&order).expect("warm cache");
    c.bench_function("build_cached", |b| {
        b.iter(|| cached.build(black_box(&order)).expect("build"));
    });
}

fn bench_convert(c: &mut Criterion) {
    let (ctx, order) = order_context();
    let pair = SerdeEngine::new(ctx).build(&order).expect("build");
    let wire = sample_order(32);
    let value = pair.decode(&wire).expect("decode");

    c.bench_function("decode_order_32_lines", |b| {
        b.iter(|| pair.decode(black_box(&wire)).expect("decode"));
    });
    c.bench_function("encode_order_32_lines", |b| {
        b.iter(|| pair.encode(black_box(&value)).expect("encode"));
    });
}

criterion_group!(benches, bench_build, bench_convert);
criterion_main!(benches);
