use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonbind::{from_str, parse, record, to_string, Builder, Registry, Value};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

record!(Product { sku, name, price, quantity });

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for size in [10, 100, 1000].iter() {
        let text = to_string(&products(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_parse_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_strings");

    let plain = format!("\"{}\"", "plain ascii text ".repeat(32));
    let escaped = format!("\"{}\"", r"tab\t quote\" emoji 🤠 ".repeat(32));

    group.bench_function("plain", |b| b.iter(|| parse(black_box(&plain))));
    group.bench_function("escaped", |b| b.iter(|| parse(black_box(&escaped))));
    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [10, 100, 1000].iter() {
        let value = parse(&to_string(&products(*size)).unwrap()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| black_box(value).to_string())
        });
    }
    group.finish();
}

fn benchmark_builder(c: &mut Criterion) {
    let paths: Vec<(String, Value)> = (0..100)
        .map(|i| (format!("servers[{}].ports[{}]", i / 4, i % 4), Value::Int(i)))
        .collect();

    c.bench_function("builder_100_paths", |b| {
        b.iter(|| {
            let mut builder = Builder::new();
            for (path, value) in &paths {
                builder.set(path, value.clone());
            }
            builder.build()
        })
    });
}

fn benchmark_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    let registry = Registry::new();
    let items = products(100);
    let text = registry.marshal_to_string(&items).unwrap();

    group.bench_function("marshal_records", |b| {
        b.iter(|| registry.marshal(black_box(&items)))
    });
    group.bench_function("unmarshal_records", |b| {
        b.iter(|| registry.unmarshal_str::<Vec<Product>>(black_box(&text)))
    });
    group.bench_function("serde_to_string", |b| b.iter(|| to_string(black_box(&items))));
    group.bench_function("serde_from_str", |b| {
        b.iter(|| from_str::<Vec<Product>>(black_box(&text)))
    });
    group.bench_function("cold_lookup", |b| {
        b.iter(|| Registry::new().marshaller::<Vec<Product>>().map(|_| ()))
    });
    group.finish();
}

fn benchmark_comparison_with_serde_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    let text = to_string(&products(100)).unwrap();

    group.bench_function("jsonbind_parse", |b| b.iter(|| parse(black_box(&text))));
    group.bench_function("serde_json_parse", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&text)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_parse_strings,
    benchmark_render,
    benchmark_builder,
    benchmark_registry,
    benchmark_comparison_with_serde_json
);
criterion_main!(benches);
