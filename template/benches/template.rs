//! This benchmark measures the compilation of URI templates,
//! and their use for expansion and matching.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;
use urikit_template::UriTemplate;

fn compile(c: &mut Criterion) {
    c.bench_with_input(BenchmarkId::new("compile", ""), black_box(&TEMPLATES), |b, &i| {
        b.iter(|| {
            for (template, _) in i {
                black_box(UriTemplate::new(template).is_ok());
            }
        });
    });
}

fn expand(c: &mut Criterion) {
    let templates: Vec<_> = TEMPLATES
        .iter()
        .map(|(t, _)| UriTemplate::new(*t).unwrap())
        .collect();
    let vars: HashMap<_, _> = [
        ("hotel", "Rest & Relax"),
        ("booking", "42"),
        ("id", "1234"),
        ("q", "a b&c"),
        ("page", "2"),
    ]
    .into_iter()
    .collect();
    c.bench_with_input(BenchmarkId::new("expand", ""), black_box(&templates), |b, i| {
        b.iter(|| {
            for template in i {
                black_box(template.expand(&vars).is_ok());
            }
        });
    });
}

fn match_uri(c: &mut Criterion) {
    let templates: Vec<_> = TEMPLATES
        .iter()
        .map(|(t, candidate)| (UriTemplate::new(*t).unwrap(), *candidate))
        .collect();
    c.bench_with_input(BenchmarkId::new("match", ""), black_box(&templates), |b, i| {
        b.iter(|| {
            for (template, candidate) in i {
                black_box(template.match_uri(candidate));
            }
        });
    });
}

criterion_group!(benches, compile, expand, match_uri);
criterion_main!(benches);

/// Templates, with a URI matching each of them.
const TEMPLATES: [(&str, &str); 4] = [
    (
        "http://example.com/hotels/{hotel}/bookings/{booking}",
        "http://example.com/hotels/1/bookings/42",
    ),
    ("/items/{id:[0-9]+}", "/items/1234"),
    (
        "https://example.com/search?q={q}&page={page}",
        "https://example.com/search?q=rust&page=2",
    ),
    ("/archive/{id:[0-9]{4}}/{q}", "/archive/2024/hello"),
];
