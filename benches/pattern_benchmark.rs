use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dromos::cache::PatternCache;
use dromos::pattern::{compile, match_template};

fn pattern_compile_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_compile");

    for template in ["/home", "/home/{id}", "/data/{id}/user/{user_id}"].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(template), template, |b, &template| {
            b.iter(|| compile(black_box(template)));
        });
    }

    group.finish();
}

fn pattern_match_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_match");

    let cases = [
        ("exact", "/home", "/home"),
        ("single", "/home/{id}", "/home/42"),
        ("double", "/data/{id}/user/{user_id}", "/data/7/user/9"),
        ("miss", "/data/{id}/user/{user_id}", "/data/7/group/9"),
    ];
    for (name, template, path) in cases.iter() {
        let pattern = compile(template).unwrap();
        group.bench_function(BenchmarkId::new("compiled", name), |b| {
            b.iter(|| pattern.matches(black_box(path)));
        });
        group.bench_function(BenchmarkId::new("uncached", name), |b| {
            b.iter(|| match_template(black_box(template), black_box(path)));
        });
    }

    group.finish();
}

fn pattern_cache_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_cache");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut cache = PatternCache::from_capacity(size);
            let templates: Vec<String> = (0..size).map(|i| format!("/r{}/{{id}}", i)).collect();
            for template in &templates {
                let _ = cache.find_or_compile(template);
            }

            b.iter(|| {
                for template in &templates {
                    let _ = cache.find_or_compile(black_box(template));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    pattern_compile_benchmark,
    pattern_match_benchmark,
    pattern_cache_benchmark
);
criterion_main!(benches);
