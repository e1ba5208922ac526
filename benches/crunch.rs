// SPDX-License-Identifier: MIT OR Apache-2.0

//! Benchmarks covering the two hot paths of this crate:
//! - PDL parsing (`Dep`, `FlagExpr`)
//! - the `crunch` fixed-point solver, at a few graph shapes

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, black_box, BenchmarkId, Criterion};

use crucible_resolve::{Control, Dep, Entry, FlagExpr, Graph, InMemoryRepository, Version};

fn control(name: &str, deps: Vec<Dep>) -> Control {
    Control {
        name: name.into(),
        version: Version::parse("1.0"),
        iteration: 0,
        description: String::new(),
        url: String::new(),
        src: vec![],
        arch: vec![],
        bdeps: vec![],
        deps,
        flags: vec![],
    }
}

fn templated(name: &str, deps: Vec<Dep>) -> Entry {
    let mut entry = Entry::new(control(name, deps));
    entry.template = Some(format!("/templates/{name}"));
    entry
}

// ============================================================================
// Parser benchmarks
// ============================================================================

fn bench_parse_dep_simple(c: &mut Criterion) {
    c.bench_function("parse/dep_simple", |b| {
        b.iter(|| {
            let dep: Dep = black_box("libc").parse().unwrap();
            black_box(dep);
        });
    });
}

fn bench_parse_dep_versioned(c: &mut Criterion) {
    c.bench_function("parse/dep_versioned", |b| {
        b.iter(|| {
            let dep: Dep = black_box("gcc >=4.8 <=9").parse().unwrap();
            black_box(dep);
        });
    });
}

fn bench_parse_dep_full(c: &mut Criterion) {
    c.bench_function("parse/dep_full (condition + version + flags)", |b| {
        b.iter(|| {
            let dep: Dep = black_box("[+qt && -gtk] toolkit >=2.0 <=3.0 (?theme(+dark))")
                .parse()
                .unwrap();
            black_box(dep);
        });
    });
}

fn bench_parse_flag_expr(c: &mut Criterion) {
    c.bench_function("parse/flag_expr_nested", |b| {
        b.iter(|| {
            let expr: FlagExpr = black_box("+a && (-b || +c) && ?d(+e)").parse().unwrap();
            black_box(expr);
        });
    });
}

// ============================================================================
// Solver benchmarks
// ============================================================================

fn chain_repository(depth: usize) -> InMemoryRepository {
    let mut repo = InMemoryRepository::new();
    for i in 0..depth {
        let deps = if i + 1 < depth {
            vec![Dep::named(format!("chain-{}", i + 1))]
        } else {
            vec![]
        };
        repo.add_entry(templated(&format!("chain-{i}"), deps));
    }
    repo
}

fn fan_repository(width: usize) -> InMemoryRepository {
    let mut repo = InMemoryRepository::new();
    let leaves: Vec<Dep> = (0..width).map(|i| Dep::named(format!("leaf-{i}"))).collect();
    repo.add_entry(templated("fan-root", leaves));
    for i in 0..width {
        repo.add_entry(templated(&format!("leaf-{i}"), vec![]));
    }
    repo
}

fn bench_crunch_single_node(c: &mut Criterion) {
    c.bench_function("crunch/single_node", |b| {
        b.iter(|| {
            let mut repo = InMemoryRepository::new();
            repo.add_entry(templated("app", vec![]));
            let mut graph = Graph::new("/", Arc::new(repo)).unwrap();
            graph.enable_package(Dep::named("app"));
            graph.crunch().unwrap();
            black_box(graph);
        });
    });
}

fn bench_crunch_chain_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("crunch_chain_scaling");

    for depth in [1, 5, 10, 25] {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            let repo = chain_repository(depth);
            let repo = Arc::new(repo);

            b.iter(|| {
                let mut graph = Graph::new("/", repo.clone()).unwrap();
                graph.enable_package(Dep::named("chain-0"));
                graph.crunch().unwrap();
                black_box(graph);
            });
        });
    }

    group.finish();
}

fn bench_crunch_fan_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("crunch_fan_scaling");

    for width in [1, 5, 10, 25, 50] {
        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, &width| {
            let repo = fan_repository(width);
            let repo = Arc::new(repo);

            b.iter(|| {
                let mut graph = Graph::new("/", repo.clone()).unwrap();
                graph.enable_package(Dep::named("fan-root"));
                graph.crunch().unwrap();
                black_box(graph);
            });
        });
    }

    group.finish();
}

criterion_group!(
    parser_benches,
    bench_parse_dep_simple,
    bench_parse_dep_versioned,
    bench_parse_dep_full,
    bench_parse_flag_expr,
);

criterion_group!(
    solver_benches,
    bench_crunch_single_node,
    bench_crunch_chain_scaling,
    bench_crunch_fan_scaling,
);

criterion_main!(parser_benches, solver_benches);
