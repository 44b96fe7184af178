//! Lookup latency benchmarks
//!
//! Item lookup should cost the same at depth 1 and at depth 10,000.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use menuguard_authz::canonical::{canonicalize_request_path, canonicalize_uri};
use menuguard_authz::{ActionKind, MenuItemDefinition, MenuNode};

fn chain(depth: usize) -> MenuNode {
    let mut menu = MenuNode::new(1, "Bench", "bench.do");
    let mut parent = None;
    for level in 0..depth {
        let url = format!("level-{}.do", level);
        let def = MenuItemDefinition::new(0, url.clone(), url, ActionKind::Page);
        parent = Some(menu.attach(def, parent).unwrap());
    }
    menu
}

fn bench_item_lookup_by_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_lookup");
    let menu = chain(10_000);

    for depth in [1usize, 100, 1_000, 10_000].iter() {
        let url = format!("level-{}.do", depth - 1);
        group.bench_with_input(BenchmarkId::new("depth", depth), &url, |b, url| {
            b.iter(|| black_box(menu.find_item_by_url(black_box(url)).unwrap()));
        });
    }

    group.bench_function("miss", |b| {
        b.iter(|| black_box(menu.find_item_by_url(black_box("nowhere.do")).unwrap()));
    });

    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");

    group.bench_function("request_path", |b| {
        b.iter(|| {
            canonicalize_request_path(
                black_box("/PBAccountPayable/menuItem.do"),
                black_box(Some("item-id=3843&menu=y")),
            )
        });
    });

    group.bench_function("uri", |b| {
        b.iter(|| canonicalize_uri(black_box("http://host/PB/menuItem.do?item-id=6876&menu=yes")));
    });

    group.finish();
}

criterion_group!(benches, bench_item_lookup_by_depth, bench_canonicalize);
criterion_main!(benches);
