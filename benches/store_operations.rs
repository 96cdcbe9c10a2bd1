//! Benchmark suite for store operations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gldb::graph::ROOT_CLASS;
use gldb::storage::{Text, TextStore};
use gldb::{Graph, GraphOptions, Owner, Value};
use tempfile::TempDir;

fn create_test_graph(vertex_count: usize) -> (TempDir, Graph, Vec<u32>) {
    let dir = TempDir::new().unwrap();
    let mut graph = Graph::create(dir.path().join("bench"), "bench", GraphOptions::default()).unwrap();
    let ids = (0..vertex_count).map(|_| graph.add_vertex(ROOT_CLASS).unwrap().id).collect();
    (dir, graph, ids)
}

fn bench_label_interning(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_label");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let values: Vec<String> = (0..size).map(|i| format!("label_{:06}", i)).collect();
            b.iter(|| {
                let (_dir, mut graph, _) = create_test_graph(0);
                for value in &values {
                    black_box(graph.add_label(value).unwrap());
                }
                graph.write().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_find_label(c: &mut Criterion) {
    let (_dir, mut graph, _) = create_test_graph(0);
    for i in 0..10000 {
        graph.add_label(&format!("label_{:06}", i)).unwrap();
    }
    graph.write().unwrap();

    c.bench_function("find_label_10k", |b| {
        b.iter(|| black_box(graph.find_label("label_005000").unwrap()));
    });
}

fn bench_vertices_and_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_edges_and_flush");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let (_dir, mut graph, ids) = create_test_graph(size);
                for (i, &from) in ids.iter().enumerate() {
                    let to = ids[(i + 1) % ids.len()];
                    graph.add_edge(from, to, "CALLS").unwrap();
                }
                graph.write().unwrap();
            });
        });
    }

    group.finish();
}

fn bench_attributes(c: &mut Criterion) {
    c.bench_function("set_attribute_1000", |b| {
        b.iter(|| {
            let (_dir, mut graph, ids) = create_test_graph(1000);
            for &id in &ids {
                graph.set_attribute(Owner::Vertex(id), "weight", Value::Integer(id as i64)).unwrap();
                graph.set_attribute(Owner::Vertex(id), "name", Value::Text(format!("v{}", id))).unwrap();
            }
            graph.write().unwrap();
        });
    });
}

fn bench_text_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_add_write");

    for len in [8, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let blob = vec![b'x'; len];
            b.iter(|| {
                let dir = TempDir::new().unwrap();
                let mut store =
                    TextStore::create(&dir.path().join("text.gl"), &dir.path().join("text.id.gl"), 16).unwrap();
                for _ in 0..1000 {
                    let mut text = Text::new(blob.clone());
                    black_box(store.add_text(&mut text));
                }
                store.write().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_label_interning,
    bench_find_label,
    bench_vertices_and_edges,
    bench_attributes,
    bench_text_store
);
criterion_main!(benches);
