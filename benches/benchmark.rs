// Benchmarks for the flat index, the encoder and the resource matcher
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docseek_core::{FlatIndex, HashingEncoder, TextEncoder, Vector};
use docseek_resources::{rank, ResourceRecord};
use rand::Rng;

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data).normalized()
}

fn benchmark_index_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_search");

    for size in [1_000usize, 10_000, 50_000].iter() {
        let vectors = (0..*size).map(|_| generate_random_vector(384)).collect();
        let index = FlatIndex::build(384, vectors).unwrap();
        let query = generate_random_vector(384);

        group.bench_with_input(BenchmarkId::new("flat_top10", size), size, |b, _| {
            b.iter(|| {
                let results = index.search(black_box(&query), 10).unwrap();
                black_box(results);
            });
        });
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let encoder = HashingEncoder::default();
    let docs: Vec<String> = (0..1000)
        .map(|i| format!("internal report number {} about network firewall and vpn setup", i))
        .collect();
    let texts: Vec<&str> = docs.iter().map(String::as_str).collect();

    c.bench_function("encode_1000_docs", |b| {
        b.iter(|| {
            let vectors = encoder.encode_normalized(black_box(&texts)).unwrap();
            black_box(vectors);
        });
    });
}

fn benchmark_resource_rank(c: &mut Criterion) {
    let records: Vec<ResourceRecord> = (0..500)
        .map(|i| {
            ResourceRecord::new(
                format!("res-{}-{}", i, if i % 3 == 0 { "web" } else { "db" }),
                if i % 2 == 0 { "Microsoft.Web/sites" } else { "Microsoft.Sql/servers" },
                "eastus",
            )
        })
        .collect();

    c.bench_function("rank_500_resources", |b| {
        b.iter(|| {
            let ranking = rank(black_box(&records), "web", None, 0.3);
            black_box(ranking.match_count());
        });
    });
}

criterion_group!(benches, benchmark_index_search, benchmark_encode, benchmark_resource_rank);
criterion_main!(benches);
