//! Benchmarks for path evaluation and evolutionary search.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use evopath::{
    compute::{Adjacency, EvolutionEngine, FitnessEvaluator},
    schema::{GeneratorConfig, Graph, PopulationConfig, SearchConfig, generate_layered},
};

fn network(node_count: usize) -> Graph {
    let config = GeneratorConfig {
        node_count,
        ..Default::default()
    };
    generate_layered(&config, &mut StdRng::seed_from_u64(42))
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    for nodes in [40, 200, 1000] {
        let graph = network(nodes);
        let evaluator = FitnessEvaluator::new(&graph, Default::default());
        let mut rng = StdRng::seed_from_u64(7);
        let path = evaluator.adjacency().random_walk(
            graph.start_node,
            graph.end_node,
            &Default::default(),
            &mut rng,
        );

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| evaluator.evaluate(black_box(&path)));
        });
    }

    group.finish();
}

fn bench_random_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_walk");

    for nodes in [40, 200, 1000] {
        let graph = network(nodes);
        let adjacency = Adjacency::build(&graph);
        let walk = Default::default();
        let mut rng = StdRng::seed_from_u64(7);

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| {
                adjacency.random_walk(
                    black_box(graph.start_node),
                    graph.end_node,
                    &walk,
                    &mut rng,
                )
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for nodes in [40, 200, 1000] {
        let graph = network(nodes);
        let config = SearchConfig {
            population: PopulationConfig {
                size: 60,
                generations: 20,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, _| {
            b.iter(|| {
                let mut engine = EvolutionEngine::new(black_box(&graph), config.clone());
                engine.run()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_random_walk, bench_search);
criterion_main!(benches);
