//! Quick search performance test

use evopath::{
    EvolutionEngine,
    schema::{GeneratorConfig, OperatorConfig, PopulationConfig, SearchConfig, generate_layered},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

fn main() {
    println!("=== Search Performance Test ===\n");

    // Test different graph sizes
    for node_count in [40, 200, 1000] {
        println!("Graph size: {} nodes", node_count);

        let graph = generate_layered(
            &GeneratorConfig {
                node_count,
                ..Default::default()
            },
            &mut StdRng::seed_from_u64(42),
        );

        let config = SearchConfig {
            population: PopulationConfig {
                size: 120,
                generations: 80,
                ..Default::default()
            },
            operators: OperatorConfig {
                elitism: 8,
                tournament_size: 5,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(&graph, config);
        let report = engine.run_with_callback(|_| {});
        let elapsed = start.elapsed();

        let total_evals = report.stats.candidates_evaluated;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Edges:          {}", graph.edges.len());
        println!("  Generations:    {}", report.stats.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Rejected:       {}", report.stats.candidates_rejected);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {:.4}", report.best.fitness.cost());
        println!("  Best hops:      {}", report.best.hops());
        println!();
    }

    println!("=== Scalability Test (fixed 200-node graph) ===\n");

    let graph = generate_layered(
        &GeneratorConfig {
            node_count: 200,
            ..Default::default()
        },
        &mut StdRng::seed_from_u64(42),
    );

    // Test different population sizes
    for pop_size in [30, 60, 120, 240] {
        let config = SearchConfig {
            population: PopulationConfig {
                size: pop_size,
                generations: 40,
                ..Default::default()
            },
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(&graph, config);
        let report = engine.run_with_callback(|_| {});
        let elapsed = start.elapsed();

        let total_evals = report.stats.candidates_evaluated;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec), best {:.4}",
            pop_size,
            total_evals,
            elapsed.as_secs_f64(),
            evals_per_sec,
            report.best.fitness.cost()
        );
    }
}
