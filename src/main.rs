//! Evopath CLI - Search a network graph for a low-cost path.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use rand::SeedableRng;
use rand::rngs::StdRng;

use evopath::{
    compute::{EvolutionEngine, evolution::ProgressCallback},
    schema::{
        Edge, GeneratorConfig, Graph, Node, NodeKind, PathExport, SearchConfig, SearchProgress,
        generate_layered,
    },
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example(),
        "--generate" => generate(&args),
        _ => search(&args),
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <graph.json> [output.json]", program);
    eprintln!("       {} --generate <nodes> <out.json> [seed]", program);
    eprintln!("       {} --example", program);
    eprintln!();
    eprintln!("Search a network graph for a low-cost start-to-end path.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  graph.json   Path to the network graph file");
    eprintln!("  output.json  Where to write the best path (default: best_path.json");
    eprintln!("               next to the graph)");
    eprintln!();
    eprintln!("Search settings are read from <graph>.search.json when present.");
}

fn search(args: &[String]) {
    let graph_path = PathBuf::from(&args[1]);
    let output_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(&graph_path));

    let graph = Graph::load(&graph_path).unwrap_or_else(|e| {
        eprintln!("Error loading graph: {}", e);
        process::exit(1);
    });

    // Optional search settings
    let config_path = graph_path.with_extension("search.json");
    let config: SearchConfig = if config_path.exists() {
        let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
            eprintln!("Error reading search config: {}", e);
            process::exit(1);
        });
        serde_json::from_str(&config_str).unwrap_or_else(|e| {
            eprintln!("Error parsing search config: {}", e);
            process::exit(1);
        })
    } else {
        SearchConfig::default()
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid search config: {}", e);
        process::exit(1);
    }

    println!("Evolutionary Path Search");
    println!("========================");
    println!(
        "Graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    println!("Route: {} -> {}", graph.start_node, graph.end_node);
    println!(
        "Population: {} x {} generations",
        config.population.size, config.population.generations
    );
    println!();

    let report_progress: ProgressCallback = Box::new(|progress: &SearchProgress| {
        log::info!(
            "Generation {}/{}: best={:.3} gen_best={:.3} avg={:.3} len={}",
            progress.generation,
            progress.total_generations,
            progress.best_fitness,
            progress.generation_best,
            progress.avg_fitness,
            progress.best_path_len
        );
    });

    let mut engine = EvolutionEngine::new(&graph, config);
    let report = engine.run_with_callback(report_progress);

    if report.is_feasible() {
        println!("Best path: {:?}", report.best.path);
        println!("  Fitness: {:.6}", report.best.fitness.cost());
        println!("  Hops: {}", report.best.hops());
    } else {
        println!(
            "No path from {} to {}; writing degenerate result",
            graph.start_node, graph.end_node
        );
    }
    println!(
        "Evaluated {} candidates ({} rejected, {} backfilled) in {:.2}s",
        report.stats.candidates_evaluated,
        report.stats.candidates_rejected,
        report.stats.backfilled,
        report.stats.elapsed_seconds
    );

    if let Err(e) = PathExport::from(&report.best).save(&output_path) {
        eprintln!("Error writing result: {}", e);
        process::exit(1);
    }
    println!("Saved best path to {}", output_path.display());
}

fn default_output(graph_path: &Path) -> PathBuf {
    graph_path
        .parent()
        .map(|dir| dir.join("best_path.json"))
        .unwrap_or_else(|| PathBuf::from("best_path.json"))
}

fn generate(args: &[String]) {
    let (Some(nodes), Some(out)) = (args.get(2), args.get(3)) else {
        print_usage(&args[0]);
        process::exit(1);
    };

    let node_count: usize = nodes.parse().unwrap_or_else(|e| {
        eprintln!("Invalid node count {:?}: {}", nodes, e);
        process::exit(1);
    });
    let seed: u64 = match args.get(4) {
        Some(s) => s.parse().unwrap_or_else(|e| {
            eprintln!("Invalid seed {:?}: {}", s, e);
            process::exit(1);
        }),
        None => rand::random(),
    };

    let config = GeneratorConfig {
        node_count,
        ..Default::default()
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid generator settings: {}", e);
        process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let graph = generate_layered(&config, &mut rng);

    if let Err(e) = graph.save(out) {
        eprintln!("Error writing graph: {}", e);
        process::exit(1);
    }
    println!(
        "Generated {} nodes, {} edges (seed {}) -> {}",
        graph.nodes.len(),
        graph.edges.len(),
        seed,
        out
    );
}

fn print_example() {
    let graph = Graph::new(
        vec![
            Node::new(0, NodeKind::Pc, 120.0),
            Node::new(1, NodeKind::Gateway, 300.0),
            Node::new(2, NodeKind::Compute, 850.0),
            Node::new(3, NodeKind::Storage, 400.0),
            Node::new(4, NodeKind::Server, 600.0),
        ],
        vec![
            Edge::new(0, 1, 2.0, 8.0),
            Edge::new(1, 2, 3.5, 6.0),
            Edge::new(1, 3, 1.5, 2.0),
            Edge::new(2, 4, 2.0, 9.0),
            Edge::new(3, 4, 4.0, 5.0),
        ],
        0,
        4,
    );

    println!("Example graph (network.json):");
    match graph.to_json_string() {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error encoding graph: {}", e),
    }
    println!();
    println!("Example search config (network.search.json):");
    match serde_json::to_string_pretty(&SearchConfig::default()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error encoding config: {}", e),
    }
}
