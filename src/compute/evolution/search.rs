//! Generational search loop.

use std::collections::HashSet;
use std::time::Instant;

use rand::prelude::*;

use crate::schema::{
    Graph, INVALID_COST, Individual, NodeId, SearchConfig, SearchError, SearchHistory,
    SearchProgress, SearchReport, SearchStats, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::operators::PathRng;

/// Progress callback type.
pub type ProgressCallback = Box<dyn Fn(&SearchProgress) + Send + Sync>;

/// Evolution engine that searches for a cheap start-to-end path.
///
/// Every individual admitted to the population is a walk in the graph that
/// begins at the start node and ends at the end node. The population is kept
/// sorted by ascending cost and has a fixed size across the run.
pub struct EvolutionEngine<'g, R = StdRng> {
    config: SearchConfig,
    rng: PathRng<R>,
    evaluator: FitnessEvaluator<'g>,
    population: Vec<Individual>,
    best: Option<Individual>,
    history: SearchHistory,
    generation: usize,
    evaluated: u64,
    rejected: u64,
    backfilled: u64,
}

impl<'g> EvolutionEngine<'g, StdRng> {
    /// Create a new evolution engine, seeded from `config.random_seed` when
    /// set.
    pub fn new(graph: &'g Graph, config: SearchConfig) -> Self {
        let seed = config.random_seed.unwrap_or_else(rand::random);
        Self::with_rng(graph, config, StdRng::seed_from_u64(seed))
    }
}

impl<'g, R: Rng> EvolutionEngine<'g, R> {
    /// Create an engine driven by the given generator.
    pub fn with_rng(graph: &'g Graph, config: SearchConfig, rng: R) -> Self {
        let evaluator = FitnessEvaluator::new(graph, config.weights.clone());

        Self {
            config,
            rng: PathRng::from_rng(rng),
            evaluator,
            population: Vec::new(),
            best: None,
            history: SearchHistory::default(),
            generation: 0,
            evaluated: 0,
            rejected: 0,
            backfilled: 0,
        }
    }

    /// Current population, cheapest first.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Best individual seen so far.
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    /// Generations evolved since initialization.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn graph(&self) -> &'g Graph {
        self.evaluator.graph()
    }

    /// Seed the population.
    ///
    /// The shortest start-to-end path is always the first member. The rest
    /// are random walks that pass finalization; if the attempt budget runs
    /// out first, the remaining slots are filled with copies of existing
    /// members. Fails when the end node is unreachable.
    pub fn initialize(&mut self) -> Result<(), SearchError> {
        let graph = self.graph();
        let (start, end) = (graph.start_node, graph.end_node);

        self.population.clear();
        self.best = None;
        self.history = SearchHistory::default();
        self.generation = 0;
        self.evaluated = 0;
        self.rejected = 0;
        self.backfilled = 0;

        let seed_path = self.evaluator.adjacency().shortest_path(start, end);
        if seed_path.is_empty() {
            return Err(SearchError::Infeasible { start, end });
        }

        let size = self.config.population.size;
        self.population.reserve(size);

        let fitness = self.evaluator.evaluate(&seed_path);
        self.evaluated += 1;
        self.population.push(Individual::new(seed_path, fitness));

        let mut attempts = 0;
        while self.population.len() < size && attempts < self.config.population.max_init_attempts
        {
            attempts += 1;

            let path = self.evaluator.adjacency().random_walk(
                start,
                end,
                &self.config.walk,
                self.rng.inner(),
            );
            if path.is_empty() {
                continue;
            }
            if let Some(individual) = self.finalize(path) {
                self.population.push(individual);
            }
        }
        log::debug!(
            "Seeded {} of {} individuals in {} attempts",
            self.population.len(),
            size,
            attempts
        );

        let mut population = std::mem::take(&mut self.population);
        let source = population.clone();
        self.backfill(&mut population, &source, size);
        sort_population(&mut population);
        self.best = population.first().cloned();
        self.population = population;

        log::info!(
            "Initial population: {} | best seed fitness: {:.3}",
            self.population.len(),
            self.best_cost()
        );
        Ok(())
    }

    /// Force the start node, repair to the end node, validate and score.
    /// Returns `None` for a candidate that cannot be admitted.
    fn finalize(&mut self, mut path: Vec<NodeId>) -> Option<Individual> {
        self.evaluated += 1;
        let individual = self.try_finalize(&mut path);
        if individual.is_none() {
            self.rejected += 1;
        }
        individual
    }

    fn try_finalize(&self, path: &mut Vec<NodeId>) -> Option<Individual> {
        let graph = self.graph();
        let adjacency = self.evaluator.adjacency();

        let first = path.first_mut()?;
        *first = graph.start_node;

        if path.last() != Some(&graph.end_node) && !adjacency.repair_to_end(path, graph.end_node)
        {
            return None;
        }
        if !adjacency.is_valid_path(path) {
            return None;
        }

        let fitness = self.evaluator.evaluate(path);
        fitness
            .is_admissible()
            .then(|| Individual::new(std::mem::take(path), fitness))
    }

    /// Fill `target` up to `size` with random copies from `source`.
    fn backfill(&mut self, target: &mut Vec<Individual>, source: &[Individual], size: usize) {
        let missing = size.saturating_sub(target.len());
        if missing == 0 {
            return;
        }
        log::warn!(
            "Attempt budget exhausted, backfilling {} of {} slots",
            missing,
            size
        );
        while target.len() < size {
            let Some(idx) = self.rng.index(source.len()) else {
                break;
            };
            target.push(source[idx].clone());
            self.backfilled += 1;
        }
    }

    /// Evolve one generation.
    ///
    /// Builds the next population in a fresh buffer: elites first, then
    /// finalized children of tournament-selected parents, then resampled
    /// members of the current population if the attempt budget runs out.
    pub fn step_generation(&mut self) {
        if self.population.is_empty() {
            return;
        }

        let size = self.config.population.size;
        let ops = self.config.operators.clone();
        let (start, end) = (self.graph().start_node, self.graph().end_node);

        let mut next = Vec::with_capacity(size);
        next.extend(self.population.iter().take(ops.elitism.min(size)).cloned());

        let mut attempts = 0;
        while next.len() < size && attempts < self.config.population.max_evolve_attempts {
            attempts += 1;

            let (Some(a), Some(b)) = (
                self.rng.tournament(&self.population, ops.tournament_size),
                self.rng.tournament(&self.population, ops.tournament_size),
            ) else {
                break;
            };

            let mut child =
                self.rng
                    .crossover(&self.population[a].path, &self.population[b].path, start);
            self.rng
                .mutate(&mut child, self.evaluator.adjacency(), end, &ops);

            if let Some(individual) = self.finalize(child) {
                next.push(individual);
            }
        }

        let current = std::mem::take(&mut self.population);
        self.backfill(&mut next, &current, size);
        sort_population(&mut next);
        self.population = next;
        self.generation += 1;

        if let Some(leader) = self.population.first()
            && self
                .best
                .as_ref()
                .is_none_or(|best| leader.fitness.is_better_than(&best.fitness))
        {
            self.best = Some(leader.clone());
        }

        self.record_history();
    }

    fn record_history(&mut self) {
        let best = self.best_cost();
        let (avg, std) = cost_summary(&self.population);
        let distinct: HashSet<&[NodeId]> =
            self.population.iter().map(|ind| ind.path.as_slice()).collect();

        self.history.best_fitness.push(best);
        self.history.avg_fitness.push(avg);
        self.history.fitness_std.push(std);
        self.history.distinct_paths.push(distinct.len());
    }

    fn best_cost(&self) -> f64 {
        self.best
            .as_ref()
            .map_or(INVALID_COST, |best| best.fitness.cost())
    }

    /// Get current progress.
    pub fn progress(&self) -> SearchProgress {
        let (avg_fitness, _) = cost_summary(&self.population);
        SearchProgress {
            generation: self.generation,
            total_generations: self.config.population.generations,
            best_fitness: self.best_cost(),
            generation_best: self
                .population
                .first()
                .map_or(INVALID_COST, |ind| ind.fitness.cost()),
            avg_fitness,
            best_path_len: self.best.as_ref().map_or(0, |best| best.path.len()),
        }
    }

    /// Run the full search, reporting progress after initialization and
    /// after every generation.
    ///
    /// An unreachable end node is not an error: the report carries the
    /// degenerate individual `[start]` with invalid fitness.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> SearchReport
    where
        F: FnMut(&SearchProgress),
    {
        let start_time = Instant::now();
        let start = self.graph().start_node;

        let stop_reason = match self.initialize() {
            Ok(()) => {
                callback(&self.progress());
                while self.generation < self.config.population.generations {
                    self.step_generation();
                    callback(&self.progress());
                }
                StopReason::Completed
            }
            Err(err) => {
                log::warn!("{err}");
                StopReason::Infeasible
            }
        };

        let best = match (&self.best, stop_reason) {
            (Some(best), StopReason::Completed) => best.clone(),
            _ => Individual::infeasible(start),
        };

        SearchReport {
            best,
            stats: SearchStats {
                generations: self.generation,
                candidates_evaluated: self.evaluated,
                candidates_rejected: self.rejected,
                backfilled: self.backfilled,
                elapsed_seconds: start_time.elapsed().as_secs_f64(),
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run evolution and return the best individual found.
    pub fn run(&mut self) -> Individual {
        self.run_with_callback(|_| {}).best
    }
}

fn sort_population(population: &mut [Individual]) {
    population.sort_by(|a, b| a.fitness.compare(&b.fitness));
}

/// Mean and standard deviation of population cost.
fn cost_summary(population: &[Individual]) -> (f64, f64) {
    if population.is_empty() {
        return (INVALID_COST, 0.0);
    }
    let n = population.len() as f64;
    let mean = population.iter().map(|ind| ind.fitness.cost()).sum::<f64>() / n;
    let variance = population
        .iter()
        .map(|ind| (ind.fitness.cost() - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
