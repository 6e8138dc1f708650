//! Configuration types for evolutionary path search.

use serde::{Deserialize, Serialize};

/// Top-level search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Population and generation budget.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Selection, crossover and mutation settings.
    #[serde(default)]
    pub operators: OperatorConfig,
    /// Random walk settings used to seed the population.
    #[serde(default)]
    pub walk: WalkConfig,
    /// Fitness term weights.
    #[serde(default)]
    pub weights: FitnessWeights,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Population size, generation count and attempt budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in every generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of generations to evolve.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Random walks tried while seeding the initial population.
    #[serde(default = "default_max_init_attempts")]
    pub max_init_attempts: usize,
    /// Children tried per generation before backfilling.
    #[serde(default = "default_max_evolve_attempts")]
    pub max_evolve_attempts: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
            max_init_attempts: default_max_init_attempts(),
            max_evolve_attempts: default_max_evolve_attempts(),
        }
    }
}

fn default_population_size() -> usize {
    120
}
fn default_generations() -> usize {
    80
}
fn default_max_init_attempts() -> usize {
    5000
}
fn default_max_evolve_attempts() -> usize {
    8000
}

/// Genetic operator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Best individuals copied unchanged into the next generation.
    #[serde(default = "default_elitism")]
    pub elitism: usize,
    /// Candidates drawn per tournament.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Probability that a child is mutated (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Share of mutations that truncate and repair; the rest swap two
    /// interior nodes (0.0-1.0).
    #[serde(default = "default_truncate_share")]
    pub truncate_share: f64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            elitism: default_elitism(),
            tournament_size: default_tournament_size(),
            mutation_rate: default_mutation_rate(),
            truncate_share: default_truncate_share(),
        }
    }
}

fn default_elitism() -> usize {
    8
}
fn default_tournament_size() -> usize {
    5
}
fn default_mutation_rate() -> f64 {
    0.35
}
fn default_truncate_share() -> f64 {
    0.7
}

/// Randomized walk settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Steps taken before falling back to a shortest-path repair.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Chance of accepting a step into an already visited node.
    #[serde(default = "default_revisit_probability")]
    pub revisit_probability: f64,
    /// Redraws when the drawn neighbor was already visited.
    #[serde(default = "default_revisit_retries")]
    pub revisit_retries: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            revisit_probability: default_revisit_probability(),
            revisit_retries: default_revisit_retries(),
        }
    }
}

fn default_max_steps() -> usize {
    60
}
fn default_revisit_probability() -> f64 {
    0.1
}
fn default_revisit_retries() -> usize {
    5
}

/// Weights of the fitness terms.
///
/// `cost = latency * L + hops * H + bandwidth * B + loops * P - performance * F`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessWeights {
    #[serde(default = "default_latency_weight")]
    pub latency: f64,
    #[serde(default = "default_hops_weight")]
    pub hops: f64,
    /// Weight of the summed `latency / bandwidth` congestion proxy.
    #[serde(default = "default_bandwidth_weight")]
    pub bandwidth: f64,
    #[serde(default = "default_loops_weight")]
    pub loops: f64,
    #[serde(default = "default_performance_weight")]
    pub performance: f64,
    /// Cost charged for each repeated visit of a node.
    #[serde(default = "default_loop_penalty")]
    pub loop_penalty: f64,
    /// Multiplier on `ln(1 + average performance)`.
    #[serde(default = "default_performance_scale")]
    pub performance_scale: f64,
    /// Lower clamp applied to edge latency and bandwidth.
    #[serde(default = "default_floor")]
    pub floor: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            latency: default_latency_weight(),
            hops: default_hops_weight(),
            bandwidth: default_bandwidth_weight(),
            loops: default_loops_weight(),
            performance: default_performance_weight(),
            loop_penalty: default_loop_penalty(),
            performance_scale: default_performance_scale(),
            floor: default_floor(),
        }
    }
}

fn default_latency_weight() -> f64 {
    1.0
}
fn default_hops_weight() -> f64 {
    2.5
}
fn default_bandwidth_weight() -> f64 {
    25.0
}
fn default_loops_weight() -> f64 {
    1.0
}
fn default_performance_weight() -> f64 {
    1.0
}
fn default_loop_penalty() -> f64 {
    50.0
}
fn default_performance_scale() -> f64 {
    2.0
}
fn default_floor() -> f64 {
    0.001
}

impl SearchConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population.size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.operators.elitism > self.population.size {
            return Err(ConfigError::EliteOverflow {
                elitism: self.operators.elitism,
                size: self.population.size,
            });
        }
        if self.operators.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }

        let check_probability = |value: f64, name: &str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidProbability {
                    name: name.to_string(),
                    value,
                })
            }
        };
        check_probability(self.operators.mutation_rate, "mutation_rate")?;
        check_probability(self.operators.truncate_share, "truncate_share")?;
        check_probability(self.walk.revisit_probability, "revisit_probability")?;

        self.weights.validate()
    }
}

impl FitnessWeights {
    /// Weights must be finite and non-negative; the floor must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("latency", self.latency),
            ("hops", self.hops),
            ("bandwidth", self.bandwidth),
            ("loops", self.loops),
            ("performance", self.performance),
            ("loop_penalty", self.loop_penalty),
            ("performance_scale", self.performance_scale),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if !self.floor.is_finite() || self.floor <= 0.0 {
            return Err(ConfigError::InvalidFloor(self.floor));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Elitism ({elitism}) exceeds population size ({size})")]
    EliteOverflow { elitism: usize, size: usize },
    #[error("Tournament size must be non-zero")]
    EmptyTournament,
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: String, value: f64 },
    #[error("Weight {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: String, value: f64 },
    #[error("Clamp floor must be positive, got {0}")]
    InvalidFloor(f64),
    #[error("Generator needs at least one node and one layer")]
    EmptyGenerator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.size, 120);
        assert_eq!(config.population.generations, 80);
        assert_eq!(config.operators.elitism, 8);
        assert_eq!(config.weights.hops, 2.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "population": { "size": 30 }, "random_seed": 9 }"#;
        let config: SearchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.population.size, 30);
        assert_eq!(config.population.generations, 80);
        assert_eq!(config.operators.tournament_size, 5);
        assert_eq!(config.walk.max_steps, 60);
        assert_eq!(config.random_seed, Some(9));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = SearchConfig::default();
        config.population.size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPopulation)
        ));

        let mut config = SearchConfig::default();
        config.operators.elitism = 500;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EliteOverflow { .. })
        ));

        let mut config = SearchConfig::default();
        config.operators.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { .. })
        ));

        let mut config = SearchConfig::default();
        config.weights.bandwidth = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight { .. })
        ));

        let mut config = SearchConfig::default();
        config.weights.floor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFloor(_))));
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population.size, config.population.size);
        assert_eq!(parsed.weights.loop_penalty, config.weights.loop_penalty);
    }
}
