use std::path::PathBuf;
use std::str::FromStr;

use crate::scalarizing::ScalarizingFunction;
use crate::MoeadError;

/// Shared parameters of the decomposition engine. Every variant reads
/// these; variant-specific knobs live on the variant constructors.
#[derive(Clone, Debug)]
pub struct MoeadConfig {
    /// Number of subproblems, and thus the population size `N`.
    pub population_size: usize,
    /// Size of the returned front, `<= population_size`.
    pub result_population_size: usize,
    /// Evaluation budget. Initial population evaluations count.
    pub max_evaluations: usize,
    /// Neighborhood size `T`.
    pub neighbor_size: usize,
    /// Probability of mating within the neighborhood instead of the
    /// whole population.
    pub neighborhood_selection_probability: f64,
    /// Cap on replacements a single child may perform, `n_r`.
    pub max_replaced_solutions: usize,
    pub scalarizing: ScalarizingFunction,
    /// Directory holding `W{M}D_{N}.dat` weight files for problems with
    /// more than two objectives.
    pub data_directory: PathBuf,
    pub seed: u64,
}

impl MoeadConfig {
    pub fn new(population_size: usize, max_evaluations: usize) -> Self {
        MoeadConfig {
            population_size,
            result_population_size: population_size,
            max_evaluations,
            neighbor_size: 20,
            neighborhood_selection_probability: 0.9,
            max_replaced_solutions: 2,
            scalarizing: ScalarizingFunction::Tchebycheff,
            data_directory: PathBuf::from("moead_weights"),
            seed: 0,
        }
    }

    pub fn with_neighbor_size(mut self, t: usize) -> Self {
        self.neighbor_size = t;
        self
    }

    pub fn with_neighborhood_selection_probability(mut self, delta: f64) -> Self {
        self.neighborhood_selection_probability = delta;
        self
    }

    pub fn with_max_replaced_solutions(mut self, nr: usize) -> Self {
        self.max_replaced_solutions = nr;
        self
    }

    pub fn with_result_population_size(mut self, size: usize) -> Self {
        self.result_population_size = size;
        self
    }

    pub fn with_scalarizing(mut self, scalarizing: ScalarizingFunction) -> Self {
        self.scalarizing = scalarizing;
        self
    }

    pub fn with_data_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_directory = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the parameter combination against `mating_pool_size`
    /// distinct parents being drawable from a neighborhood row.
    pub fn validate(&self, mating_pool_size: usize) -> Result<(), MoeadError> {
        if self.population_size == 0 {
            return Err(MoeadError::Config("population size must be positive".into()));
        }
        if self.max_evaluations < self.population_size {
            return Err(MoeadError::Config(format!(
                "evaluation budget {} cannot cover the initial population of {}",
                self.max_evaluations, self.population_size
            )));
        }
        if self.neighbor_size >= self.population_size {
            return Err(MoeadError::Config(format!(
                "neighborhood size {} must be smaller than the population size {}",
                self.neighbor_size, self.population_size
            )));
        }
        // the current solution occupies one neighborhood slot
        if self.neighbor_size <= mating_pool_size {
            return Err(MoeadError::Config(format!(
                "neighborhood size {} cannot supply {} distinct parents",
                self.neighbor_size, mating_pool_size
            )));
        }
        if self.result_population_size == 0 {
            return Err(MoeadError::Config(
                "result population size must be positive".into(),
            ));
        }
        if self.result_population_size > self.population_size {
            return Err(MoeadError::Config(format!(
                "result population size {} exceeds the population size {}",
                self.result_population_size, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.neighborhood_selection_probability) {
            return Err(MoeadError::Config(format!(
                "neighborhood selection probability {} is not in [0, 1]",
                self.neighborhood_selection_probability
            )));
        }
        if self.max_replaced_solutions == 0 {
            return Err(MoeadError::Config(
                "at least one replacement per child must be allowed".into(),
            ));
        }
        Ok(())
    }
}

/// Selector for the variant factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoeadVariant {
    /// Plain decomposition with neighborhood replacement.
    Moead,
    /// Constraint handling through a decreasing violation threshold.
    MoeadConstraint,
    /// Epsilon-constrained handling with an external feasible archive.
    MoeadIEpsilon,
    /// Dynamic resource allocation by subproblem utility.
    MoeadDra,
    /// Stable matching between subproblems and a merged offspring pool.
    MoeadStm,
    /// Dominance and decomposition hybrid over non-domination levels
    /// and weight subregions.
    MoeadD,
}

impl FromStr for MoeadVariant {
    type Err = MoeadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moead" => Ok(MoeadVariant::Moead),
            "moead-constraint" | "cmoead" => Ok(MoeadVariant::MoeadConstraint),
            "moead-iepsilon" => Ok(MoeadVariant::MoeadIEpsilon),
            "moead-dra" => Ok(MoeadVariant::MoeadDra),
            "moead-stm" => Ok(MoeadVariant::MoeadStm),
            "moeadd" => Ok(MoeadVariant::MoeadD),
            other => Err(MoeadError::Config(format!("unknown variant '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = MoeadConfig::new(100, 10_000);
        assert!(config.validate(2).is_ok());
    }

    #[test]
    fn neighborhood_must_fit_in_population() {
        let config = MoeadConfig::new(10, 1_000).with_neighbor_size(10);
        assert!(config.validate(2).is_err());
    }

    #[test]
    fn neighborhood_must_cover_the_mating_pool() {
        let config = MoeadConfig::new(100, 10_000).with_neighbor_size(2);
        assert!(config.validate(2).is_err());
    }

    #[test]
    fn budget_below_population_is_rejected() {
        let config = MoeadConfig::new(100, 50);
        assert!(config.validate(2).is_err());
    }

    #[test]
    fn empty_result_population_is_rejected() {
        let config = MoeadConfig::new(100, 10_000).with_result_population_size(0);
        assert!(config.validate(2).is_err());
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let config =
            MoeadConfig::new(100, 10_000).with_neighborhood_selection_probability(1.5);
        assert!(config.validate(2).is_err());
    }

    #[test]
    fn variant_strings() {
        assert_eq!("moead".parse::<MoeadVariant>().unwrap(), MoeadVariant::Moead);
        assert_eq!(
            "moead-stm".parse::<MoeadVariant>().unwrap(),
            MoeadVariant::MoeadStm
        );
        assert_eq!(
            "cmoead".parse::<MoeadVariant>().unwrap(),
            MoeadVariant::MoeadConstraint
        );
        assert!("spea".parse::<MoeadVariant>().is_err());
    }
}
