use log::{debug, info};

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::{MoeadCore, ThresholdReplacement};
use crate::optimizers::Optimizer;
use crate::solution::FloatSolution;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// Constraint-handling MOEA/D with an adaptive violation threshold.
///
/// Pairs whose violations both sit within the threshold compete on
/// fitness as usual; otherwise the less violating solution wins
/// outright, and such wins do not consume replacement slots. The
/// threshold tracks the population's mean violation degree and is
/// recomputed once per generation, so it relaxes while the population
/// is mostly infeasible and tightens toward zero as it becomes
/// feasible.
pub struct ConstraintMoead {
    core: MoeadCore,
    threshold: f64,
    result: Vec<FloatSolution>,
}

impl ConstraintMoead {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        ConstraintMoead::with_operators(
            problem,
            config,
            Box::new(DifferentialEvolutionCrossover::default()),
            Box::new(mutation),
        )
    }

    pub fn with_operators(
        problem: Box<dyn Problem>,
        config: MoeadConfig,
        crossover: Box<dyn CrossoverOperator>,
        mutation: Box<dyn MutationOperator>,
    ) -> Result<Self, MoeadError> {
        Ok(ConstraintMoead {
            core: MoeadCore::new(problem, config, crossover, mutation)?,
            threshold: 0.0,
            result: Vec::new(),
        })
    }

    fn mean_violation(&self) -> f64 {
        let sum: f64 = self
            .core
            .population
            .iter()
            .map(|s| s.violation_degree())
            .sum();
        sum / self.core.population.len() as f64
    }
}

impl Optimizer for ConstraintMoead {
    fn name(&self) -> &str {
        "cMOEA/D"
    }

    fn run(&mut self) {
        info!(
            "{}: {} subproblems, budget {}",
            self.name(),
            self.core.config.population_size,
            self.core.config.max_evaluations
        );
        self.core.initialize_population();
        self.threshold = self.mean_violation();

        let mut generation = 0usize;
        while !self.core.budget_exhausted() {
            let policy = ThresholdReplacement {
                threshold: self.threshold,
                counts_toward_cap: false,
            };
            for subproblem in self.core.visit_order() {
                let scope = self.core.choose_scope();
                let parents = self.core.select_parents(subproblem, scope);
                let mut child = self.core.reproduce(subproblem, &parents);
                self.core.evaluate(&mut child);
                self.core.update_neighborhood(&child, subproblem, scope, &policy);
            }
            self.threshold = self.mean_violation();
            generation += 1;
            debug!(
                "{}: generation {}, threshold {:.6}, {} evaluations",
                self.name(),
                generation,
                self.threshold,
                self.core.evaluations
            );
        }

        self.result = self.core.result_population();
        info!("{}: finished after {} evaluations", self.name(), self.core.evaluations);
    }

    fn result(&self) -> &[FloatSolution] {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Srinivas;

    #[test]
    fn constrained_run_drives_the_population_feasible() {
        let config = MoeadConfig::new(40, 4_000).with_neighbor_size(8).with_seed(11);
        let mut optimizer = ConstraintMoead::new(Box::new(Srinivas), config).unwrap();

        optimizer.run();

        assert_eq!(optimizer.result().len(), 40);
        let feasible = optimizer
            .result()
            .iter()
            .filter(|s| s.is_feasible())
            .count();
        // Srinivas has a large feasible region; most slots end up in it
        assert!(feasible > 20, "only {} of 40 feasible", feasible);
    }

    #[test]
    fn threshold_tracks_population_mean() {
        let config = MoeadConfig::new(20, 200).with_neighbor_size(5).with_seed(2);
        let mut optimizer = ConstraintMoead::new(Box::new(Srinivas), config).unwrap();
        optimizer.core.initialize_population();
        optimizer.threshold = optimizer.mean_violation();

        let by_hand: f64 = optimizer
            .core
            .population
            .iter()
            .map(|s| s.violation_degree())
            .sum::<f64>()
            / 20.0;
        assert_eq!(optimizer.threshold, by_hand);
    }
}
