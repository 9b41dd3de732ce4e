use log::{debug, info};

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::{FitnessReplacement, MoeadCore};
use crate::optimizers::Optimizer;
use crate::solution::FloatSolution;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// The baseline decomposition algorithm: one subproblem per weight
/// vector, neighborhood mating and fitness-based neighborhood
/// replacement.
pub struct Moead {
    core: MoeadCore,
    result: Vec<FloatSolution>,
}

impl Moead {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        Moead::with_operators(
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
        Ok(Moead {
            core: MoeadCore::new(problem, config, crossover, mutation)?,
            result: Vec::new(),
        })
    }
}

impl Optimizer for Moead {
    fn name(&self) -> &str {
        "MOEA/D"
    }

    fn run(&mut self) {
        info!(
            "{}: {} subproblems, budget {}",
            self.name(),
            self.core.config.population_size,
            self.core.config.max_evaluations
        );
        self.core.initialize_population();

        let mut generation = 0usize;
        while !self.core.budget_exhausted() {
            for subproblem in self.core.visit_order() {
                let scope = self.core.choose_scope();
                let parents = self.core.select_parents(subproblem, scope);
                let mut child = self.core.reproduce(subproblem, &parents);
                self.core.evaluate(&mut child);
                self.core
                    .update_neighborhood(&child, subproblem, scope, &FitnessReplacement);
            }
            generation += 1;
            debug!(
                "{}: generation {}, {} evaluations",
                self.name(),
                generation,
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
