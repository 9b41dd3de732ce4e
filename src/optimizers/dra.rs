use log::{debug, info};

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::{FitnessReplacement, MoeadCore, UtilityTracker};
use crate::optimizers::Optimizer;
use crate::solution::FloatSolution;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// Generations between utility recomputations.
const UTILITY_INTERVAL: usize = 30;
/// Tournament depth of the subproblem selection.
const TOURNAMENT_DEPTH: usize = 10;

/// MOEA/D with dynamic resource allocation: instead of sweeping every
/// subproblem each generation, computational effort is focused on the
/// subproblems whose scalar fitness has recently improved, picked by a
/// utility-based tournament. The objective-axis subproblems are always
/// visited.
pub struct MoeadDra {
    core: MoeadCore,
    /// Visit count per subproblem across the run.
    pub frequency: Vec<usize>,
    result: Vec<FloatSolution>,
}

impl MoeadDra {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        MoeadDra::with_operators(
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
        let population_size = config.population_size;
        Ok(MoeadDra {
            core: MoeadCore::new(problem, config, crossover, mutation)?,
            frequency: vec![0; population_size],
            result: Vec::new(),
        })
    }
}

impl Optimizer for MoeadDra {
    fn name(&self) -> &str {
        "MOEA/D-DRA"
    }

    fn run(&mut self) {
        info!(
            "{}: {} subproblems, budget {}",
            self.name(),
            self.core.config.population_size,
            self.core.config.max_evaluations
        );
        self.core.initialize_population();
        let mut utility = UtilityTracker::new(&self.core);

        let mut generation = 0usize;
        while !self.core.budget_exhausted() {
            let visits = utility.tour_selection(&mut self.core, TOURNAMENT_DEPTH);
            for &subproblem in &visits {
                self.frequency[subproblem] += 1;

                let scope = self.core.choose_scope();
                let parents = self.core.select_parents(subproblem, scope);
                let mut child = self.core.reproduce(subproblem, &parents);
                self.core.evaluate(&mut child);
                self.core
                    .update_neighborhood(&child, subproblem, scope, &FitnessReplacement);
            }

            generation += 1;
            if generation % UTILITY_INTERVAL == 0 {
                utility.update(&self.core);
            }
            debug!(
                "{}: generation {}, visited {}, {} evaluations",
                self.name(),
                generation,
                visits.len(),
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
    use crate::problem::Zdt1;

    #[test]
    fn only_a_fifth_of_the_subproblems_is_visited_per_generation() {
        let config = MoeadConfig::new(50, 100).with_neighbor_size(10).with_seed(5);
        let mut dra = MoeadDra::new(Box::new(Zdt1::new(10)), config).unwrap();

        dra.run();

        // 50 initial evaluations, then generations of 10 children each
        let visits: usize = dra.frequency.iter().sum();
        assert_eq!(visits, dra.core.evaluations - 50);
        assert_eq!(visits % 10, 0);

        // the axis subproblems are visited every generation
        let generations = visits / 10;
        assert_eq!(dra.frequency[0], generations);
        assert_eq!(dra.frequency[1], generations);
    }

    #[test]
    fn result_shrinks_to_the_requested_size() {
        let config = MoeadConfig::new(50, 500)
            .with_neighbor_size(10)
            .with_result_population_size(20)
            .with_seed(9);
        let mut dra = MoeadDra::new(Box::new(Zdt1::new(10)), config).unwrap();

        dra.run();

        assert_eq!(dra.result().len(), 20);
        assert_eq!(dra.core.population.len(), 50);
    }
}
