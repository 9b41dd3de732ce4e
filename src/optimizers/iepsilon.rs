use log::{debug, info};

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::{MoeadCore, ThresholdReplacement};
use crate::optimizers::Optimizer;
use crate::solution::FloatSolution;
use crate::sorting::{crowding_distance_truncate, ens_nondominated_sorting};
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// Generation after which the epsilon level drops to zero.
const EPSILON_CUTOFF_GENERATION: usize = 800;
/// Shrink/relax rate of the epsilon level.
const EPSILON_RATE: f64 = 0.1;
/// Feasibility ratio above which the epsilon level is relaxed instead
/// of shrunk.
const FEASIBILITY_SWITCH: f64 = 0.95;

/// MOEA/D with the improved epsilon constraint-handling method.
///
/// Solutions violating less than the current epsilon level compete on
/// fitness as if feasible; the level starts at the 5% order statistic
/// of the initial violations and shrinks (or relaxes, while the
/// population is mostly feasible) each generation until it is forced to
/// zero. Feasible non-dominated solutions are collected in an external
/// archive, which is the algorithm's result.
pub struct MoeadIEpsilon {
    core: MoeadCore,
    epsilon_k: f64,
    phi_max: f64,
    archive: Vec<FloatSolution>,
}

impl MoeadIEpsilon {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        MoeadIEpsilon::with_operators(
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
        Ok(MoeadIEpsilon {
            core: MoeadCore::new(problem, config, crossover, mutation)?,
            epsilon_k: 0.0,
            phi_max: 0.0,
            archive: Vec::new(),
        })
    }

    /// Epsilon zero: the violation degree below which 5% of the initial
    /// population sits.
    fn initialize_epsilon(&mut self) {
        let mut degrees: Vec<f64> = self
            .core
            .population
            .iter()
            .map(|s| s.violation_degree())
            .collect();
        degrees.sort_by(|a, b| b.partial_cmp(a).unwrap());

        self.phi_max = degrees[0];
        let index = ((0.05 * degrees.len() as f64).ceil() as usize).min(degrees.len() - 1);
        self.epsilon_k = degrees[index];
    }

    fn advance_epsilon(&mut self, generation: usize, feasibility_ratio: f64) {
        if generation >= EPSILON_CUTOFF_GENERATION {
            self.epsilon_k = 0.0;
        } else if feasibility_ratio < FEASIBILITY_SWITCH {
            self.epsilon_k *= 1.0 - EPSILON_RATE;
        } else {
            self.epsilon_k = self.phi_max * (1.0 + EPSILON_RATE);
        }
    }

    fn feasibility_ratio(&self) -> f64 {
        let feasible = self
            .core
            .population
            .iter()
            .filter(|s| s.is_feasible())
            .count();
        feasible as f64 / self.core.population.len() as f64
    }

    /// Merge the population's feasible solutions into the archive,
    /// keep the non-dominated front and truncate it to the population
    /// size by crowding distance.
    fn update_archive(&mut self) {
        let mut feasible: Vec<FloatSolution> = self
            .core
            .population
            .iter()
            .filter(|s| s.is_feasible())
            .cloned()
            .collect();
        if feasible.is_empty() {
            return;
        }
        feasible.append(&mut self.archive);

        let objectives: Vec<Vec<f64>> =
            feasible.iter().map(|s| s.objectives.clone()).collect();
        let fronts = ens_nondominated_sorting(&objectives);
        let mut first_front: Vec<FloatSolution> =
            fronts[0].iter().map(|&i| feasible[i].clone()).collect();

        crowding_distance_truncate(&mut first_front, self.core.config.population_size);
        self.archive = first_front;
    }
}

impl Optimizer for MoeadIEpsilon {
    fn name(&self) -> &str {
        "MOEA/D-IEpsilon"
    }

    fn run(&mut self) {
        info!(
            "{}: {} subproblems, budget {}",
            self.name(),
            self.core.config.population_size,
            self.core.config.max_evaluations
        );
        self.core.initialize_population();
        self.initialize_epsilon();
        self.update_archive();

        let mut generation = 0usize;
        let mut feasibility_ratio = self.feasibility_ratio();
        while !self.core.budget_exhausted() {
            self.advance_epsilon(generation, feasibility_ratio);
            let policy = ThresholdReplacement {
                threshold: self.epsilon_k,
                counts_toward_cap: true,
            };

            for subproblem in self.core.visit_order() {
                let scope = self.core.choose_scope();
                let parents = self.core.select_parents(subproblem, scope);
                let mut child = self.core.reproduce(subproblem, &parents);
                self.core.evaluate(&mut child);
                if child.violation_degree() > self.phi_max {
                    self.phi_max = child.violation_degree();
                }
                self.core.update_neighborhood(&child, subproblem, scope, &policy);
            }

            feasibility_ratio = self.feasibility_ratio();
            self.update_archive();
            generation += 1;
            debug!(
                "{}: generation {}, epsilon {:.6}, feasible {:.2}, archive {}",
                self.name(),
                generation,
                self.epsilon_k,
                feasibility_ratio,
                self.archive.len()
            );
        }

        info!(
            "{}: finished after {} evaluations, archive {}",
            self.name(),
            self.core.evaluations,
            self.archive.len()
        );
    }

    fn result(&self) -> &[FloatSolution] {
        &self.archive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Srinivas;
    use crate::sorting::check_dominance;

    fn optimizer(population: usize, budget: usize) -> MoeadIEpsilon {
        let config = MoeadConfig::new(population, budget)
            .with_neighbor_size(5)
            .with_seed(19);
        MoeadIEpsilon::new(Box::new(Srinivas), config).unwrap()
    }

    #[test]
    fn epsilon_schedule() {
        let mut opt = optimizer(20, 200);
        opt.epsilon_k = 1.0;
        opt.phi_max = 4.0;

        opt.advance_epsilon(0, 0.5);
        assert!((opt.epsilon_k - 0.9).abs() < 1e-12);

        opt.advance_epsilon(1, 0.99);
        assert!((opt.epsilon_k - 4.4).abs() < 1e-12);

        opt.advance_epsilon(800, 0.5);
        assert_eq!(opt.epsilon_k, 0.0);
    }

    #[test]
    fn epsilon_zero_is_the_five_percent_order_statistic() {
        let mut opt = optimizer(20, 200);
        opt.core.initialize_population();
        for (i, solution) in opt.core.population.iter_mut().enumerate() {
            solution.constraint_violation = Some(-(i as f64));
        }

        opt.initialize_epsilon();
        assert_eq!(opt.phi_max, 19.0);
        // degrees descending: 19, 18, ... index ceil(0.05 * 20) = 1
        assert_eq!(opt.epsilon_k, 18.0);
    }

    #[test]
    fn archive_holds_feasible_non_dominated_solutions() {
        let mut opt = optimizer(20, 600);
        opt.run();

        assert!(!opt.result().is_empty());
        assert!(opt.result().len() <= 20);
        assert!(opt.result().iter().all(|s| s.is_feasible()));
        for a in opt.result() {
            for b in opt.result() {
                assert_ne!(check_dominance(&a.objectives, &b.objectives), 1);
            }
        }
    }

    #[test]
    fn archive_truncates_to_population_size() {
        let mut opt = optimizer(20, 200);
        opt.core.initialize_population();

        // a long feasible non-dominated front, wider than the population
        opt.archive = (0..50)
            .map(|i| {
                let mut s = FloatSolution::new(vec![0.0, 5.0], 2);
                s.objectives = vec![i as f64, 49.0 - i as f64];
                s.constraint_violation = Some(0.0);
                s
            })
            .collect();
        for solution in &mut opt.core.population {
            solution.constraint_violation = Some(0.0);
            solution.objectives = vec![100.0, 100.0]; // dominated, dropped
        }

        opt.update_archive();
        assert_eq!(opt.archive.len(), 20);
        assert!(opt.archive.iter().all(|s| s.objectives[0] < 100.0));
    }
}
