use rand::{Rng, RngCore};

use crate::solution::FloatSolution;
use crate::{CrossoverOperator, MutationOperator, Problem};

/// Differential evolution crossover (rand/1/bin).
///
/// The variant expects two mating-pool parents plus the current
/// solution as base vector: the trial value for a crossed variable is
/// `current[j] + f * (parent0[j] - parent1[j])`, clamped to the
/// variable bounds.
#[derive(Clone)]
pub struct DifferentialEvolutionCrossover {
    pub cr: f64,
    pub f: f64,
}

impl DifferentialEvolutionCrossover {
    pub fn new(cr: f64, f: f64) -> Self {
        DifferentialEvolutionCrossover { cr, f }
    }
}

impl Default for DifferentialEvolutionCrossover {
    fn default() -> Self {
        DifferentialEvolutionCrossover::new(1.0, 0.5)
    }
}

impl CrossoverOperator for DifferentialEvolutionCrossover {
    fn execute(
        &self,
        current: &FloatSolution,
        parents: &[&FloatSolution],
        problem: &dyn Problem,
        rng: &mut dyn RngCore,
    ) -> FloatSolution {
        debug_assert!(parents.len() >= 2);

        let variables = current.variables.len();
        let mut child = FloatSolution::new(
            current.variables.clone(),
            problem.number_of_objectives(),
        );
        let j_rand = rng.gen_range(0..variables);

        for j in 0..variables {
            if rng.gen::<f64>() < self.cr || j == j_rand {
                let mut value = current.variables[j]
                    + self.f * (parents[0].variables[j] - parents[1].variables[j]);
                value = value.clamp(problem.lower_bound(j), problem.upper_bound(j));
                child.variables[j] = value;
            }
        }

        child
    }

    fn mating_pool_size(&self) -> usize {
        2
    }
}

/// Polynomial mutation with distribution index `eta`.
#[derive(Clone)]
pub struct PolynomialMutation {
    pub probability: f64,
    pub eta: f64,
}

impl PolynomialMutation {
    pub fn new(probability: f64, eta: f64) -> Self {
        PolynomialMutation { probability, eta }
    }

    /// The customary setting: one expected mutated variable per child
    /// and a distribution index of 20.
    pub fn for_problem(problem: &dyn Problem) -> Self {
        PolynomialMutation::new(1.0 / problem.number_of_variables() as f64, 20.0)
    }
}

impl MutationOperator for PolynomialMutation {
    fn execute(&self, child: &mut FloatSolution, problem: &dyn Problem, rng: &mut dyn RngCore) {
        let mut_pow = 1.0 / (self.eta + 1.0);

        for j in 0..child.variables.len() {
            if rng.gen::<f64>() > self.probability {
                continue;
            }

            let yl = problem.lower_bound(j);
            let yu = problem.upper_bound(j);
            if yu == yl {
                continue;
            }

            let y = child.variables[j];
            let delta1 = (y - yl) / (yu - yl);
            let delta2 = (yu - y) / (yu - yl);
            let rnd = rng.gen::<f64>();

            let deltaq = if rnd <= 0.5 {
                let xy = 1.0 - delta1;
                let val = 2.0 * rnd + (1.0 - 2.0 * rnd) * xy.powf(self.eta + 1.0);
                val.powf(mut_pow) - 1.0
            } else {
                let xy = 1.0 - delta2;
                let val = 2.0 * (1.0 - rnd) + 2.0 * (rnd - 0.5) * xy.powf(self.eta + 1.0);
                1.0 - val.powf(mut_pow)
            };

            child.variables[j] = (y + deltaq * (yu - yl)).clamp(yl, yu);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::problem::zdt1::Zdt1;

    fn solution_at(value: f64, variables: usize) -> FloatSolution {
        FloatSolution::new(vec![value; variables], 2)
    }

    #[test]
    fn de_child_stays_within_bounds() {
        let problem = Zdt1::new(10);
        let mut rng = StdRng::seed_from_u64(42);
        let crossover = DifferentialEvolutionCrossover::default();

        let current = solution_at(0.95, 10);
        let p0 = solution_at(0.9, 10);
        let p1 = solution_at(0.1, 10);

        for _ in 0..50 {
            let child = crossover.execute(&current, &[&p0, &p1], &problem, &mut rng);
            for &v in &child.variables {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn de_difference_vector_shifts_the_base() {
        let problem = Zdt1::new(4);
        let mut rng = StdRng::seed_from_u64(1);
        // cr = 1.0 crosses every variable
        let crossover = DifferentialEvolutionCrossover::new(1.0, 0.5);

        let current = solution_at(0.5, 4);
        let p0 = solution_at(0.8, 4);
        let p1 = solution_at(0.4, 4);

        let child = crossover.execute(&current, &[&p0, &p1], &problem, &mut rng);
        for &v in &child.variables {
            assert!((v - 0.7).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_cr_keeps_all_but_one_variable() {
        let problem = Zdt1::new(8);
        let mut rng = StdRng::seed_from_u64(9);
        let crossover = DifferentialEvolutionCrossover::new(0.0, 0.5);

        let current = solution_at(0.5, 8);
        let p0 = solution_at(0.9, 8);
        let p1 = solution_at(0.1, 8);

        let child = crossover.execute(&current, &[&p0, &p1], &problem, &mut rng);
        let changed = child
            .variables
            .iter()
            .filter(|&&v| (v - 0.5).abs() > 1e-12)
            .count();
        assert!(changed <= 1);
    }

    #[test]
    fn mutation_respects_bounds() {
        let problem = Zdt1::new(10);
        let mut rng = StdRng::seed_from_u64(7);
        let mutation = PolynomialMutation::new(1.0, 20.0);

        for _ in 0..50 {
            let mut child = solution_at(0.01, 10);
            mutation.execute(&mut child, &problem, &mut rng);
            for &v in &child.variables {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn zero_probability_mutation_is_identity() {
        let problem = Zdt1::new(10);
        let mut rng = StdRng::seed_from_u64(3);
        let mutation = PolynomialMutation::new(0.0, 20.0);

        let mut child = solution_at(0.3, 10);
        mutation.execute(&mut child, &problem, &mut rng);
        assert!(child.variables.iter().all(|&v| v == 0.3));
    }
}
