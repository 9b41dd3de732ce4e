use log::{debug, info};

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::{FitnessReplacement, MoeadCore, UtilityTracker};
use crate::optimizers::Optimizer;
use crate::solution::FloatSolution;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

const UTILITY_INTERVAL: usize = 30;

/// MOEA/D with stable-matching selection.
///
/// Each generation produces one offspring per subproblem into a batch,
/// merges it with the current population into a joint pool of 2N
/// solutions, and selects the next population as a stable matching
/// between subproblems and pool members: subproblems rank solutions by
/// scalar fitness, solutions rank subproblems by distance to the weight
/// line plus the niche count of the nearest subproblem.
pub struct MoeadStm {
    core: MoeadCore,
    result: Vec<FloatSolution>,
}

impl MoeadStm {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        MoeadStm::with_operators(
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
        Ok(MoeadStm {
            core: MoeadCore::new(problem, config, crossover, mutation)?,
            result: Vec::new(),
        })
    }

    /// Distance of a solution's sum-normalized objective vector to the
    /// subproblem's weight vector.
    fn weight_line_distance(&self, objectives: &[f64], subproblem: usize) -> f64 {
        let lambda = self.core.weights.row(subproblem);
        let sum: f64 = objectives.iter().sum();

        objectives
            .iter()
            .zip(lambda)
            .map(|(&f, &w)| {
                let normalized = if sum != 0.0 { f / sum } else { f };
                (normalized - w) * (normalized - w)
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Replace the population with a stable matching over the joint
    /// pool.
    fn stm_selection(&mut self, joint: &[FloatSolution]) {
        let n = self.core.config.population_size;
        let size = joint.len();

        // preference values; lower is preferred on both sides
        let mut subproblem_pref = vec![vec![0.0; size]; n];
        let mut solution_pref = vec![vec![0.0; n]; size];
        let mut distance = vec![vec![0.0; n]; size];
        let mut niche = vec![0usize; n];

        for (j, solution) in joint.iter().enumerate() {
            let mut nearest = 0;
            for i in 0..n {
                subproblem_pref[i][j] = self.core.fitness(&solution.objectives, i);
                distance[j][i] = self.weight_line_distance(&solution.objectives, i);
                if distance[j][i] < distance[j][nearest] {
                    nearest = i;
                }
            }
            niche[nearest] += 1;
        }
        for j in 0..size {
            for i in 0..n {
                solution_pref[j][i] = distance[j][i] + niche[i] as f64;
            }
        }

        let matched = stable_matching(&subproblem_pref, &solution_pref);
        self.core.population = matched.iter().map(|&j| joint[j].clone()).collect();
    }
}

/// Gale-Shapley stable matching with the subproblems proposing.
///
/// `subproblem_pref[i][j]` is subproblem i's preference value for pool
/// member j, `solution_pref[j][i]` the converse; lower values are
/// preferred. The pool is at least as large as the subproblem set, so
/// every subproblem ends up matched to a distinct pool member.
pub fn stable_matching(
    subproblem_pref: &[Vec<f64>],
    solution_pref: &[Vec<f64>],
) -> Vec<usize> {
    let n = subproblem_pref.len();
    let size = solution_pref.len();
    debug_assert!(size >= n);

    // each subproblem's pool members, most preferred first
    let order: Vec<Vec<usize>> = subproblem_pref
        .iter()
        .map(|row| {
            let mut indices: Vec<usize> = (0..size).collect();
            indices.sort_by(|&a, &b| row[a].partial_cmp(&row[b]).unwrap());
            indices
        })
        .collect();

    let mut next = vec![0usize; n];
    let mut engaged_to: Vec<Option<usize>> = vec![None; size];
    let mut matched = vec![0usize; n];
    let mut free: Vec<usize> = (0..n).rev().collect();

    while let Some(p) = free.pop() {
        let s = order[p][next[p]];
        next[p] += 1;

        match engaged_to[s] {
            None => {
                engaged_to[s] = Some(p);
                matched[p] = s;
            }
            Some(rival) => {
                if solution_pref[s][p] < solution_pref[s][rival] {
                    engaged_to[s] = Some(p);
                    matched[p] = s;
                    free.push(rival);
                } else {
                    free.push(p);
                }
            }
        }
    }

    matched
}

impl Optimizer for MoeadStm {
    fn name(&self) -> &str {
        "MOEA/D-STM"
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
            let mut offspring = Vec::with_capacity(self.core.config.population_size);
            for subproblem in self.core.visit_order() {
                let scope = self.core.choose_scope();
                let parents = self.core.select_parents(subproblem, scope);
                let mut child = self.core.reproduce(subproblem, &parents);
                self.core.evaluate(&mut child);
                self.core
                    .update_neighborhood(&child, subproblem, scope, &FitnessReplacement);
                offspring.push(child);
            }

            let mut joint = self.core.population.clone();
            joint.append(&mut offspring);
            self.stm_selection(&joint);

            generation += 1;
            if generation % UTILITY_INTERVAL == 0 {
                utility.update(&self.core);
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Zdt1;

    #[test]
    fn hand_instance_is_a_stable_bijection() {
        // 3 subproblems, 6 pool members
        let subproblem_pref = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0],
            vec![6.0, 5.0, 1.0, 2.0, 3.0, 4.0],
        ];
        let solution_pref = vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 1.0, 3.0],
            vec![3.0, 2.0, 1.0],
            vec![1.0, 3.0, 2.0],
            vec![2.0, 3.0, 1.0],
            vec![3.0, 1.0, 2.0],
        ];

        let matched = stable_matching(&subproblem_pref, &solution_pref);

        assert_eq!(matched.len(), 3);
        let mut unique = matched.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 3, "matching must be injective");

        // stability: no subproblem p and solution s both prefer each
        // other over their current assignments
        for p in 0..3 {
            for s in 0..6 {
                if matched[p] == s {
                    continue;
                }
                let p_prefers_s = subproblem_pref[p][s] < subproblem_pref[p][matched[p]];
                let s_prefers_p = match matched.iter().position(|&m| m == s) {
                    Some(q) => solution_pref[s][p] < solution_pref[s][q],
                    None => true, // unmatched solutions accept anyone
                };
                assert!(
                    !(p_prefers_s && s_prefers_p),
                    "blocking pair ({}, {})",
                    p,
                    s
                );
            }
        }
    }

    #[test]
    fn straightforward_preferences_match_greedily() {
        // every side agrees: subproblem i and solution i are made for
        // each other
        let subproblem_pref = vec![
            vec![0.0, 1.0, 2.0, 3.0],
            vec![1.0, 0.0, 2.0, 3.0],
        ];
        let solution_pref = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.5, 0.5],
            vec![0.5, 0.5],
        ];

        assert_eq!(stable_matching(&subproblem_pref, &solution_pref), vec![0, 1]);
    }

    #[test]
    fn population_size_is_preserved_across_a_run() {
        let config = MoeadConfig::new(20, 200).with_neighbor_size(5).with_seed(23);
        let mut stm = MoeadStm::new(Box::new(Zdt1::new(10)), config).unwrap();

        stm.run();

        assert_eq!(stm.core.population.len(), 20);
        assert_eq!(stm.core.evaluations, 200);
        assert_eq!(stm.result().len(), 20);
    }
}
