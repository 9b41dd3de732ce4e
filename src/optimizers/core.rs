use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MoeadConfig;
use crate::neighborhood::NeighborhoodTable;
use crate::point::{IdealPoint, NadirPoint};
use crate::selection::{self, NeighborScope};
use crate::solution::FloatSolution;
use crate::sorting::evenly_spread_subset;
use crate::weights::WeightVectorSet;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// Outcome of comparing a child against one incumbent during a
/// replacement scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Replace outright. `counted` says whether the replacement
    /// consumes one of the `n_r` slots of the scan.
    Accept { counted: bool },
    /// Fall through to the scalar fitness comparison; a fitness win
    /// always consumes a slot.
    TieBreakFitness,
    Reject,
}

/// Decides, per incumbent, whether a child may take its slot.
///
/// The scan mechanics (random permutation, `n_r` cap) stay in
/// [`MoeadCore::update_neighborhood`]; policies only rank the pair.
pub trait ReplacementPolicy {
    fn verdict(&self, child: &FloatSolution, incumbent: &FloatSolution) -> Verdict;
}

/// Plain replacement: fitness decides everything.
pub struct FitnessReplacement;

impl ReplacementPolicy for FitnessReplacement {
    fn verdict(&self, _child: &FloatSolution, _incumbent: &FloatSolution) -> Verdict {
        Verdict::TieBreakFitness
    }
}

/// Violation-threshold replacement shared by the constraint-handling
/// variants: pairs within the threshold (or with equal violations)
/// compete on fitness, otherwise the less violating side wins outright.
pub struct ThresholdReplacement {
    pub threshold: f64,
    /// Whether an outright violation win consumes an `n_r` slot.
    pub counts_toward_cap: bool,
}

impl ReplacementPolicy for ThresholdReplacement {
    fn verdict(&self, child: &FloatSolution, incumbent: &FloatSolution) -> Verdict {
        let child_violation = child.violation_degree();
        let incumbent_violation = incumbent.violation_degree();

        if (incumbent_violation < self.threshold && child_violation <= self.threshold)
            || child_violation == incumbent_violation
        {
            Verdict::TieBreakFitness
        } else if child_violation < incumbent_violation {
            Verdict::Accept {
                counted: self.counts_toward_cap,
            }
        } else {
            Verdict::Reject
        }
    }
}

/// Shared state of the decomposition variants: the subproblem geometry,
/// the population, the reference points, the evaluation counter and the
/// run's RNG.
pub struct MoeadCore {
    pub problem: Box<dyn Problem>,
    pub config: MoeadConfig,
    pub weights: WeightVectorSet,
    pub neighborhood: NeighborhoodTable,
    pub population: Vec<FloatSolution>,
    pub ideal: IdealPoint,
    pub nadir: NadirPoint,
    pub evaluations: usize,
    pub rng: StdRng,
    pub crossover: Box<dyn CrossoverOperator>,
    pub mutation: Box<dyn MutationOperator>,
}

impl MoeadCore {
    pub fn new(
        problem: Box<dyn Problem>,
        config: MoeadConfig,
        crossover: Box<dyn CrossoverOperator>,
        mutation: Box<dyn MutationOperator>,
    ) -> Result<Self, MoeadError> {
        config.validate(crossover.mating_pool_size())?;

        let objectives = problem.number_of_objectives();
        let weights = WeightVectorSet::for_problem(
            &config.data_directory,
            objectives,
            config.population_size,
        )?;
        let neighborhood = NeighborhoodTable::build(&weights, config.neighbor_size)?;
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(MoeadCore {
            problem,
            weights,
            neighborhood,
            population: Vec::new(),
            ideal: IdealPoint::new(objectives),
            nadir: NadirPoint::new(objectives),
            evaluations: 0,
            rng,
            crossover,
            mutation,
            config,
        })
    }

    /// Evaluate a solution, count it against the budget and fold it
    /// into the reference points.
    pub fn evaluate(&mut self, solution: &mut FloatSolution) {
        self.problem.evaluate(solution);
        self.problem.evaluate_constraints(solution);
        self.evaluations += 1;
        self.ideal.update(&solution.objectives);
        self.nadir.update(&solution.objectives);
    }

    /// Fill the population with evaluated random solutions. These
    /// evaluations count toward the budget.
    pub fn initialize_population(&mut self) {
        self.population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let mut solution = self.problem.create_solution(&mut self.rng);
            self.evaluate(&mut solution);
            self.population.push(solution);
        }
    }

    pub fn budget_exhausted(&self) -> bool {
        self.evaluations >= self.config.max_evaluations
    }

    /// Scalar fitness of an objective vector on one subproblem.
    pub fn fitness(&self, objectives: &[f64], subproblem: usize) -> f64 {
        self.config
            .scalarizing
            .fitness(objectives, self.weights.row(subproblem), &self.ideal)
    }

    pub fn choose_scope(&mut self) -> NeighborScope {
        selection::choose_scope(&mut self.rng, self.config.neighborhood_selection_probability)
    }

    /// Random visiting order over the subproblems for one generation.
    pub fn visit_order(&mut self) -> Vec<usize> {
        selection::random_permutation(&mut self.rng, self.config.population_size)
    }

    pub fn select_parents(&mut self, subproblem: usize, scope: NeighborScope) -> Vec<usize> {
        selection::mating_selection(
            &mut self.rng,
            &self.neighborhood,
            self.population.len(),
            subproblem,
            self.crossover.mating_pool_size(),
            scope,
        )
    }

    /// Produce one mutated child for `subproblem` from the given
    /// parent indices. The child is not yet evaluated.
    pub fn reproduce(&mut self, subproblem: usize, parents: &[usize]) -> FloatSolution {
        let pool: Vec<&FloatSolution> = parents.iter().map(|&i| &self.population[i]).collect();
        let mut child = self.crossover.execute(
            &self.population[subproblem],
            &pool,
            self.problem.as_ref(),
            &mut self.rng,
        );
        self.mutation
            .execute(&mut child, self.problem.as_ref(), &mut self.rng);
        child
    }

    /// Replacement scan: walk the scope in a random order and let the
    /// child take slots per the policy, stopping after
    /// `max_replaced_solutions` counted wins. Returns the number of
    /// counted replacements.
    pub fn update_neighborhood(
        &mut self,
        child: &FloatSolution,
        subproblem: usize,
        scope: NeighborScope,
        policy: &dyn ReplacementPolicy,
    ) -> usize {
        let size = match scope {
            NeighborScope::Neighborhood => self.neighborhood.row(subproblem).len(),
            NeighborScope::Population => self.population.len(),
        };
        let perm = selection::random_permutation(&mut self.rng, size);

        let mut replaced = 0;
        for k in perm {
            let idx = match scope {
                NeighborScope::Neighborhood => self.neighborhood.row(subproblem)[k],
                NeighborScope::Population => k,
            };

            let accept = match policy.verdict(child, &self.population[idx]) {
                Verdict::Accept { counted } => {
                    if counted {
                        replaced += 1;
                    }
                    true
                }
                Verdict::TieBreakFitness => {
                    let challenger = self.fitness(&child.objectives, idx);
                    let incumbent = self.fitness(&self.population[idx].objectives, idx);
                    if challenger < incumbent {
                        replaced += 1;
                        true
                    } else {
                        false
                    }
                }
                Verdict::Reject => false,
            };

            if accept {
                self.population[idx] = child.clone();
            }
            if replaced >= self.config.max_replaced_solutions {
                break;
            }
        }
        replaced
    }

    /// The population, shrunk to `result_population_size` by the
    /// evenly-spread subset procedure when requested.
    pub fn result_population(&mut self) -> Vec<FloatSolution> {
        if self.config.result_population_size >= self.population.len() {
            self.population.clone()
        } else {
            evenly_spread_subset(
                &self.population,
                self.config.result_population_size,
                &mut self.rng,
            )
        }
    }
}

/// Per-subproblem utility bookkeeping used by the dynamic-resource and
/// stable-matching variants: a decayed score of how much each
/// subproblem improved since its last snapshot.
pub struct UtilityTracker {
    utility: Vec<f64>,
    saved: Vec<FloatSolution>,
}

impl UtilityTracker {
    /// Snapshot the freshly initialized population with all utilities
    /// at 1.0.
    pub fn new(core: &MoeadCore) -> Self {
        UtilityTracker {
            utility: vec![1.0; core.population.len()],
            saved: core.population.clone(),
        }
    }

    /// Recompute utilities from the improvement over the snapshot and
    /// take a new snapshot. Called every 30 generations.
    pub fn update(&mut self, core: &MoeadCore) {
        for i in 0..core.population.len() {
            let current = core.fitness(&core.population[i].objectives, i);
            let saved = core.fitness(&self.saved[i].objectives, i);
            let delta = saved - current;
            if delta > 0.001 {
                self.utility[i] = 1.0;
            } else {
                let decayed = (0.95 + 0.05 * delta / 0.001) * self.utility[i];
                self.utility[i] = decayed.min(1.0);
            }
            self.saved[i] = core.population[i].clone();
        }
    }

    pub fn utility(&self, subproblem: usize) -> f64 {
        self.utility[subproblem]
    }

    /// Pick the subproblems to visit this generation: the objective-axis
    /// subproblems always, then a `depth`-way utility tournament fills
    /// the list up to a fifth of the population.
    pub fn tour_selection(&self, core: &mut MoeadCore, depth: usize) -> Vec<usize> {
        let objectives = core.problem.number_of_objectives();
        let population_size = core.population.len();

        let mut selected: Vec<usize> = (0..objectives).collect();
        let mut candidates: Vec<usize> = (objectives..population_size).collect();

        while selected.len() < population_size / 5 && !candidates.is_empty() {
            let mut best = core.rng.gen_range(0..candidates.len());
            for _ in 1..depth {
                let contender = core.rng.gen_range(0..candidates.len());
                if self.utility[candidates[contender]] > self.utility[candidates[best]] {
                    best = contender;
                }
            }
            selected.push(candidates.swap_remove(best));
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Zdt1;
    use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
    use crate::scalarizing::ScalarizingFunction;

    fn small_core(nr: usize) -> MoeadCore {
        let problem = Zdt1::new(10);
        let config = MoeadConfig::new(20, 400)
            .with_neighbor_size(5)
            .with_max_replaced_solutions(nr)
            .with_scalarizing(ScalarizingFunction::WeightedSum)
            .with_seed(17);
        let mutation = PolynomialMutation::for_problem(&problem);
        let mut core = MoeadCore::new(
            Box::new(problem),
            config,
            Box::new(DifferentialEvolutionCrossover::default()),
            Box::new(mutation),
        )
        .unwrap();
        core.initialize_population();
        core
    }

    #[test]
    fn replacement_scan_respects_the_cap() {
        let mut core = small_core(2);

        // a child that beats every incumbent on every subproblem
        let mut child = FloatSolution::new(vec![0.0; 10], 2);
        child.objectives = vec![-1.0, -1.0];

        let replaced = core.update_neighborhood(
            &child,
            0,
            NeighborScope::Population,
            &FitnessReplacement,
        );
        assert_eq!(replaced, 2);

        let copies = core
            .population
            .iter()
            .filter(|s| s.objectives == vec![-1.0, -1.0])
            .count();
        assert_eq!(copies, 2);
    }

    #[test]
    fn initial_population_counts_toward_the_budget() {
        let core = small_core(2);
        assert_eq!(core.evaluations, 20);
        assert_eq!(core.population.len(), 20);
    }

    #[test]
    fn threshold_policy_orders_by_violation_outside_the_threshold() {
        let policy = ThresholdReplacement {
            threshold: 0.5,
            counts_toward_cap: true,
        };

        let mut clean = FloatSolution::new(vec![], 2);
        clean.constraint_violation = Some(0.0);
        let mut dirty = FloatSolution::new(vec![], 2);
        dirty.constraint_violation = Some(-3.0);

        assert_eq!(
            policy.verdict(&clean, &dirty),
            Verdict::Accept { counted: true }
        );
        assert_eq!(policy.verdict(&dirty, &clean), Verdict::Reject);
        assert_eq!(policy.verdict(&clean, &clean), Verdict::TieBreakFitness);
        assert_eq!(policy.verdict(&dirty, &dirty), Verdict::TieBreakFitness);
    }

    #[test]
    fn utility_decays_without_improvement_and_resets_on_gains() {
        let core = small_core(2);
        let mut tracker = UtilityTracker::new(&core);

        // no movement: utilities decay by the 0.95 factor
        tracker.update(&core);
        for i in 0..core.population.len() {
            assert!((tracker.utility(i) - 0.95).abs() < 1e-12);
        }

        let mut improved = core;
        for solution in &mut improved.population {
            solution.objectives = vec![-10.0, -10.0];
        }
        tracker.update(&improved);
        for i in 0..improved.population.len() {
            assert_eq!(tracker.utility(i), 1.0);
        }
    }

    #[test]
    fn tour_selection_always_includes_the_axis_subproblems() {
        let mut core = small_core(2);
        let tracker = UtilityTracker::new(&core);

        let visits = tracker.tour_selection(&mut core, 10);
        assert_eq!(visits.len(), 4); // 20 / 5
        assert!(visits.contains(&0));
        assert!(visits.contains(&1));

        let mut unique = visits.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), visits.len());
    }
}
