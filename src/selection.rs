use rand::{Rng, RngCore};

use crate::neighborhood::NeighborhoodTable;

/// Where mating parents and replacement candidates are taken from:
/// the neighborhood row of the current subproblem, or the whole
/// population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborScope {
    Neighborhood,
    Population,
}

/// Bernoulli draw deciding the scope for one subproblem visit. `delta`
/// is the neighborhood-selection probability.
pub fn choose_scope(rng: &mut dyn RngCore, delta: f64) -> NeighborScope {
    if rng.gen::<f64>() < delta {
        NeighborScope::Neighborhood
    } else {
        NeighborScope::Population
    }
}

/// Draw `count` distinct population indices uniformly from the chosen
/// scope.
///
/// The rejection loop terminates because the configuration validation
/// guarantees the scope holds at least `count` distinct indices; that
/// precondition is not re-checked here.
pub fn mating_selection(
    rng: &mut dyn RngCore,
    neighborhood: &NeighborhoodTable,
    population_size: usize,
    subproblem: usize,
    count: usize,
    scope: NeighborScope,
) -> Vec<usize> {
    let neighbors = neighborhood.row(subproblem);
    let mut selected: Vec<usize> = Vec::with_capacity(count);

    while selected.len() < count {
        let candidate = match scope {
            NeighborScope::Neighborhood => neighbors[rng.gen_range(0..neighbors.len())],
            NeighborScope::Population => rng.gen_range(0..population_size),
        };
        if !selected.contains(&candidate) {
            selected.push(candidate);
        }
    }

    selected
}

/// An unbiased random permutation of `0..len`.
///
/// Every replacement scan and every generational sweep walks its
/// indices through one of these so that no population slot is favored
/// by position.
pub fn random_permutation(rng: &mut dyn RngCore, len: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.gen_range(0..=i);
        perm.swap(i, j);
    }
    perm
}
