use std::cmp::Ordering;

use itertools::Itertools;
use rand::{Rng, RngCore};

use crate::point::IdealPoint;
use crate::scalarizing::ScalarizingFunction;
use crate::solution::FloatSolution;
use crate::weights::WeightVectorSet;

/// Pareto dominance over minimized objective vectors: `1` when `a`
/// dominates `b`, `-1` when `b` dominates `a`, `0` otherwise.
pub fn check_dominance(a: &[f64], b: &[f64]) -> i8 {
    let mut a_better = false;
    let mut b_better = false;

    for (x, y) in a.iter().zip(b) {
        match x.partial_cmp(y).unwrap() {
            Ordering::Less => a_better = true,
            Ordering::Greater => b_better = true,
            Ordering::Equal => (),
        }
    }

    match (a_better, b_better) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

fn weakly_dominates(p1: &[f64], p2: &[f64]) -> bool {
    p1.iter().zip(p2).all(|(a, b)| a <= b)
}

/// Efficient non-dominated sorting over a set of objective vectors.
///
/// Returns the front partition as lists of input indices, best front
/// first. The input is swept in lexicographic order and each point is
/// placed on the first front holding no point that dominates it.
pub fn ens_nondominated_sorting(pop: &[Vec<f64>]) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..pop.len()).collect();
    indices.sort_by(|&a, &b| {
        for (x, y) in pop[a].iter().zip(&pop[b]) {
            match x.partial_cmp(y).unwrap() {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    });

    let mut fronts: Vec<Vec<usize>> = vec![];
    for &n in &indices {
        let mut k = 0;
        while k < fronts.len() {
            let dominated = fronts[k]
                .iter()
                .rev()
                .any(|&i| weakly_dominates(&pop[i], &pop[n]) && pop[i] != pop[n]);

            if !dominated {
                break;
            }
            k += 1;
        }

        if k == fronts.len() {
            fronts.push(vec![n]);
        } else {
            fronts[k].push(n);
        }
    }

    fronts
}

/// Crowding distance of each solution within one front.
pub fn crowding_distances(front: &[FloatSolution]) -> Vec<f64> {
    let size = front.len();
    let mut distances = vec![0.0; size];
    if size <= 2 {
        return vec![f64::INFINITY; size];
    }

    let objectives = front[0].objectives.len();
    let mut order: Vec<usize> = (0..size).collect();

    for obj in 0..objectives {
        order.sort_by(|&a, &b| {
            front[a].objectives[obj]
                .partial_cmp(&front[b].objectives[obj])
                .unwrap()
        });

        let min = front[order[0]].objectives[obj];
        let max = front[order[size - 1]].objectives[obj];
        distances[order[0]] = f64::INFINITY;
        distances[order[size - 1]] = f64::INFINITY;

        if max - min == 0.0 {
            continue;
        }
        for w in 1..size - 1 {
            if distances[order[w]] != f64::INFINITY {
                distances[order[w]] += (front[order[w + 1]].objectives[obj]
                    - front[order[w - 1]].objectives[obj])
                    / (max - min);
            }
        }
    }

    distances
}

/// Shrink `front` to `target` members by repeatedly dropping the most
/// crowded solution, recomputing distances after each removal.
pub fn crowding_distance_truncate(front: &mut Vec<FloatSolution>, target: usize) {
    while front.len() > target {
        let distances = crowding_distances(front);
        let worst = distances
            .iter()
            .position_min_by(|a, b| a.partial_cmp(b).unwrap())
            .unwrap();
        front.remove(worst);
    }
}

/// Select `target` evenly spread solutions from `pool`.
///
/// With two objectives the subset is picked by scanning a fresh set of
/// uniform weight vectors and keeping the Tchebycheff best per vector.
/// With more objectives a greedy max-min spread is grown from a random
/// seed solution.
pub fn evenly_spread_subset(
    pool: &[FloatSolution],
    target: usize,
    rng: &mut dyn RngCore,
) -> Vec<FloatSolution> {
    if target == 0 {
        return Vec::new();
    }
    if pool.is_empty() || target >= pool.len() {
        return pool.to_vec();
    }

    let objectives = pool[0].objectives.len();
    if objectives == 2 {
        let mut ideal = IdealPoint::new(2);
        for solution in pool {
            ideal.update(&solution.objectives);
        }
        if target == 1 {
            return vec![tchebycheff_best(pool, &[0.5, 0.5], &ideal).clone()];
        }

        let weights = WeightVectorSet::generate(2, target).expect("target >= 2");
        (0..target)
            .map(|i| tchebycheff_best(pool, weights.row(i), &ideal).clone())
            .collect()
    } else {
        let mut candidates: Vec<usize> = (0..pool.len()).collect();
        let seed = rng.gen_range(0..candidates.len());
        let mut selected = vec![candidates.swap_remove(seed)];

        while selected.len() < target {
            let (pos, _) = candidates
                .iter()
                .enumerate()
                .map(|(pos, &c)| {
                    let spread = selected
                        .iter()
                        .map(|&s| euclidean(&pool[c].objectives, &pool[s].objectives))
                        .fold(f64::INFINITY, f64::min);
                    (pos, spread)
                })
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .unwrap();
            selected.push(candidates.swap_remove(pos));
        }

        selected.into_iter().map(|i| pool[i].clone()).collect()
    }
}

fn tchebycheff_best<'a>(
    pool: &'a [FloatSolution],
    lambda: &[f64],
    ideal: &IdealPoint,
) -> &'a FloatSolution {
    pool.iter()
        .min_by(|a, b| {
            let fa = ScalarizingFunction::Tchebycheff.fitness(&a.objectives, lambda, ideal);
            let fb = ScalarizingFunction::Tchebycheff.fitness(&b.objectives, lambda, ideal);
            fa.partial_cmp(&fb).unwrap()
        })
        .unwrap()
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
