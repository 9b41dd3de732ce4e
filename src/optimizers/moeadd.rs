use log::{debug, info};
use ndarray::Array2;
use rand::Rng;

use crate::config::MoeadConfig;
use crate::operators::{DifferentialEvolutionCrossover, PolynomialMutation};
use crate::optimizers::core::MoeadCore;
use crate::optimizers::Optimizer;
use crate::selection::NeighborScope;
use crate::solution::FloatSolution;
use crate::sorting::{check_dominance, ens_nondominated_sorting};
use crate::weights::WeightVectorSet;
use crate::{CrossoverOperator, MoeadError, MutationOperator, Problem};

/// The dominance-and-decomposition hybrid.
///
/// The population is partitioned two ways at once: into non-domination
/// levels and into subregions, one per weight vector, by orthogonal
/// distance to the weight line. Both partitions are kept incrementally:
/// inserting a child cascades demotions through the level structure,
/// evicting a solution cascades promotions back up. The victim of each
/// insertion comes from the worst level, preferring the most crowded
/// subregion, and an occupied subregion is never emptied while an
/// alternative exists.
pub struct MoeadD {
    core: MoeadCore,
    /// Unit-normalized copy of the weight vectors for the orthogonal
    /// distance; fitness keeps using the raw weights.
    unit_weights: WeightVectorSet,
    /// `rank_idx[[level, slot]] == 1` iff the slot's solution sits at
    /// that non-domination level. One extra row absorbs a transient
    /// deepest level during insertion.
    rank_idx: Array2<u8>,
    /// `subregion_idx[[region, slot]] == 1` iff the slot's solution is
    /// assigned to that subregion.
    subregion_idx: Array2<u8>,
    num_ranks: usize,
    result: Vec<FloatSolution>,
}

impl MoeadD {
    pub fn new(problem: Box<dyn Problem>, config: MoeadConfig) -> Result<Self, MoeadError> {
        let mutation = PolynomialMutation::for_problem(problem.as_ref());
        MoeadD::with_operators(
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
        let n = config.population_size;
        let core = MoeadCore::new(problem, config, crossover, mutation)?;
        let unit_weights = core.weights.clone().normalized();
        Ok(MoeadD {
            core,
            unit_weights,
            rank_idx: Array2::zeros((n + 1, n)),
            subregion_idx: Array2::zeros((n, n)),
            num_ranks: 0,
            result: Vec::new(),
        })
    }

    fn population_size(&self) -> usize {
        self.core.config.population_size
    }

    fn rank_slots(&self, level: usize) -> Vec<usize> {
        (0..self.population_size())
            .filter(|&j| self.rank_idx[[level, j]] == 1)
            .collect()
    }

    fn count_rank(&self, level: usize) -> usize {
        (0..self.population_size())
            .filter(|&j| self.rank_idx[[level, j]] == 1)
            .count()
    }

    fn region_slots(&self, region: usize) -> Vec<usize> {
        (0..self.population_size())
            .filter(|&j| self.subregion_idx[[region, j]] == 1)
            .collect()
    }

    fn count_region(&self, region: usize) -> usize {
        (0..self.population_size())
            .filter(|&j| self.subregion_idx[[region, j]] == 1)
            .count()
    }

    fn slot_region(&self, slot: usize) -> usize {
        self.core.population[slot].region.unwrap_or_else(|| {
            panic!("slot {} has no subregion assignment", slot)
        })
    }

    fn sum_region_fitness(&self, region: usize) -> f64 {
        self.region_slots(region)
            .iter()
            .map(|&j| self.core.fitness(&self.core.population[j].objectives, region))
            .sum()
    }

    /// Orthogonal distance of an objective vector to the region's
    /// weight line anchored at the ideal point.
    fn line_distance(&self, objectives: &[f64], region: usize) -> f64 {
        let lambda = self.unit_weights.row(region);
        let z = self.core.ideal.values();

        let d1: f64 = objectives
            .iter()
            .zip(z)
            .zip(lambda)
            .map(|((&f, &zj), &w)| (f - zj) * w)
            .sum::<f64>()
            .abs();

        objectives
            .iter()
            .zip(z)
            .zip(lambda)
            .map(|((&f, &zj), &w)| {
                let off = f - (zj + d1 * w);
                off * off
            })
            .sum::<f64>()
            .sqrt()
    }

    fn assign_region(&self, child: &mut FloatSolution) {
        let mut best = 0;
        let mut best_distance = self.line_distance(&child.objectives, 0);
        for region in 1..self.population_size() {
            let distance = self.line_distance(&child.objectives, region);
            if distance < best_distance {
                best = region;
                best_distance = distance;
            }
        }
        child.region = Some(best);
    }

    /// Most crowded subregion among `candidates`. A child pending in
    /// `bonus_region` counts toward that region's size and, with
    /// `bonus_fitness`, toward its summed fitness on ties.
    fn most_crowded(
        &self,
        candidates: &[usize],
        bonus_region: Option<usize>,
        bonus_fitness: f64,
    ) -> (usize, usize) {
        let count = |r: usize| self.count_region(r) + usize::from(Some(r) == bonus_region);

        let mut crowd_list = vec![candidates[0]];
        let mut niche = count(candidates[0]);
        for &region in &candidates[1..] {
            let size = count(region);
            if size > niche {
                crowd_list.clear();
                crowd_list.push(region);
                niche = size;
            } else if size == niche {
                crowd_list.push(region);
            }
        }
        if crowd_list.len() == 1 {
            return (crowd_list[0], niche);
        }

        let summed = |r: usize| {
            self.sum_region_fitness(r)
                + if Some(r) == bonus_region { bonus_fitness } else { 0.0 }
        };
        let mut best = crowd_list[0];
        let mut best_sum = summed(best);
        for &region in &crowd_list[1..] {
            let sum = summed(region);
            if sum > best_sum {
                best = region;
                best_sum = sum;
            }
        }
        (best, niche)
    }

    /// Put `child` into `target`'s slot, rewire both index matrices and
    /// cascade promotions left behind by the evicted solution.
    fn evict(&mut self, target: usize, child: FloatSolution) {
        let target_rank = self.core.population[target].rank.unwrap_or(0);
        let target_region = self.slot_region(target);
        let child_rank = child.rank.unwrap_or(0);
        let child_region = child.region.unwrap_or(target_region);

        self.rank_idx[[target_rank, target]] = 0;
        self.rank_idx[[child_rank, target]] = 1;
        self.subregion_idx[[target_region, target]] = 0;
        self.subregion_idx[[child_region, target]] = 1;

        let removed = std::mem::replace(&mut self.core.population[target], child);
        self.sorting_delete(&removed.objectives, target_rank);
    }

    /// Place one evaluated child into the population.
    fn insert(&mut self, mut child: FloatSolution) {
        self.assign_region(&mut child);
        let location = child.region.unwrap_or(0);

        self.num_ranks = self.sorting_add(&mut child);

        if self.num_ranks == 1 {
            self.delete_rank_one(child, location);
            return;
        }

        // the deepest level, with `None` standing for the child itself
        let last = self.num_ranks - 1;
        let mut last_front: Vec<Option<usize>> =
            self.rank_slots(last).into_iter().map(Some).collect();
        if child.rank == Some(last) {
            last_front.push(None);
        }

        if last_front.len() == 1 && last_front[0].is_none() {
            // the child alone is worst
            if self.count_region(location) > 0 {
                // its subregion is already served: drop the child
                self.sorting_delete(&child.objectives, last);
            } else {
                self.delete_crowd_region1(child);
            }
        } else if last_front.len() == 1 {
            let target = last_front[0].unwrap();
            let parent_location = self.slot_region(target);
            let mut occupancy = self.count_region(parent_location);
            if parent_location == location {
                occupancy += 1;
            }
            if occupancy == 1 {
                // evicting would empty that subregion: evict elsewhere
                self.delete_crowd_region2(child, location);
            } else {
                self.evict(target, child);
            }
        } else {
            let child_fitness = self.core.fitness(&child.objectives, location);
            let regions: Vec<usize> = last_front
                .iter()
                .map(|slot| match slot {
                    Some(idx) => self.slot_region(*idx),
                    None => location,
                })
                .collect();

            let (crowd_idx, niche) =
                self.most_crowded(&regions, Some(location), child_fitness);

            if niche == 1 {
                // every worst-level solution sits alone in its subregion
                self.delete_crowd_region2(child, location);
                return;
            }

            // worst solution of the most crowded subregion in the level
            let members: Vec<Option<usize>> = last_front
                .iter()
                .zip(&regions)
                .filter(|(_, &region)| region == crowd_idx)
                .map(|(&slot, _)| slot)
                .collect();

            let fitness_of = |slot: &Option<usize>| match slot {
                Some(idx) => self
                    .core
                    .fitness(&self.core.population[*idx].objectives, crowd_idx),
                None => child_fitness,
            };
            let mut target = members[0];
            let mut worst = fitness_of(&target);
            for slot in &members[1..] {
                let fitness = fitness_of(slot);
                if fitness > worst {
                    target = *slot;
                    worst = fitness;
                }
            }

            match target {
                None => self.sorting_delete(&child.objectives, child.rank.unwrap_or(last)),
                Some(idx) => self.evict(idx, child),
            }
        }
    }

    /// Every solution is non-dominated: balance subregion occupancy.
    fn delete_rank_one(&mut self, child: FloatSolution, location: usize) {
        let n = self.population_size();
        let child_fitness = self.core.fitness(&child.objectives, location);
        let all: Vec<usize> = (0..n).collect();
        let (crowd_idx, niche) = self.most_crowded(&all, Some(location), child_fitness);

        if niche == 1 {
            // one solution per subregion: plain fitness duel in the
            // child's own subregion
            if let Some(target) = (0..n).find(|&s| self.subregion_idx[[location, s]] == 1) {
                let incumbent =
                    self.core.fitness(&self.core.population[target].objectives, location);
                if child_fitness < incumbent {
                    self.core.population[target] = child;
                }
            }
        } else if location == crowd_idx {
            self.delete_crowd_same(location, child_fitness, child);
        } else {
            let own = self.count_region(location);
            let crowded = self.count_region(crowd_idx);
            if crowded > own + 1 || (crowded == own + 1 && own == 0) {
                self.delete_crowd_diff(crowd_idx, location, child);
            } else if crowded < own + 1 {
                self.delete_crowd_same(location, child_fitness, child);
            } else if self.core.rng.gen::<f64>() < 0.5 {
                self.delete_crowd_diff(crowd_idx, location, child);
            } else {
                self.delete_crowd_same(location, child_fitness, child);
            }
        }
    }

    /// The child's subregion is the most crowded: it must beat the
    /// subregion's worst solution to enter.
    fn delete_crowd_same(&mut self, region: usize, child_fitness: f64, child: FloatSolution) {
        let members = self.region_slots(region);
        let mut worst = match members.first() {
            Some(&slot) => slot,
            None => return,
        };
        let mut worst_fitness =
            self.core.fitness(&self.core.population[worst].objectives, region);
        for &slot in &members[1..] {
            let fitness = self.core.fitness(&self.core.population[slot].objectives, region);
            if fitness > worst_fitness {
                worst = slot;
                worst_fitness = fitness;
            }
        }
        if child_fitness < worst_fitness {
            self.core.population[worst] = child;
        }
    }

    /// Another subregion is more crowded: its worst solution makes way
    /// unconditionally.
    fn delete_crowd_diff(&mut self, crowd_idx: usize, location: usize, child: FloatSolution) {
        let members = self.region_slots(crowd_idx);
        let mut worst = match members.first() {
            Some(&slot) => slot,
            None => return,
        };
        let mut worst_fitness =
            self.core.fitness(&self.core.population[worst].objectives, crowd_idx);
        for &slot in &members[1..] {
            let fitness =
                self.core.fitness(&self.core.population[slot].objectives, crowd_idx);
            if fitness > worst_fitness {
                worst = slot;
                worst_fitness = fitness;
            }
        }

        self.subregion_idx[[crowd_idx, worst]] = 0;
        self.subregion_idx[[location, worst]] = 1;
        let mut child = child;
        child.region = Some(location);
        self.core.population[worst] = child;
    }

    /// The child is worst-ranked but its subregion is empty: keep it
    /// and evict from the globally most crowded subregion instead.
    fn delete_crowd_region1(&mut self, child: FloatSolution) {
        let n = self.population_size();
        let all: Vec<usize> = (0..n).collect();
        let (crowd_idx, _) = self.most_crowded(&all, None, 0.0);

        let members = self.region_slots(crowd_idx);
        let target = self.worst_by_rank_then_fitness(&members, crowd_idx);
        self.evict(target, child);
    }

    /// Eviction must spare a singleton subregion: evict the worst
    /// solution of the globally most crowded subregion, where the child
    /// itself is a candidate.
    fn delete_crowd_region2(&mut self, child: FloatSolution, location: usize) {
        let n = self.population_size();
        let child_fitness = self.core.fitness(&child.objectives, location);
        let all: Vec<usize> = (0..n).collect();
        let (crowd_idx, _) = self.most_crowded(&all, Some(location), child_fitness);

        let mut members: Vec<Option<usize>> =
            self.region_slots(crowd_idx).into_iter().map(Some).collect();
        if crowd_idx == location {
            members.push(None);
        }

        let rank_of = |slot: &Option<usize>| match slot {
            Some(idx) => self.core.population[*idx].rank.unwrap_or(0),
            None => child.rank.unwrap_or(0),
        };
        let mut worst_rank = rank_of(&members[0]);
        let mut max_rank_members = vec![members[0]];
        for slot in &members[1..] {
            let rank = rank_of(slot);
            if rank > worst_rank {
                max_rank_members.clear();
                worst_rank = rank;
                max_rank_members.push(*slot);
            } else if rank == worst_rank {
                max_rank_members.push(*slot);
            }
        }

        let fitness_of = |slot: &Option<usize>| match slot {
            Some(idx) => self
                .core
                .fitness(&self.core.population[*idx].objectives, crowd_idx),
            None => child_fitness,
        };
        let mut target = max_rank_members[0];
        let mut worst_fitness = fitness_of(&target);
        for slot in &max_rank_members[1..] {
            let fitness = fitness_of(slot);
            if fitness > worst_fitness {
                target = *slot;
                worst_fitness = fitness;
            }
        }

        match target {
            None => self.sorting_delete(&child.objectives, child.rank.unwrap_or(0)),
            Some(idx) => self.evict(idx, child),
        }
    }

    /// Worst rank first, then worst fitness against the region's
    /// weights.
    fn worst_by_rank_then_fitness(&self, members: &[usize], region: usize) -> usize {
        let mut worst_rank = self.core.population[members[0]].rank.unwrap_or(0);
        let mut candidates = vec![members[0]];
        for &slot in &members[1..] {
            let rank = self.core.population[slot].rank.unwrap_or(0);
            if rank > worst_rank {
                candidates.clear();
                worst_rank = rank;
                candidates.push(slot);
            } else if rank == worst_rank {
                candidates.push(slot);
            }
        }

        let mut target = candidates[0];
        let mut worst_fitness =
            self.core.fitness(&self.core.population[target].objectives, region);
        for &slot in &candidates[1..] {
            let fitness = self.core.fitness(&self.core.population[slot].objectives, region);
            if fitness > worst_fitness {
                target = slot;
                worst_fitness = fitness;
            }
        }
        target
    }

    /// Weave a new solution into the level structure, demoting the
    /// solutions it dominates. Returns the new number of levels and
    /// sets the child's rank.
    fn sorting_add(&mut self, indiv: &mut FloatSolution) -> usize {
        let n = self.population_size();

        let mut front_size: Vec<usize> = Vec::new();
        let mut num_ranks = 0;
        for level in 0..n {
            let count = self.count_rank(level);
            if count == 0 {
                break;
            }
            front_size.push(count);
            num_ranks += 1;
        }

        let mut dominate_list: Vec<usize> = Vec::new();
        let mut flag = 0u8;
        let mut level = 0;

        let mut i = 0;
        while i < num_ranks {
            level = i;
            match flag {
                // non-dominated with the previous level: that is home
                1 => {
                    indiv.rank = Some(i - 1);
                    return num_ranks;
                }
                // dominates part of the previous level: join it and
                // cascade the dominated part downward
                2 => {
                    return self.cascade_demotion(
                        indiv,
                        i,
                        std::mem::take(&mut dominate_list),
                        &front_size,
                        num_ranks,
                    );
                }
                // dominates the whole previous level: it and everything
                // deeper shifts down one
                4 => {
                    return self.shift_levels_down(indiv, i - 1, num_ranks);
                }
                // still searching (0 at the start, 3 when dominated)
                _ => {
                    let mut dominates_some = false;
                    let mut incomparable = false;
                    let mut dominated = false;
                    for j in 0..n {
                        if self.rank_idx[[i, j]] != 1 {
                            continue;
                        }
                        match check_dominance(
                            &indiv.objectives,
                            &self.core.population[j].objectives,
                        ) {
                            1 => {
                                dominates_some = true;
                                dominate_list.push(j);
                            }
                            -1 => {
                                dominated = true;
                                break;
                            }
                            _ => incomparable = true,
                        }
                    }
                    flag = if dominated {
                        3
                    } else if dominates_some && incomparable {
                        2
                    } else if dominates_some {
                        4
                    } else if incomparable {
                        1
                    } else {
                        flag
                    };
                }
            }
            i += 1;
        }

        // the scan ran past the deepest level
        match flag {
            1 => {
                indiv.rank = Some(level);
            }
            2 => {
                indiv.rank = Some(level);
                for &slot in &dominate_list {
                    self.rank_idx[[level, slot]] = 0;
                    self.rank_idx[[level + 1, slot]] = 1;
                    self.core.population[slot].rank = Some(level + 1);
                }
                num_ranks += 1;
            }
            3 => {
                indiv.rank = Some(level + 1);
                num_ranks += 1;
            }
            _ => {
                // dominates the entire deepest level
                indiv.rank = Some(level);
                for slot in self.rank_slots(level) {
                    self.rank_idx[[level, slot]] = 0;
                    self.rank_idx[[level + 1, slot]] = 1;
                    self.core.population[slot].rank = Some(level + 1);
                }
                num_ranks += 1;
            }
        }
        num_ranks
    }

    fn demote(&mut self, batch: &[usize], from: usize, to: usize) {
        for &slot in batch {
            self.rank_idx[[from, slot]] = 0;
            self.rank_idx[[to, slot]] = 1;
            self.core.population[slot].rank = Some(to);
        }
    }

    /// Solutions at `level` dominated by any batch member.
    fn collect_dominated(&self, batch: &[usize], level: usize) -> Vec<usize> {
        let n = self.population_size();
        let mut next = Vec::new();
        for j in 0..n {
            if self.rank_idx[[level, j]] != 1 {
                continue;
            }
            if batch.iter().any(|&cur| {
                check_dominance(
                    &self.core.population[cur].objectives,
                    &self.core.population[j].objectives,
                ) == 1
            }) {
                next.push(j);
            }
        }
        next
    }

    fn cascade_demotion(
        &mut self,
        indiv: &mut FloatSolution,
        i: usize,
        mut batch: Vec<usize>,
        front_size: &[usize],
        mut num_ranks: usize,
    ) -> usize {
        indiv.rank = Some(i - 1);
        let mut prev_rank = i - 1;
        let mut new_rank = prev_rank + 1;

        self.demote(&batch, prev_rank, new_rank);
        batch = self.collect_dominated(&batch, new_rank);
        prev_rank = new_rank;
        new_rank += 1;
        if batch.is_empty() {
            return num_ranks;
        }

        let mut all_demoted = false;
        loop {
            self.demote(&batch, prev_rank, new_rank);
            batch = self.collect_dominated(&batch, new_rank);
            if batch.is_empty() {
                break;
            }
            prev_rank = new_rank;
            new_rank += 1;
            if prev_rank < front_size.len() && batch.len() == front_size[prev_rank] {
                // the whole level is dominated: it and everything
                // deeper shifts wholesale
                all_demoted = true;
                break;
            }
        }

        if all_demoted {
            let mut snapshots: Vec<Vec<usize>> = vec![batch.clone()];
            for deeper in prev_rank + 1..num_ranks {
                snapshots.push(self.rank_slots(deeper));
            }
            for slots in snapshots {
                for slot in slots {
                    let current = self.core.population[slot].rank.unwrap_or(0);
                    self.rank_idx[[current, slot]] = 0;
                    self.rank_idx[[current + 1, slot]] = 1;
                    self.core.population[slot].rank = Some(current + 1);
                }
            }
            num_ranks += 1;
        }
        if new_rank == num_ranks {
            num_ranks += 1;
        }
        num_ranks
    }

    fn shift_levels_down(
        &mut self,
        indiv: &mut FloatSolution,
        start: usize,
        num_ranks: usize,
    ) -> usize {
        indiv.rank = Some(start);
        let snapshots: Vec<Vec<usize>> =
            (start..num_ranks).map(|level| self.rank_slots(level)).collect();
        for slots in snapshots {
            for slot in slots {
                let current = self.core.population[slot].rank.unwrap_or(0);
                self.rank_idx[[current, slot]] = 0;
                self.rank_idx[[current + 1, slot]] = 1;
                self.core.population[slot].rank = Some(current + 1);
            }
        }
        num_ranks + 1
    }

    /// Cascade promotions after removing a solution of `removed_rank`:
    /// deeper solutions it dominated climb one level when nothing in
    /// their destination level dominates them any more.
    fn sorting_delete(&mut self, removed: &[f64], removed_rank: usize) {
        let n = self.population_size();
        let mut cur_level = self.rank_slots(removed_rank);
        let mut investigate = removed_rank + 1;
        let mut batch: Vec<usize> = Vec::new();

        if investigate < self.num_ranks {
            for j in 0..n {
                if self.rank_idx[[investigate, j]] != 1 {
                    continue;
                }
                if check_dominance(removed, &self.core.population[j].objectives) != 1 {
                    continue;
                }
                let blocked = cur_level.iter().any(|&k| {
                    check_dominance(
                        &self.core.population[j].objectives,
                        &self.core.population[k].objectives,
                    ) == -1
                });
                if !blocked {
                    batch.push(j);
                    self.rank_idx[[investigate, j]] = 0;
                    self.rank_idx[[investigate - 1, j]] = 1;
                    self.core.population[j].rank = Some(investigate - 1);
                }
            }
        }

        while !batch.is_empty() {
            cur_level = self.rank_slots(investigate);
            investigate += 1;
            let movers = std::mem::take(&mut batch);
            if investigate >= self.num_ranks {
                break;
            }
            for &moved in &movers {
                for j in 0..n {
                    if self.rank_idx[[investigate, j]] != 1 {
                        continue;
                    }
                    if check_dominance(
                        &self.core.population[moved].objectives,
                        &self.core.population[j].objectives,
                    ) != 1
                    {
                        continue;
                    }
                    let blocked = cur_level.iter().any(|&k| {
                        check_dominance(
                            &self.core.population[j].objectives,
                            &self.core.population[k].objectives,
                        ) == -1
                    });
                    if !blocked {
                        batch.push(j);
                        self.rank_idx[[investigate, j]] = 0;
                        self.rank_idx[[investigate - 1, j]] = 1;
                        self.core.population[j].rank = Some(investigate - 1);
                    }
                }
            }
        }
    }

    /// Pick two parents from two distinct occupied subregions.
    fn mating(&mut self, cid: usize) -> Vec<usize> {
        let n = self.population_size();
        let scope = self.core.choose_scope();

        let mut active: Vec<usize> = match scope {
            NeighborScope::Neighborhood => self
                .core
                .neighborhood
                .row(cid)
                .iter()
                .copied()
                .filter(|&region| self.count_region(region) > 0)
                .collect(),
            NeighborScope::Population => {
                (0..n).filter(|&region| self.count_region(region) > 0).collect()
            }
        };
        if active.len() < 2 {
            active = (0..n).filter(|&region| self.count_region(region) > 0).collect();
        }
        if active.len() < 2 {
            // everything collapsed into one subregion
            let first = self.core.rng.gen_range(0..n);
            let mut second = self.core.rng.gen_range(0..n);
            while second == first {
                second = self.core.rng.gen_range(0..n);
            }
            return vec![first, second];
        }

        let first = self.core.rng.gen_range(0..active.len());
        let mut second = self.core.rng.gen_range(0..active.len());
        while second == first {
            second = self.core.rng.gen_range(0..active.len());
        }

        let mut parents = Vec::with_capacity(2);
        for &region in [active[first], active[second]].iter() {
            let slots = self.region_slots(region);
            parents.push(slots[self.core.rng.gen_range(0..slots.len())]);
        }
        parents
    }
}

impl Optimizer for MoeadD {
    fn name(&self) -> &str {
        "MOEA/DD"
    }

    fn run(&mut self) {
        info!(
            "{}: {} subproblems, budget {}",
            self.name(),
            self.core.config.population_size,
            self.core.config.max_evaluations
        );
        self.core.initialize_population();

        // seed the partitions: one solution per subregion slot, levels
        // from a full sorting pass
        for i in 0..self.population_size() {
            self.subregion_idx[[i, i]] = 1;
            self.core.population[i].region = Some(i);
        }
        let objectives: Vec<Vec<f64>> = self
            .core
            .population
            .iter()
            .map(|s| s.objectives.clone())
            .collect();
        let fronts = ens_nondominated_sorting(&objectives);
        self.num_ranks = fronts.len();
        for (level, front) in fronts.iter().enumerate() {
            for &slot in front {
                self.rank_idx[[level, slot]] = 1;
                self.core.population[slot].rank = Some(level);
            }
        }

        let mut generation = 0usize;
        while !self.core.budget_exhausted() {
            for cid in self.core.visit_order() {
                let parents = self.mating(cid);
                let mut child = self.core.reproduce(cid, &parents);
                self.core.evaluate(&mut child);
                self.insert(child);
            }
            generation += 1;
            debug!(
                "{}: generation {}, {} levels, {} evaluations",
                self.name(),
                generation,
                self.num_ranks,
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

    fn optimizer(population: usize, budget: usize, seed: u64) -> MoeadD {
        let config = MoeadConfig::new(population, budget)
            .with_neighbor_size(4)
            .with_seed(seed);
        MoeadD::new(Box::new(Zdt1::new(6)), config).unwrap()
    }

    fn assert_partitions_consistent(moeadd: &MoeadD) {
        let n = moeadd.population_size();
        for slot in 0..n {
            let levels: Vec<usize> = (0..n + 1)
                .filter(|&level| moeadd.rank_idx[[level, slot]] == 1)
                .collect();
            assert_eq!(levels.len(), 1, "slot {} sits in {} levels", slot, levels.len());
            assert_eq!(moeadd.core.population[slot].rank, Some(levels[0]));

            let regions: Vec<usize> = (0..n)
                .filter(|&region| moeadd.subregion_idx[[region, slot]] == 1)
                .collect();
            assert_eq!(regions.len(), 1, "slot {} sits in {} regions", slot, regions.len());
            assert_eq!(moeadd.core.population[slot].region, Some(regions[0]));
        }
    }

    #[test]
    fn every_slot_stays_in_one_level_and_one_region() {
        let mut moeadd = optimizer(10, 110, 31);
        moeadd.run();

        assert_eq!(moeadd.core.evaluations, 110);
        assert_eq!(moeadd.core.population.len(), 10);
        assert_partitions_consistent(&moeadd);
    }

    #[test]
    fn partitions_hold_under_a_longer_run() {
        let mut moeadd = optimizer(10, 510, 77);
        moeadd.run();
        assert_partitions_consistent(&moeadd);
        assert_eq!(moeadd.result().len(), 10);
    }

    #[test]
    fn line_distance_vanishes_on_the_weight_line() {
        let mut moeadd = optimizer(10, 110, 5);
        moeadd.core.initialize_population();

        // unit weights anchored at the ideal point: a point straight
        // along a weight vector has zero orthogonal distance
        let lambda: Vec<f64> = moeadd.unit_weights.row(3).to_vec();
        let z = moeadd.core.ideal.values().to_vec();
        let on_line: Vec<f64> =
            z.iter().zip(&lambda).map(|(&zj, &w)| zj + 2.0 * w).collect();

        assert!(moeadd.line_distance(&on_line, 3) < 1e-9);
        let off_line: Vec<f64> = on_line.iter().map(|&f| f + 1.0).collect();
        assert!(moeadd.line_distance(&off_line, 3) > 0.0);
    }

    #[test]
    fn ranks_are_internally_consistent_after_initialization() {
        let mut moeadd = optimizer(10, 110, 9);
        moeadd.core.initialize_population();
        for i in 0..10 {
            moeadd.subregion_idx[[i, i]] = 1;
            moeadd.core.population[i].region = Some(i);
        }
        let objectives: Vec<Vec<f64>> = moeadd
            .core
            .population
            .iter()
            .map(|s| s.objectives.clone())
            .collect();
        let fronts = ens_nondominated_sorting(&objectives);
        moeadd.num_ranks = fronts.len();
        for (level, front) in fronts.iter().enumerate() {
            for &slot in front {
                moeadd.rank_idx[[level, slot]] = 1;
                moeadd.core.population[slot].rank = Some(level);
            }
        }

        assert_partitions_consistent(&moeadd);

        // a dominating child lands on the first level
        let mut child = FloatSolution::new(vec![0.0; 6], 2);
        child.objectives = vec![-1.0, -1.0];
        moeadd.insert(child);
        assert_partitions_consistent(&moeadd);
    }
}
