/// Per-objective best value observed so far, the `z` vector anchoring
/// the scalarizing functions.
///
/// The point is a pure min fold over every evaluated solution and is
/// never reset within a run, so each component is monotonically
/// non-increasing. Fitness computations read whatever the point holds
/// at call time; the mid-generation drift this causes is part of the
/// published algorithms and is kept as is.
#[derive(Clone, Debug)]
pub struct IdealPoint {
    values: Vec<f64>,
}

impl IdealPoint {
    pub fn new(objectives: usize) -> Self {
        IdealPoint {
            values: vec![f64::INFINITY; objectives],
        }
    }

    pub fn update(&mut self, objectives: &[f64]) {
        for (z, &f) in self.values.iter_mut().zip(objectives) {
            if f < *z {
                *z = f;
            }
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value(&self, objective: usize) -> f64 {
        self.values[objective]
    }
}

/// Per-objective worst value observed so far; the max-fold counterpart
/// of [`IdealPoint`], used for normalization in the stable-matching and
/// dominance-decomposition variants.
#[derive(Clone, Debug)]
pub struct NadirPoint {
    values: Vec<f64>,
}

impl NadirPoint {
    pub fn new(objectives: usize) -> Self {
        NadirPoint {
            values: vec![f64::NEG_INFINITY; objectives],
        }
    }

    pub fn update(&mut self, objectives: &[f64]) {
        for (nz, &f) in self.values.iter_mut().zip(objectives) {
            if f > *nz {
                *nz = f;
            }
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value(&self, objective: usize) -> f64 {
        self.values[objective]
    }
}
