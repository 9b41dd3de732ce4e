use std::fmt::{Debug, Formatter};

use rand::{Rng, RngCore};

use crate::Problem;

/// A candidate solution: a real-valued decision vector plus the results
/// of its evaluation.
///
/// `rank` and `region` are bookkeeping fields written only by the
/// dominance-decomposition variant: the non-domination level the
/// solution currently sits at and the subregion (weight line) it is
/// assigned to.
#[derive(Clone)]
pub struct FloatSolution {
    pub variables: Vec<f64>,
    pub objectives: Vec<f64>,
    /// Overall constraint violation, `<= 0.0`, where `0.0` is feasible.
    /// `None` until `evaluate_constraints` has run (or for unconstrained
    /// problems).
    pub constraint_violation: Option<f64>,
    pub rank: Option<usize>,
    pub region: Option<usize>,
}

impl FloatSolution {
    pub fn new(variables: Vec<f64>, number_of_objectives: usize) -> Self {
        FloatSolution {
            variables,
            objectives: vec![0.0; number_of_objectives],
            constraint_violation: None,
            rank: None,
            region: None,
        }
    }

    /// A uniformly random solution within the problem's variable bounds.
    pub fn random(problem: &(impl Problem + ?Sized), rng: &mut dyn RngCore) -> Self {
        let variables = (0..problem.number_of_variables())
            .map(|i| rng.gen_range(problem.lower_bound(i)..=problem.upper_bound(i)))
            .collect();

        FloatSolution::new(variables, problem.number_of_objectives())
    }

    /// Absolute violation degree; `0.0` when feasible or unconstrained.
    pub fn violation_degree(&self) -> f64 {
        self.constraint_violation.unwrap_or(0.0).abs()
    }

    pub fn is_feasible(&self) -> bool {
        self.violation_degree() == 0.0
    }
}

impl Debug for FloatSolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloatSolution")
            .field("objectives", &self.objectives)
            .field("violation", &self.constraint_violation)
            .finish()
    }
}
