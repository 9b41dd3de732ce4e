pub mod config;
pub mod neighborhood;
pub mod operators;
pub mod optimizers;
pub mod point;
pub mod problem;
pub mod scalarizing;
pub mod selection;
pub mod solution;
pub mod sorting;
pub mod weights;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use dyn_clone::DynClone;
use rand::RngCore;

use crate::solution::FloatSolution;

/// Errors raised while configuring an optimizer.
///
/// Every variant is fatal: a malformed weight set or an impossible
/// parameter combination invalidates the whole run, so nothing here is
/// retried or recovered from. All of them surface at construction time,
/// before the generational loop starts.
#[derive(Debug)]
pub enum MoeadError {
    /// Invalid parameter combination or an unrecognized selector string.
    Config(String),
    /// The weight vector file is missing or does not match the expected
    /// `(objectives, population size)` shape.
    WeightFile { path: PathBuf, reason: String },
    /// A weight vector with zero norm, which would break the PBI and
    /// orthogonal-projection computations.
    Degenerate(String),
}

impl Display for MoeadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MoeadError::Config(msg) => write!(f, "configuration error: {}", msg),
            MoeadError::WeightFile { path, reason } => {
                write!(f, "weight vector file {}: {}", path.display(), reason)
            }
            MoeadError::Degenerate(msg) => write!(f, "degenerate weight vector: {}", msg),
        }
    }
}

impl Error for MoeadError {}

/// An optimization problem with `M` objectives over a box-bounded
/// real-valued decision space.
///
/// The engine always minimizes. Constrained problems additionally fill
/// the solution's violation degree in [`Problem::evaluate_constraints`];
/// the convention follows the usual overall-constraint-violation scheme
/// where `0.0` means feasible and more negative means worse.
pub trait Problem: DynClone {
    fn name(&self) -> &str;
    fn number_of_objectives(&self) -> usize;
    fn number_of_variables(&self) -> usize;
    fn lower_bound(&self, variable: usize) -> f64;
    fn upper_bound(&self, variable: usize) -> f64;

    /// Compute the objective vector of `solution` from its variables.
    fn evaluate(&self, solution: &mut FloatSolution);

    /// Compute the overall constraint violation of `solution`.
    ///
    /// The default is a no-op for unconstrained problems.
    fn evaluate_constraints(&self, _solution: &mut FloatSolution) {}

    /// Create a random solution within the variable bounds.
    fn create_solution(&self, rng: &mut dyn RngCore) -> FloatSolution {
        FloatSolution::random(self, rng)
    }
}

dyn_clone::clone_trait_object!(Problem);

/// Recombination operator producing one child per invocation.
///
/// `current` is the solution of the subproblem being evolved; the
/// differential-style operators use it as the base vector. `parents`
/// holds the mating pool selected for this subproblem.
pub trait CrossoverOperator: DynClone {
    fn execute(
        &self,
        current: &FloatSolution,
        parents: &[&FloatSolution],
        problem: &dyn Problem,
        rng: &mut dyn RngCore,
    ) -> FloatSolution;

    /// Number of mating-pool parents this operator expects, excluding
    /// the current solution.
    fn mating_pool_size(&self) -> usize;
}

dyn_clone::clone_trait_object!(CrossoverOperator);

/// Mutation operator applied in place to one child.
pub trait MutationOperator: DynClone {
    fn execute(&self, child: &mut FloatSolution, problem: &dyn Problem, rng: &mut dyn RngCore);
}

dyn_clone::clone_trait_object!(MutationOperator);
