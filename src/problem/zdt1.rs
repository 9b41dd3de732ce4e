use crate::solution::FloatSolution;
use crate::Problem;

/// The ZDT1 benchmark: two objectives over `[0, 1]^n` with a convex
/// Pareto front at `g = 1`.
#[derive(Clone)]
pub struct Zdt1 {
    variables: usize,
}

impl Zdt1 {
    pub fn new(variables: usize) -> Self {
        Zdt1 { variables }
    }
}

impl Default for Zdt1 {
    fn default() -> Self {
        Zdt1::new(30)
    }
}

impl Problem for Zdt1 {
    fn name(&self) -> &str {
        "ZDT1"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_variables(&self) -> usize {
        self.variables
    }

    fn lower_bound(&self, _variable: usize) -> f64 {
        0.0
    }

    fn upper_bound(&self, _variable: usize) -> f64 {
        1.0
    }

    fn evaluate(&self, solution: &mut FloatSolution) {
        let x = &solution.variables;
        let f1 = x[0];

        let g = 1.0 + 9.0 * x[1..].iter().sum::<f64>() / (self.variables - 1) as f64;
        let f2 = g * (1.0 - (f1 / g).sqrt());

        solution.objectives[0] = f1;
        solution.objectives[1] = f2;
    }
}
