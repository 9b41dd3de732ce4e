use crate::solution::FloatSolution;
use crate::Problem;

/// The Srinivas benchmark: two objectives, two variables in
/// `[-20, 20]`, and two inequality constraints.
#[derive(Clone, Default)]
pub struct Srinivas;

impl Problem for Srinivas {
    fn name(&self) -> &str {
        "Srinivas"
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_variables(&self) -> usize {
        2
    }

    fn lower_bound(&self, _variable: usize) -> f64 {
        -20.0
    }

    fn upper_bound(&self, _variable: usize) -> f64 {
        20.0
    }

    fn evaluate(&self, solution: &mut FloatSolution) {
        let x1 = solution.variables[0];
        let x2 = solution.variables[1];

        solution.objectives[0] = 2.0 + (x1 - 2.0) * (x1 - 2.0) + (x2 - 1.0) * (x2 - 1.0);
        solution.objectives[1] = 9.0 * x1 - (x2 - 1.0) * (x2 - 1.0);
    }

    fn evaluate_constraints(&self, solution: &mut FloatSolution) {
        let x1 = solution.variables[0];
        let x2 = solution.variables[1];

        // g >= 0 means the constraint is satisfied
        let constraints = [
            1.0 - (x1 * x1 + x2 * x2) / 225.0,
            (3.0 * x2 - x1) / 10.0 - 1.0,
        ];

        let violation: f64 = constraints.iter().filter(|&&g| g < 0.0).sum();
        solution.constraint_violation = Some(violation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feasible_point_has_zero_violation() {
        let problem = Srinivas;
        // x1^2 + x2^2 <= 225 and 3*x2 - x1 >= 10
        let mut solution = FloatSolution::new(vec![0.0, 5.0], 2);

        problem.evaluate(&mut solution);
        problem.evaluate_constraints(&mut solution);

        assert!(solution.is_feasible());
        assert_eq!(solution.constraint_violation, Some(0.0));
    }

    #[test]
    fn infeasible_point_accumulates_negative_violation() {
        let problem = Srinivas;
        let mut solution = FloatSolution::new(vec![20.0, -20.0], 2);

        problem.evaluate(&mut solution);
        problem.evaluate_constraints(&mut solution);

        assert!(!solution.is_feasible());
        assert!(solution.constraint_violation.unwrap() < 0.0);
        assert!(solution.violation_degree() > 0.0);
    }
}
