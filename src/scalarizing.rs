use std::str::FromStr;

use crate::point::IdealPoint;
use crate::MoeadError;

/// Penalty parameter of the boundary-intersection function.
const PBI_THETA: f64 = 5.0;

/// Floor applied to zero weights in the Tchebycheff function so that no
/// objective is ignored entirely.
const ZERO_WEIGHT_FLOOR: f64 = 0.0001;

/// Scalarizing function turning an objective vector plus one weight
/// vector into a single fitness value. Lower is better for all
/// variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarizingFunction {
    WeightedSum,
    Tchebycheff,
    PenaltyBoundaryIntersection,
}

impl ScalarizingFunction {
    pub fn fitness(&self, objectives: &[f64], lambda: &[f64], ideal: &IdealPoint) -> f64 {
        match self {
            ScalarizingFunction::WeightedSum => objectives
                .iter()
                .zip(lambda)
                .map(|(f, w)| w * f)
                .sum(),
            ScalarizingFunction::Tchebycheff => {
                let mut max_fun = f64::NEG_INFINITY;
                for (n, &f) in objectives.iter().enumerate() {
                    let diff = (f - ideal.value(n)).abs();
                    let feval = if lambda[n] == 0.0 {
                        ZERO_WEIGHT_FLOOR * diff
                    } else {
                        lambda[n] * diff
                    };
                    if feval > max_fun {
                        max_fun = feval;
                    }
                }
                max_fun
            }
            ScalarizingFunction::PenaltyBoundaryIntersection => {
                let norm = lambda.iter().map(|w| w * w).sum::<f64>().sqrt();

                let mut d1 = 0.0;
                for (n, &f) in objectives.iter().enumerate() {
                    d1 += (f - ideal.value(n)) * lambda[n];
                }
                d1 = d1.abs() / norm;

                let mut d2 = 0.0;
                for (n, &f) in objectives.iter().enumerate() {
                    let perp = (f - ideal.value(n)) - d1 * (lambda[n] / norm);
                    d2 += perp * perp;
                }
                d2 = d2.sqrt();

                d1 + PBI_THETA * d2
            }
        }
    }
}

impl FromStr for ScalarizingFunction {
    type Err = MoeadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tchebycheff" | "tche" => Ok(ScalarizingFunction::Tchebycheff),
            "weighted-sum" | "agg" => Ok(ScalarizingFunction::WeightedSum),
            "pbi" => Ok(ScalarizingFunction::PenaltyBoundaryIntersection),
            other => Err(MoeadError::Config(format!(
                "unknown scalarizing function '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideal_at(values: &[f64]) -> IdealPoint {
        let mut ideal = IdealPoint::new(values.len());
        ideal.update(values);
        ideal
    }

    #[test]
    fn weighted_sum_by_hand() {
        let ideal = IdealPoint::new(2);
        let fitness =
            ScalarizingFunction::WeightedSum.fitness(&[2.0, 4.0], &[0.3, 0.7], &ideal);

        assert_eq!(fitness, 0.3 * 2.0 + 0.7 * 4.0);
        assert_eq!(fitness, 3.4);
    }

    #[test]
    fn tchebycheff_is_non_negative() {
        let ideal = ideal_at(&[0.0, 0.0]);
        for (f, w) in [
            ([1.0, 2.0], [0.5, 0.5]),
            ([0.0, 0.0], [0.1, 0.9]),
            ([3.0, 0.1], [1.0, 0.0]),
        ] {
            assert!(ScalarizingFunction::Tchebycheff.fitness(&f, &w, &ideal) >= 0.0);
        }
    }

    #[test]
    fn tchebycheff_by_hand() {
        let ideal = ideal_at(&[1.0, 1.0]);
        let fitness =
            ScalarizingFunction::Tchebycheff.fitness(&[3.0, 2.0], &[0.4, 0.6], &ideal);

        // max(0.4 * |3 - 1|, 0.6 * |2 - 1|)
        assert_eq!(fitness, 0.8);
    }

    #[test]
    fn tchebycheff_zero_weight_floor() {
        let ideal = ideal_at(&[0.0, 0.0]);
        let fitness =
            ScalarizingFunction::Tchebycheff.fitness(&[0.0, 10.0], &[1.0, 0.0], &ideal);

        // the zero-weight objective still contributes through the floor
        assert_eq!(fitness, 0.0001 * 10.0);
    }

    #[test]
    fn pbi_on_the_weight_line_has_no_penalty() {
        let ideal = ideal_at(&[0.0, 0.0]);
        // f - z is parallel to lambda, so d2 == 0 and fitness == d1
        let lambda = [1.0, 1.0];
        let fitness = ScalarizingFunction::PenaltyBoundaryIntersection
            .fitness(&[2.0, 2.0], &lambda, &ideal);

        let expected_d1 = (2.0 * 1.0 + 2.0 * 1.0) / 2.0_f64.sqrt();
        assert!((fitness - expected_d1).abs() < 1e-12);
    }

    #[test]
    fn pbi_penalizes_perpendicular_deviation() {
        let ideal = ideal_at(&[0.0, 0.0]);
        let on_line = ScalarizingFunction::PenaltyBoundaryIntersection
            .fitness(&[1.0, 1.0], &[1.0, 1.0], &ideal);
        let off_line = ScalarizingFunction::PenaltyBoundaryIntersection
            .fitness(&[2.0, 0.0], &[1.0, 1.0], &ideal);

        assert!(off_line > on_line);
    }

    #[test]
    fn selector_strings() {
        assert_eq!(
            "tchebycheff".parse::<ScalarizingFunction>().unwrap(),
            ScalarizingFunction::Tchebycheff
        );
        assert_eq!(
            "pbi".parse::<ScalarizingFunction>().unwrap(),
            ScalarizingFunction::PenaltyBoundaryIntersection
        );
        assert!("nsga".parse::<ScalarizingFunction>().is_err());
    }
}
