use crate::config::{MoeadConfig, MoeadVariant};
use crate::solution::FloatSolution;
use crate::{MoeadError, Problem};

pub mod constraint;
pub mod core;
pub mod dra;
pub mod iepsilon;
pub mod moead;
pub mod moeadd;
pub mod stm;

/// A decomposition-based optimizer.
///
/// Construction validates the configuration and may fail; `run` is
/// infallible and drives the generational loop until the evaluation
/// budget is spent. `result` returns the final front once `run` has
/// finished (an empty slice before that).
pub trait Optimizer {
    fn name(&self) -> &str;
    fn run(&mut self);
    fn result(&self) -> &[FloatSolution];
}

/// Build the requested variant with the default reproduction operators.
pub fn create(
    variant: MoeadVariant,
    problem: Box<dyn Problem>,
    config: MoeadConfig,
) -> Result<Box<dyn Optimizer>, MoeadError> {
    Ok(match variant {
        MoeadVariant::Moead => Box::new(moead::Moead::new(problem, config)?),
        MoeadVariant::MoeadConstraint => {
            Box::new(constraint::ConstraintMoead::new(problem, config)?)
        }
        MoeadVariant::MoeadIEpsilon => Box::new(iepsilon::MoeadIEpsilon::new(problem, config)?),
        MoeadVariant::MoeadDra => Box::new(dra::MoeadDra::new(problem, config)?),
        MoeadVariant::MoeadStm => Box::new(stm::MoeadStm::new(problem, config)?),
        MoeadVariant::MoeadD => Box::new(moeadd::MoeadD::new(problem, config)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Zdt1;

    #[test]
    fn factory_builds_every_variant() {
        for variant in [
            MoeadVariant::Moead,
            MoeadVariant::MoeadConstraint,
            MoeadVariant::MoeadIEpsilon,
            MoeadVariant::MoeadDra,
            MoeadVariant::MoeadStm,
            MoeadVariant::MoeadD,
        ] {
            let config = MoeadConfig::new(50, 1_000).with_neighbor_size(10);
            let optimizer = create(variant, Box::new(Zdt1::default()), config).unwrap();
            assert!(!optimizer.name().is_empty());
        }
    }

    #[test]
    fn factory_rejects_bad_configuration() {
        let config = MoeadConfig::new(10, 1_000).with_neighbor_size(50);
        assert!(create(MoeadVariant::Moead, Box::new(Zdt1::default()), config).is_err());
    }
}
