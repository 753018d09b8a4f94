pub mod adam;
pub mod sgd;

pub use adam::Adam;
pub use sgd::Sgd;

use crate::error::{Result, TrainError};
use crate::math::Tensor;

/// Applies one update to a network's parameters from their gradients.
///
/// `params` and `grads` are in the order given by
/// [`crate::network::Network::parameters`].
pub trait Optimizer {
    /// Fails where `step` would, without touching anything.
    fn check(&self, params: &[&Tensor], grads: &[Tensor]) -> Result<()> {
        check_shapes(params, grads)
    }

    /// Runs `check` first, so a rejected step leaves every parameter as it was.
    fn step(&mut self, params: Vec<&mut Tensor>, grads: &[Tensor]) -> Result<()>;
}

/// One gradient per parameter, each of the parameter's shape.
pub fn check_shapes(params: &[&Tensor], grads: &[Tensor]) -> Result<()> {
    if params.len() != grads.len() {
        return Err(TrainError::InvalidArgument(format!(
            "{} parameters but {} gradients",
            params.len(),
            grads.len()
        )));
    }
    for (param, grad) in params.iter().zip(grads) {
        if param.shape() != grad.shape() {
            return Err(TrainError::shape("optimizer step", param.shape(), grad.shape()));
        }
    }
    Ok(())
}

/// Which optimizer each of the four networks gets. One instance is built per
/// network; moment state is never shared or persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerConfig {
    Adam { learning_rate: f64, beta_1: f64, beta_2: f64, epsilon: f64 },
    Sgd { learning_rate: f64 },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Adam { learning_rate: 2e-4, beta_1: 0.5, beta_2: 0.999, epsilon: 1e-7 }
    }
}

impl OptimizerConfig {
    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerConfig::Adam { learning_rate, beta_1, beta_2, epsilon } => {
                Box::new(Adam::new(learning_rate, beta_1, beta_2, epsilon))
            }
            OptimizerConfig::Sgd { learning_rate } => Box::new(Sgd::new(learning_rate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgd_steps_against_gradient() {
        let mut opt = OptimizerConfig::Sgd { learning_rate: 0.5 }.build();
        let mut p = Tensor::from_vec(&[2], vec![1.0, -1.0]).unwrap();
        opt.step(vec![&mut p], &[Tensor::from_vec(&[2], vec![2.0, -2.0]).unwrap()]).unwrap();
        assert_eq!(p.data(), &[0.0, 0.0]);
    }

    #[test]
    fn late_shape_mismatch_leaves_earlier_params_untouched() {
        for config in [OptimizerConfig::default(), OptimizerConfig::Sgd { learning_rate: 0.5 }] {
            let mut opt = config.build();
            let mut a = Tensor::ones(&[2]);
            let mut b = Tensor::ones(&[3]);
            let grads = [Tensor::ones(&[2]), Tensor::ones(&[2])];
            assert!(opt.step(vec![&mut a, &mut b], &grads).is_err());
            assert_eq!(a, Tensor::ones(&[2]), "{config:?}");
        }
    }
}
