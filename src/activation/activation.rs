use serde::{Serialize, Deserialize};

use crate::math::Tensor;

/// Element-wise activation applied after a dense layer's affine transform.
///
/// Generators end in `Tanh` (normalized `[-1, 1]` images) and
/// discriminators in `Identity`, since the losses consume raw logits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Derivative evaluated at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => 1.0 - x.tanh().powi(2),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }

    /// He init suits the rectifier family; the rest use Xavier.
    pub fn is_rectifier(&self) -> bool {
        matches!(self, ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. })
    }

    pub fn apply(&self, pre: &Tensor) -> Tensor {
        pre.map(|x| self.function(x))
    }

    /// Chain rule through the activation: `upstream * f'(pre)`.
    pub fn backward(&self, pre: &Tensor, upstream: &Tensor) -> Tensor {
        let mut out = upstream.clone();
        for (g, &x) in out.data_mut().iter_mut().zip(pre.data()) {
            *g *= self.derivative(x);
        }
        out
    }
}
