use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::autograd::{Tape, Var};
use crate::error::Result;
use crate::math::Tensor;

/// Fully connected layer: `a = f(x · W + b)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    /// `[input_size, size]`
    pub weights: Tensor,
    /// `[size]`
    pub biases: Tensor,
    pub activator: ActivationFunction,
}

impl Layer {
    /// He init for ReLU-family activations, Xavier for the rest; zero biases.
    pub fn with_rng<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = if activation.is_rectifier() {
            Tensor::he(input_size, size, rng)
        } else {
            Tensor::xavier(input_size, size, rng)
        };
        Layer {
            size,
            weights,
            biases: Tensor::zeros(&[size]),
            activator: activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    /// Records the layer on `tape`. `input` must be `[batch, input_size]`;
    /// `weights` and `biases` are this layer's parameter vars.
    pub fn feed_from(&self, tape: &mut Tape, weights: Var, biases: Var, input: Var) -> Result<Var> {
        let z = tape.matmul(input, weights)?;
        let z = tape.add_bias(z, biases)?;
        Ok(tape.activation(z, self.activator.clone()))
    }

    /// Same shapes as `other`, so `other`'s values can replace ours.
    pub fn is_compatible(&self, other: &Layer) -> bool {
        self.weights.shape() == other.weights.shape() && self.biases.shape() == other.biases.shape()
    }
}
