use rand::{rngs::StdRng, SeedableRng};

use crate::activation::ActivationFunction;
use crate::network::dense_network::DenseNetwork;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `size`       : number of neurons in this layer
/// - `input_size` : number of neurons feeding into this layer (the output
///                  size of the previous layer, or the flattened sample size
///                  for the first layer)
/// - `activation` : activation function applied after the linear transform
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// A serializable description of a dense architecture, stored independently
/// of the trained weights.
#[derive(Debug, Clone)]
pub struct NetworkSpec {
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// Image-to-image translator: one LeakyReLU bottleneck, Tanh output as
    /// wide as the flattened image.
    pub fn generator(name: &str, features: usize, hidden: usize) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            layers: vec![
                LayerSpec { size: hidden, input_size: features, activation: ActivationFunction::LeakyReLU { alpha: 0.2 } },
                LayerSpec { size: features, input_size: hidden, activation: ActivationFunction::Tanh },
            ],
        }
    }

    /// Real/fake scorer emitting one raw logit per sample.
    pub fn discriminator(name: &str, features: usize, hidden: usize) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            layers: vec![
                LayerSpec { size: hidden, input_size: features, activation: ActivationFunction::LeakyReLU { alpha: 0.2 } },
                LayerSpec { size: 1, input_size: hidden, activation: ActivationFunction::Identity },
            ],
        }
    }

    fn tuples(&self) -> Vec<(usize, usize, ActivationFunction)> {
        self.layers.iter().map(|l| (l.size, l.input_size, l.activation.clone())).collect()
    }

    /// Reproducible initialization, for tests and demos.
    pub fn build_seeded(&self, seed: u64) -> DenseNetwork {
        DenseNetwork::with_rng(self.tuples(), &mut StdRng::seed_from_u64(seed))
    }
}
