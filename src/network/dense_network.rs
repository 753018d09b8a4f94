use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::autograd::{Tape, Var};
use crate::error::{Result, TrainError};
use crate::layers::Layer;
use crate::math::Tensor;
use crate::network::Network;

/// Stack of dense layers over flattened samples.
///
/// Input `[batch, d1, d2, ...]` is flattened to `[batch, d1*d2*...]`. When
/// the last layer is as wide as the flattened input, the output takes the
/// input's shape back (generator use); otherwise it stays `[batch, out]`
/// (discriminator use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    pub layers: Vec<Layer>,
}

impl DenseNetwork {
    /// Builds a network from (size, input_size, activation) tuples.
    pub fn with_rng<R: Rng + ?Sized>(
        layer_specs: Vec<(usize, usize, ActivationFunction)>,
        rng: &mut R,
    ) -> DenseNetwork {
        let layers = layer_specs.into_iter()
            .map(|(size, input_size, activation)| Layer::with_rng(size, input_size, activation, rng))
            .collect();
        DenseNetwork { layers }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(Layer::input_size).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &Path) -> Result<DenseNetwork> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Network for DenseNetwork {
    fn parameters(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| [&l.weights, &l.biases]).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers.iter_mut().flat_map(|l| [&mut l.weights, &mut l.biases]).collect()
    }

    fn forward(&self, tape: &mut Tape, params: &[Var], input: Var) -> Result<Var> {
        if params.len() != 2 * self.layers.len() {
            return Err(TrainError::InvalidArgument(format!(
                "expected {} parameter vars, got {}",
                2 * self.layers.len(),
                params.len()
            )));
        }
        let in_shape = tape.value(input).shape().to_vec();
        let batch = in_shape.first().copied().unwrap_or(1);
        let features: usize = in_shape.iter().skip(1).product();
        if features != self.input_size() {
            return Err(TrainError::shape("dense_network", &in_shape, &[batch, self.input_size()]));
        }

        let mut current = tape.reshape(input, &[batch, features])?;
        for (layer, p) in self.layers.iter().zip(params.chunks(2)) {
            current = layer.feed_from(tape, p[0], p[1], current)?;
        }

        if self.output_size() == features && in_shape.len() > 2 {
            current = tape.reshape(current, &in_shape)?;
        }
        Ok(current)
    }

    fn save_weights(&self, path: &Path) -> Result<()> {
        self.save_json(path)
    }

    /// Replaces all parameters; the stored architecture must match layer for layer.
    fn load_weights(&mut self, path: &Path) -> Result<()> {
        let loaded = DenseNetwork::load_json(path)?;
        if loaded.layers.len() != self.layers.len() {
            return Err(TrainError::InvalidArgument(format!(
                "{} has {} layers, network has {}",
                path.display(),
                loaded.layers.len(),
                self.layers.len()
            )));
        }
        for (ours, theirs) in self.layers.iter().zip(loaded.layers.iter()) {
            if !ours.is_compatible(theirs) {
                return Err(TrainError::shape("load_weights", ours.weights.shape(), theirs.weights.shape()));
            }
        }
        self.layers = loaded.layers;
        Ok(())
    }
}
