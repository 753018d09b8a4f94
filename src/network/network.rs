use std::path::Path;

use crate::autograd::{Tape, Var};
use crate::error::Result;
use crate::math::Tensor;

/// A differentiable function from a batch tensor to an output tensor.
///
/// The trainer treats generators and discriminators only through this
/// trait. Parameters are recorded on a [`Tape`] with [`Network::watch`] once
/// per tape; every forward call on that tape reuses the same vars so the
/// gradient of a network applied several times accumulates across uses.
pub trait Network {
    /// Trainable parameters, in a fixed order.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Same order as [`Network::parameters`].
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Records the forward pass of `input` using the parameter vars
    /// returned by [`Network::watch`] on the same tape.
    fn forward(&self, tape: &mut Tape, params: &[Var], input: Var) -> Result<Var>;

    fn save_weights(&self, path: &Path) -> Result<()>;

    fn load_weights(&mut self, path: &Path) -> Result<()>;

    fn watch(&self, tape: &mut Tape) -> Vec<Var> {
        self.parameters()
            .into_iter()
            .map(|p| tape.leaf(p.clone()))
            .collect()
    }

    /// Inference: the recording is dropped without any gradient query.
    fn predict(&self, input: &Tensor) -> Result<Tensor> {
        let mut tape = Tape::new();
        let params = self.watch(&mut tape);
        let x = tape.leaf(input.clone());
        let y = self.forward(&mut tape, &params, x)?;
        Ok(tape.value(y).clone())
    }
}
