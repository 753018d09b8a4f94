use crate::error::Result;
use crate::math::Tensor;
use crate::optim::Optimizer;

/// Plain gradient descent, `p -= lr · g`. Stateless.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: Vec<&mut Tensor>, grads: &[Tensor]) -> Result<()> {
        {
            let view: Vec<&Tensor> = params.iter().map(|p| &**p).collect();
            self.check(&view, grads)?;
        }
        for (param, grad) in params.into_iter().zip(grads) {
            for (p, g) in param.data_mut().iter_mut().zip(grad.data()) {
                *p -= self.learning_rate * g;
            }
        }
        Ok(())
    }
}
