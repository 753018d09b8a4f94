use crate::error::{Result, TrainError};
use crate::math::Tensor;
use crate::optim::{check_shapes, Optimizer};

/// Adam with bias correction folded into the step size.
///
/// First and second moment buffers are created on the first step, one per
/// parameter tensor, and live only as long as the optimizer.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta_1: f64,
    pub beta_2: f64,
    pub epsilon: f64,
    iterations: u64,
    m: Vec<Tensor>,
    v: Vec<Tensor>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta_1: f64, beta_2: f64, epsilon: f64) -> Adam {
        Adam {
            learning_rate,
            beta_1,
            beta_2,
            epsilon,
            iterations: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

impl Optimizer for Adam {
    fn check(&self, params: &[&Tensor], grads: &[Tensor]) -> Result<()> {
        check_shapes(params, grads)?;
        if self.m.is_empty() {
            return Ok(());
        }
        if self.m.len() != grads.len() {
            return Err(TrainError::InvalidArgument(format!(
                "optimizer tracks {} parameters, step got {}", self.m.len(), grads.len()
            )));
        }
        for (m, grad) in self.m.iter().zip(grads) {
            if m.shape() != grad.shape() {
                return Err(TrainError::shape("adam", m.shape(), grad.shape()));
            }
        }
        Ok(())
    }

    fn step(&mut self, params: Vec<&mut Tensor>, grads: &[Tensor]) -> Result<()> {
        {
            let view: Vec<&Tensor> = params.iter().map(|p| &**p).collect();
            self.check(&view, grads)?;
        }
        if self.m.is_empty() {
            self.m = grads.iter().map(Tensor::zeros_like).collect();
            self.v = grads.iter().map(Tensor::zeros_like).collect();
        }

        self.iterations += 1;
        let t = self.iterations as i32;
        let lr_t = self.learning_rate * (1.0 - self.beta_2.powi(t)).sqrt() / (1.0 - self.beta_1.powi(t));

        for (((param, grad), m), v) in params.into_iter().zip(grads).zip(&mut self.m).zip(&mut self.v) {
            let moments = m.data_mut().iter_mut().zip(v.data_mut().iter_mut());
            for ((p, &g), (m, v)) in param.data_mut().iter_mut().zip(grad.data()).zip(moments) {
                *m = self.beta_1 * *m + (1.0 - self.beta_1) * g;
                *v = self.beta_2 * *v + (1.0 - self.beta_2) * g * g;
                *p -= lr_t * *m / (v.sqrt() + self.epsilon);
            }
        }
        Ok(())
    }
}
