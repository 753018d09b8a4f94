use crate::activation::ActivationFunction;
use crate::error::{Result, TrainError};
use crate::loss::bce::BceWithLogitsLoss;
use crate::loss::mae::MaeLoss;
use crate::math::Tensor;

/// Handle to a value recorded on a [`Tape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(usize);

#[derive(Debug)]
enum Op {
    Leaf,
    MatMul(Var, Var),
    /// `[n, m] + [m]`, bias broadcast over rows.
    AddBias(Var, Var),
    Activation(Var, ActivationFunction),
    Reshape(Var),
    Add(Var, Var),
    Scale(Var, f64),
    MeanAbsDiff(Var, Var),
    /// Mean BCE of logits against a constant target value.
    BceWithLogits(Var, f64),
}

#[derive(Debug)]
struct Node {
    value: Tensor,
    op: Op,
}

/// A recorded computation supporting any number of gradient queries.
///
/// Every operation appends a node, so node order is already a topological
/// order. The tape is not consumed by [`Tape::gradient`]; one forward
/// recording can be differentiated against several losses and parameter
/// subsets before it is dropped.
#[derive(Debug, Default)]
pub struct Tape {
    nodes: Vec<Node>,
}

impl Tape {
    pub fn new() -> Tape {
        Tape::default()
    }

    fn push(&mut self, value: Tensor, op: Op) -> Var {
        self.nodes.push(Node { value, op });
        Var(self.nodes.len() - 1)
    }

    /// Records an input or parameter.
    pub fn leaf(&mut self, value: Tensor) -> Var {
        self.push(value, Op::Leaf)
    }

    pub fn value(&self, var: Var) -> &Tensor {
        &self.nodes[var.0].value
    }

    pub fn matmul(&mut self, a: Var, b: Var) -> Result<Var> {
        let value = self.value(a).matmul(self.value(b))?;
        Ok(self.push(value, Op::MatMul(a, b)))
    }

    pub fn add_bias(&mut self, x: Var, bias: Var) -> Result<Var> {
        let xv = self.value(x);
        let bv = self.value(bias);
        let cols = bv.len();
        if xv.shape().len() != 2 || xv.shape()[1] != cols {
            return Err(TrainError::shape("add_bias", xv.shape(), bv.shape()));
        }
        let mut value = xv.clone();
        for row in value.data_mut().chunks_mut(cols) {
            for (v, b) in row.iter_mut().zip(bv.data()) {
                *v += b;
            }
        }
        Ok(self.push(value, Op::AddBias(x, bias)))
    }

    pub fn activation(&mut self, x: Var, function: ActivationFunction) -> Var {
        let value = function.apply(self.value(x));
        self.push(value, Op::Activation(x, function))
    }

    pub fn reshape(&mut self, x: Var, shape: &[usize]) -> Result<Var> {
        let value = self.value(x).reshape(shape)?;
        Ok(self.push(value, Op::Reshape(x)))
    }

    pub fn add(&mut self, a: Var, b: Var) -> Result<Var> {
        let value = self.value(a).zip_map(self.value(b), "add", |x, y| x + y)?;
        Ok(self.push(value, Op::Add(a, b)))
    }

    pub fn scale(&mut self, x: Var, factor: f64) -> Var {
        let value = self.value(x).map(|v| v * factor);
        self.push(value, Op::Scale(x, factor))
    }

    /// Scalar `mean(|a - b|)`.
    pub fn mean_abs_diff(&mut self, a: Var, b: Var) -> Result<Var> {
        let (av, bv) = (self.value(a), self.value(b));
        if av.shape() != bv.shape() {
            return Err(TrainError::shape("mean_abs_diff", av.shape(), bv.shape()));
        }
        let value = Tensor::scalar(MaeLoss::loss(av.data(), bv.data()));
        Ok(self.push(value, Op::MeanAbsDiff(a, b)))
    }

    /// Scalar mean binary cross-entropy of logits `x` against a target
    /// tensor filled with `target`.
    pub fn bce_with_logits(&mut self, x: Var, target: f64) -> Var {
        let xv = self.value(x);
        let expected = vec![target; xv.len()];
        let value = Tensor::scalar(BceWithLogitsLoss::loss(xv.data(), &expected));
        self.push(value, Op::BceWithLogits(x, target))
    }

    fn inputs(op: &Op) -> Vec<Var> {
        match *op {
            Op::Leaf => Vec::new(),
            Op::Activation(x, _) | Op::Reshape(x) | Op::Scale(x, _) | Op::BceWithLogits(x, _) => {
                vec![x]
            }
            Op::MatMul(a, b) | Op::AddBias(a, b) | Op::Add(a, b) | Op::MeanAbsDiff(a, b) => {
                vec![a, b]
            }
        }
    }

    /// Gradient of `output` (summed over its elements) with respect to each
    /// var in `wrt`. Vars that `output` does not depend on get zeros.
    pub fn gradient(&self, output: Var, wrt: &[Var]) -> Result<Vec<Tensor>> {
        let end = output.0 + 1;

        // Only walk nodes that lie on a path from some `wrt` var.
        let mut needed = vec![false; end];
        for v in wrt {
            if v.0 < end {
                needed[v.0] = true;
            }
        }
        for i in 0..end {
            if !needed[i] && Tape::inputs(&self.nodes[i].op).iter().any(|v| needed[v.0]) {
                needed[i] = true;
            }
        }

        let mut grads: Vec<Option<Tensor>> = vec![None; end];
        grads[output.0] = Some(Tensor::ones(self.value(output).shape()));

        for i in (0..end).rev() {
            if !needed[i] {
                continue;
            }
            let Some(g) = grads[i].take() else { continue };
            let node = &self.nodes[i];
            for (input, contribution) in self.backward(&node.op, &node.value, &g, &needed)? {
                accumulate(&mut grads, input, contribution)?;
            }
            grads[i] = Some(g);
        }

        Ok(wrt
            .iter()
            .map(|v| match grads.get(v.0).and_then(Option::as_ref) {
                Some(g) => g.clone(),
                None => Tensor::zeros_like(self.value(*v)),
            })
            .collect())
    }

    /// Per-input gradient contributions of one node, skipping inputs that
    /// no requested var depends on.
    fn backward(&self, op: &Op, value: &Tensor, g: &Tensor, needed: &[bool]) -> Result<Vec<(Var, Tensor)>> {
        let mut out = Vec::new();
        match *op {
            Op::Leaf => {}
            Op::MatMul(a, b) => {
                if needed[a.0] {
                    out.push((a, g.matmul(&self.value(b).transpose()?)?));
                }
                if needed[b.0] {
                    out.push((b, self.value(a).transpose()?.matmul(g)?));
                }
            }
            Op::AddBias(x, bias) => {
                if needed[x.0] {
                    out.push((x, g.clone()));
                }
                if needed[bias.0] {
                    let cols = self.value(bias).len();
                    let mut sums = vec![0.0; cols];
                    for row in g.data().chunks(cols) {
                        for (s, v) in sums.iter_mut().zip(row) {
                            *s += v;
                        }
                    }
                    out.push((bias, Tensor::from_vec(self.value(bias).shape(), sums)?));
                }
            }
            Op::Activation(x, ref function) => {
                out.push((x, function.backward(self.value(x), g)));
            }
            Op::Reshape(x) => {
                out.push((x, g.reshape(self.value(x).shape())?));
            }
            Op::Add(a, b) => {
                if needed[a.0] {
                    out.push((a, g.clone()));
                }
                if needed[b.0] {
                    out.push((b, g.clone()));
                }
            }
            Op::Scale(x, factor) => {
                out.push((x, g.map(|v| v * factor)));
            }
            Op::MeanAbsDiff(a, b) => {
                let upstream = g.item();
                let (av, bv) = (self.value(a), self.value(b));
                let d = MaeLoss::derivative(av.data(), bv.data());
                if needed[a.0] {
                    let da = d.iter().map(|v| v * upstream).collect();
                    out.push((a, Tensor::from_vec(av.shape(), da)?));
                }
                if needed[b.0] {
                    let db = d.iter().map(|v| -v * upstream).collect();
                    out.push((b, Tensor::from_vec(bv.shape(), db)?));
                }
            }
            Op::BceWithLogits(x, target) => {
                let upstream = g.item();
                let xv = self.value(x);
                let expected = vec![target; xv.len()];
                let dx = BceWithLogitsLoss::derivative(xv.data(), &expected)
                    .into_iter()
                    .map(|v| v * upstream)
                    .collect();
                out.push((x, Tensor::from_vec(xv.shape(), dx)?));
            }
        }
        debug_assert!(value.shape() == g.shape());
        Ok(out)
    }
}

fn accumulate(grads: &mut [Option<Tensor>], var: Var, contribution: Tensor) -> Result<()> {
    match &mut grads[var.0] {
        Some(existing) => existing.add_assign(&contribution),
        slot @ None => {
            *slot = Some(contribution);
            Ok(())
        }
    }
}
