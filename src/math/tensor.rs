use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Result, TrainError};

/// Dense row-major n-dimensional array of `f64`.
///
/// Image batches use the layout `[batch, height, width, channels]`; layer
/// parameters are `[fan_in, fan_out]` weights and `[fan_out]` biases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor::full(shape, 0.0)
    }

    pub fn ones(shape: &[usize]) -> Tensor {
        Tensor::full(shape, 1.0)
    }

    pub fn full(shape: &[usize], value: f64) -> Tensor {
        Tensor {
            shape: shape.to_vec(),
            data: vec![value; shape.iter().product()],
        }
    }

    /// Rank-0 tensor holding a single value.
    pub fn scalar(value: f64) -> Tensor {
        Tensor { shape: Vec::new(), data: vec![value] }
    }

    pub fn from_vec(shape: &[usize], data: Vec<f64>) -> Result<Tensor> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(TrainError::InvalidArgument(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Tensor { shape: shape.to_vec(), data })
    }

    pub fn zeros_like(other: &Tensor) -> Tensor {
        Tensor::zeros(&other.shape)
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform on (0, 1] so the log never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, std_dev: f64, rng: &mut R) -> Tensor {
        let data = (0..fan_in * fan_out)
            .map(|_| Tensor::sample_standard_normal(rng) * std_dev)
            .collect();
        Tensor { shape: vec![fan_in, fan_out], data }
    }

    /// He initialization, N(0, sqrt(2 / fan_in)). Use before ReLU-family layers.
    pub fn he<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Tensor {
        Tensor::normal(fan_in, fan_out, (2.0 / fan_in as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization, N(0, sqrt(1 / fan_in)).
    /// Use before Sigmoid/Tanh/Identity layers.
    pub fn xavier<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Tensor {
        Tensor::normal(fan_in, fan_out, (1.0 / fan_in as f64).sqrt(), rng)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First value; the whole value for a scalar.
    pub fn item(&self) -> f64 {
        self.data.first().copied().unwrap_or(0.0)
    }

    /// Size of the leading (batch) dimension.
    pub fn batch_size(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor> {
        if shape.iter().product::<usize>() != self.data.len() {
            return Err(TrainError::shape("reshape", &self.shape, shape));
        }
        Ok(Tensor { shape: shape.to_vec(), data: self.data.clone() })
    }

    /// Item `index` of the batch, keeping a leading dimension of 1.
    pub fn batch_item(&self, index: usize) -> Result<Tensor> {
        let n = self.batch_size();
        if self.shape.is_empty() || index >= n {
            return Err(TrainError::InvalidArgument(format!(
                "batch index {} out of range for shape {:?}",
                index, self.shape
            )));
        }
        let stride = self.data.len() / n;
        let mut shape = self.shape.clone();
        shape[0] = 1;
        Ok(Tensor {
            shape,
            data: self.data[index * stride..(index + 1) * stride].to_vec(),
        })
    }

    pub fn map<F>(&self, functor: F) -> Tensor
    where
        F: Fn(f64) -> f64,
    {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Element-wise combination of two same-shape tensors.
    pub fn zip_map<F>(&self, other: &Tensor, op: &'static str, functor: F) -> Result<Tensor>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape != other.shape {
            return Err(TrainError::shape(op, &self.shape, &other.shape));
        }
        Ok(Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().zip(other.data.iter()).map(|(&a, &b)| functor(a, b)).collect(),
        })
    }

    /// In-place `self += other`; used for gradient accumulation.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<()> {
        if self.shape != other.shape {
            return Err(TrainError::shape("add_assign", &self.shape, &other.shape));
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.sum() / self.data.len() as f64
    }

    fn dims2(&self, op: &'static str) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            &[rows, cols] => Ok((rows, cols)),
            other => Err(TrainError::InvalidArgument(format!(
                "{op} expects a rank-2 tensor, got shape {other:?}"
            ))),
        }
    }

    pub fn transpose(&self) -> Result<Tensor> {
        let (rows, cols) = self.dims2("transpose")?;
        let mut data = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data[i * cols + j];
            }
        }
        Ok(Tensor { shape: vec![cols, rows], data })
    }

    /// Matrix product of `[n, k] x [k, m]`.
    pub fn matmul(&self, rhs: &Tensor) -> Result<Tensor> {
        let (n, k) = self.dims2("matmul")?;
        let (k2, m) = rhs.dims2("matmul")?;
        if k != k2 {
            return Err(TrainError::shape("matmul", &self.shape, &rhs.shape));
        }
        let mut data = vec![0.0; n * m];
        for i in 0..n {
            for p in 0..k {
                let a = self.data[i * k + p];
                if a == 0.0 {
                    continue;
                }
                let row = &rhs.data[p * m..(p + 1) * m];
                for (out, &b) in data[i * m..(i + 1) * m].iter_mut().zip(row) {
                    *out += a * b;
                }
            }
        }
        Ok(Tensor { shape: vec![n, m], data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn matmul_and_transpose() {
        let a = Tensor::from_vec(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let b = a.transpose().unwrap();
        assert_eq!(b.shape(), &[3, 2]);
        assert_eq!(b.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.data(), &[14.0, 32.0, 32.0, 77.0]);
    }

    #[test]
    fn matmul_rejects_inner_dimension_mismatch() {
        let a = Tensor::zeros(&[2, 3]);
        let b = Tensor::zeros(&[2, 3]);
        assert!(matches!(a.matmul(&b), Err(TrainError::ShapeMismatch { .. })));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Tensor::from_vec(&[2, 2], vec![1.0; 3]).is_err());
    }

    #[test]
    fn batch_item_slices_leading_dimension() {
        let t = Tensor::from_vec(&[3, 2], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let item = t.batch_item(1).unwrap();
        assert_eq!(item.shape(), &[1, 2]);
        assert_eq!(item.data(), &[2.0, 3.0]);
        assert!(t.batch_item(3).is_err());
    }

    #[test]
    fn he_init_has_expected_spread() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = Tensor::he(200, 50, &mut rng);
        let var = w.data().iter().map(|x| x * x).sum::<f64>() / w.len() as f64;
        // Expected variance 2 / 200 = 0.01.
        assert!((var - 0.01).abs() < 0.002, "variance was {var}");
    }
}
