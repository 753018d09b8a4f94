/// Mean absolute error, the distance behind the cycle-consistency and
/// identity terms.
pub struct MaeLoss;

impl MaeLoss {
    /// `mean(|a - b|)`; zero for empty inputs.
    pub fn loss(a: &[f64], b: &[f64]) -> f64 {
        if a.is_empty() {
            return 0.0;
        }
        let total: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
        total / a.len() as f64
    }

    /// Subgradient with respect to `a`: `sign(a - b) / n`, taking 0 where
    /// the two agree. The gradient with respect to `b` is its negation.
    pub fn derivative(a: &[f64], b: &[f64]) -> Vec<f64> {
        let inv_n = 1.0 / a.len().max(1) as f64;
        a.iter()
            .zip(b)
            .map(|(x, y)| match x.partial_cmp(y) {
                Some(std::cmp::Ordering::Greater) => inv_n,
                Some(std::cmp::Ordering::Less) => -inv_n,
                _ => 0.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_absolute_differences() {
        assert!((MaeLoss::loss(&[1.0, -1.0, 0.5, 0.0], &[0.0, 0.0, 0.5, 2.0]) - 1.0).abs() < 1e-12);
        assert_eq!(MaeLoss::loss(&[], &[]), 0.0);
    }

    #[test]
    fn subgradient_is_zero_where_equal() {
        assert_eq!(MaeLoss::derivative(&[2.0, 0.0, 1.0, -3.0], &[1.0, 0.0, 4.0, -3.0]), vec![0.25, 0.0, -0.25, 0.0]);
    }
}
