/// Binary cross-entropy computed from raw logits.
///
/// Uses the stable form `max(x, 0) - x·y + ln(1 + e^(-|x|))` so large
/// magnitude logits never overflow.
pub struct BceWithLogitsLoss;

impl BceWithLogitsLoss {
    /// Scalar loss: mean over all elements; zero for empty inputs.
    pub fn loss(logits: &[f64], expected: &[f64]) -> f64 {
        if logits.is_empty() {
            return 0.0;
        }
        let n = logits.len() as f64;
        logits.iter().zip(expected.iter())
            .map(|(&x, &y)| x.max(0.0) - x * y + (-x.abs()).exp().ln_1p())
            .sum::<f64>() / n
    }

    /// Per-logit gradient of the mean loss: (σ(x) - y) / n
    pub fn derivative(logits: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = logits.len() as f64;
        logits.iter().zip(expected.iter())
            .map(|(&x, &y)| (1.0 / (1.0 + (-x).exp()) - y) / n)
            .collect()
    }
}
