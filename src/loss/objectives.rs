//! The three CycleGAN objectives, recorded on a [`Tape`] so they can be
//! differentiated. Discriminator outputs are raw logits throughout.

use crate::autograd::{Tape, Var};
use crate::error::Result;

/// `0.5 · (BCE(ones, real) + BCE(zeros, generated))`
pub fn discriminator_loss(tape: &mut Tape, real: Var, generated: Var) -> Result<Var> {
    let real_loss = tape.bce_with_logits(real, 1.0);
    let generated_loss = tape.bce_with_logits(generated, 0.0);
    let total = tape.add(real_loss, generated_loss)?;
    Ok(tape.scale(total, 0.5))
}

/// `BCE(ones, generated)`: the generator wants its output scored as real.
pub fn generator_loss(tape: &mut Tape, generated: Var) -> Var {
    tape.bce_with_logits(generated, 1.0)
}

/// `lambda · mean|real - cycled|`
pub fn cycle_loss(tape: &mut Tape, real: Var, cycled: Var, lambda: f64) -> Result<Var> {
    let l1 = tape.mean_abs_diff(real, cycled)?;
    Ok(tape.scale(l1, lambda))
}

/// `0.5 · lambda · mean|real - same|`
pub fn identity_loss(tape: &mut Tape, real: Var, same: Var, lambda: f64) -> Result<Var> {
    let l1 = tape.mean_abs_diff(real, same)?;
    Ok(tape.scale(l1, lambda * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loss::bce::BceWithLogitsLoss;
    use crate::math::Tensor;

    fn leaf(tape: &mut Tape, shape: &[usize], data: Vec<f64>) -> Var {
        tape.leaf(Tensor::from_vec(shape, data).unwrap())
    }

    #[test]
    fn discriminator_loss_is_half_the_bce_sum() {
        let real_scores = vec![2.0, -0.3, 0.8, 1.1];
        let fake_scores = vec![-1.5, 0.4, -0.2, 0.9];
        let mut tape = Tape::new();
        let real = leaf(&mut tape, &[4, 1], real_scores.clone());
        let fake = leaf(&mut tape, &[4, 1], fake_scores.clone());
        let loss = discriminator_loss(&mut tape, real, fake).unwrap();

        let expected = 0.5
            * (BceWithLogitsLoss::loss(&real_scores, &[1.0; 4])
                + BceWithLogitsLoss::loss(&fake_scores, &[0.0; 4]));
        assert!((tape.value(loss).item() - expected).abs() < 1e-12);
    }

    #[test]
    fn generator_loss_falls_as_discriminator_is_fooled() {
        let mut tape = Tape::new();
        let unconvinced = leaf(&mut tape, &[2, 1], vec![-3.0, -3.0]);
        let fooled = leaf(&mut tape, &[2, 1], vec![3.0, 3.0]);
        let high = generator_loss(&mut tape, unconvinced);
        let low = generator_loss(&mut tape, fooled);
        assert!(tape.value(low).item() < tape.value(high).item());
    }

    #[test]
    fn identical_images_cost_nothing() {
        let pixels = vec![0.1, -0.9, 0.5, 0.33, 0.0, 1.0];
        for lambda in [0.5, 10.0, 123.0] {
            let mut tape = Tape::new();
            let x = leaf(&mut tape, &[1, 1, 2, 3], pixels.clone());
            let y = leaf(&mut tape, &[1, 1, 2, 3], pixels.clone());
            let cycle = cycle_loss(&mut tape, x, y, lambda).unwrap();
            let identity = identity_loss(&mut tape, x, y, lambda).unwrap();
            assert_eq!(tape.value(cycle).item(), 0.0);
            assert_eq!(tape.value(identity).item(), 0.0);
        }
    }

    #[test]
    fn identity_weight_is_half_of_cycle_weight() {
        let mut tape = Tape::new();
        let x = leaf(&mut tape, &[1, 4], vec![1.0, 1.0, 1.0, 1.0]);
        let y = leaf(&mut tape, &[1, 4], vec![0.0, 0.5, 1.0, 2.0]);
        let cycle = cycle_loss(&mut tape, x, y, 10.0).unwrap();
        let identity = identity_loss(&mut tape, x, y, 10.0).unwrap();
        // mean|x - y| = 2.5 / 4
        assert!((tape.value(cycle).item() - 6.25).abs() < 1e-12);
        assert!((tape.value(identity).item() - 3.125).abs() < 1e-12);
    }

    #[test]
    fn mismatched_images_are_rejected() {
        let mut tape = Tape::new();
        let x = tape.leaf(Tensor::zeros(&[1, 4]));
        let y = tape.leaf(Tensor::zeros(&[1, 5]));
        assert!(cycle_loss(&mut tape, x, y, 10.0).is_err());
    }
}
