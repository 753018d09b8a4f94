use std::borrow::Borrow;
use std::sync::mpsc;

use tracing::info;

use crate::error::Result;
use crate::math::Tensor;
use crate::network::CycleGanModels;
use crate::train::epoch_stats::EpochMetrics;
use crate::train::step::{train_step, Optimizers};
use crate::train::train_config::TrainEvent;

/// Per-epoch settings for [`run_one_epoch`].
pub struct EpochContext<'a> {
    /// 1-based epoch number within the current `train` call.
    pub epoch: usize,
    pub lambda: f64,
    pub progress_print_rate: usize,
    /// Batch count of the previous epoch, if one ran in this call.
    pub previous_len: Option<usize>,
    pub progress_tx: Option<&'a mpsc::Sender<TrainEvent>>,
}

/// One pass over the zipped streams, stopping at the shorter one.
///
/// A failing step aborts the epoch.
pub fn run_one_epoch<C, F>(
    models: &mut CycleGanModels,
    optimizers: &mut Optimizers,
    train_clear: C,
    train_fog: F,
    ctx: &EpochContext,
) -> Result<EpochMetrics>
where
    C: IntoIterator,
    C::Item: Borrow<Tensor>,
    F: IntoIterator,
    F::Item: Borrow<Tensor>,
{
    let mut metrics = EpochMetrics::default();

    for (index, (clear, fog)) in train_clear.into_iter().zip(train_fog).enumerate() {
        let losses = train_step(models, optimizers, ctx.lambda, clear.borrow(), fog.borrow())?;
        metrics.record(&losses);

        if index % ctx.progress_print_rate == 0 {
            match ctx.previous_len {
                Some(len) => info!("{}/{}", index, len),
                None => info!("{}/Unknown", index),
            }
            if let Some(tx) = ctx.progress_tx {
                // A dropped receiver only means nobody is listening.
                let _ = tx.send(TrainEvent::Batch { epoch: ctx.epoch, index, of: ctx.previous_len });
            }
        }
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::OptimizerConfig;

    fn batches(n: usize, value: f64) -> Vec<Tensor> {
        (0..n).map(|i| Tensor::full(&[1, 6], value + 0.01 * i as f64)).collect()
    }

    fn ctx(rate: usize, previous_len: Option<usize>, tx: Option<&mpsc::Sender<TrainEvent>>) -> EpochContext<'_> {
        EpochContext { epoch: 1, lambda: 10.0, progress_print_rate: rate, previous_len, progress_tx: tx }
    }

    #[test]
    fn shorter_stream_bounds_the_epoch() {
        let mut models = CycleGanModels::dense(6, 4, 3);
        let mut optimizers = Optimizers::from_config(&OptimizerConfig::default());
        let metrics =
            run_one_epoch(&mut models, &mut optimizers, batches(5, 0.1), batches(3, -0.1), &ctx(10, None, None))
                .unwrap();
        assert_eq!(metrics.batches, 3);
        assert!(metrics.clear2fog_loss_sum > 0.0 && metrics.disc_fog_loss_sum > 0.0);
    }

    #[test]
    fn progress_events_follow_print_rate() {
        let mut models = CycleGanModels::dense(6, 4, 3);
        let mut optimizers = Optimizers::from_config(&OptimizerConfig::default());
        let (tx, rx) = mpsc::channel();
        let clear = batches(5, 0.1);
        let fog = batches(5, -0.1);

        run_one_epoch(&mut models, &mut optimizers, &clear, &fog, &ctx(2, Some(5), Some(&tx))).unwrap();
        drop(tx);

        let indices: Vec<(usize, Option<usize>)> = rx
            .iter()
            .map(|event| match event {
                TrainEvent::Batch { index, of, .. } => (index, of),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![(0, Some(5)), (2, Some(5)), (4, Some(5))]);
    }

    #[test]
    fn dropped_receiver_does_not_stop_the_epoch() {
        let mut models = CycleGanModels::dense(6, 4, 3);
        let mut optimizers = Optimizers::from_config(&OptimizerConfig::default());
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let metrics =
            run_one_epoch(&mut models, &mut optimizers, batches(4, 0.1), batches(4, -0.1), &ctx(1, None, Some(&tx)))
                .unwrap();
        assert_eq!(metrics.batches, 4);
    }
}
