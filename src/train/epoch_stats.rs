use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::train::step::StepLosses;

/// Running loss sums for the epoch in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpochMetrics {
    pub clear2fog_loss_sum: f64,
    pub fog2clear_loss_sum: f64,
    pub disc_clear_loss_sum: f64,
    pub disc_fog_loss_sum: f64,
    pub batches: usize,
}

impl EpochMetrics {
    pub fn record(&mut self, losses: &StepLosses) {
        self.clear2fog_loss_sum += losses.gen_clear2fog;
        self.fog2clear_loss_sum += losses.gen_fog2clear;
        self.disc_clear_loss_sum += losses.disc_clear;
        self.disc_fog_loss_sum += losses.disc_fog;
        self.batches += 1;
    }

    pub fn finish(&self, epoch: usize, total_epoch: u64, elapsed: Duration, effective: Duration) -> EpochStats {
        EpochStats {
            epoch,
            total_epoch,
            batches: self.batches,
            clear2fog_loss: self.clear2fog_loss_sum,
            fog2clear_loss: self.fog2clear_loss_sum,
            disc_clear_loss: self.disc_clear_loss_sum,
            disc_fog_loss: self.disc_fog_loss_sum,
            elapsed_ms: elapsed.as_millis() as u64,
            effective_ms: effective.as_millis() as u64,
        }
    }
}

/// Summary of one completed epoch, returned by `Trainer::train` and sent
/// over the progress channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number within this `train` call.
    pub epoch: usize,
    /// 1-based epoch number across every run sharing the trainer config.
    pub total_epoch: u64,
    /// Training steps taken (the shorter of the two streams).
    pub batches: usize,
    /// Loss sums over the epoch's batches.
    pub clear2fog_loss: f64,
    pub fog2clear_loss: f64,
    pub disc_clear_loss: f64,
    pub disc_fog_loss: f64,
    /// Wall-clock time including checkpointing.
    pub elapsed_ms: u64,
    /// Wall-clock time spent in training steps only.
    pub effective_ms: u64,
}
