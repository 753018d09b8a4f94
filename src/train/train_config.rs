use std::sync::mpsc;

use crate::error::{Result, TrainError};
use crate::math::Tensor;
use crate::optim::OptimizerConfig;
use crate::train::epoch_stats::EpochStats;

/// Hyperparameters fixed for the lifetime of a `Trainer`.
///
/// - `lambda`           : cycle-consistency weight; identity loss uses `lambda / 2`
/// - `optimizer`        : built once per network
/// - `normalized_input` : images are in [-1, 1] rather than [0, 1]; only
///                        affects rendering of sample panels
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub lambda: f64,
    pub optimizer: OptimizerConfig,
    pub normalized_input: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            lambda: 10.0,
            optimizer: OptimizerConfig::default(),
            normalized_input: true,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(TrainError::InvalidArgument(format!(
                "lambda must be positive, got {}",
                self.lambda
            )));
        }
        Ok(())
    }
}

/// Which sample panels the epoch callback renders, shows and saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOutputs {
    pub plot_sample_generator: bool,
    pub plot_sample_gen_and_disc: bool,
    pub save_sample_generator_output: bool,
    pub save_sample_gen_and_disc_output: bool,
}

impl Default for SampleOutputs {
    fn default() -> Self {
        SampleOutputs {
            plot_sample_generator: false,
            plot_sample_gen_and_disc: true,
            save_sample_generator_output: true,
            save_sample_gen_and_disc_output: true,
        }
    }
}

impl SampleOutputs {
    /// Nothing plotted, nothing saved.
    pub fn none() -> Self {
        SampleOutputs {
            plot_sample_generator: false,
            plot_sample_gen_and_disc: false,
            save_sample_generator_output: false,
            save_sample_gen_and_disc_output: false,
        }
    }

    pub fn saves_images(&self) -> bool {
        self.save_sample_generator_output || self.save_sample_gen_and_disc_output
    }
}

/// Progress notifications sent over `TrainOptions::progress_tx`.
#[derive(Debug, Clone)]
pub enum TrainEvent {
    /// Sent every `progress_print_rate` batches. `of` is the previous
    /// epoch's batch count, unknown during the first epoch of a call.
    Batch { epoch: usize, index: usize, of: Option<usize> },
    Epoch(EpochStats),
}

/// Options for one `Trainer::train` call.
///
/// # Fields
/// - `epochs`                 : epochs to run in this call (default 40)
/// - `epoch_save_rate`        : save weights every N epochs of this call,
///                              when a weights path is configured (default `Some(1)`)
/// - `progress_print_rate`    : batches between progress signals (default 10)
/// - `clear_output_callback`  : run after each epoch's batches, e.g. to clear a display
/// - `use_tensorboard`        : write per-epoch scalar metrics (default false)
/// - `sample_test`            : held-out `[clear, fog]` pair for the epoch callback
/// - `sample_outputs`         : panel toggles for the epoch callback
/// - `load_config_first`      : merge the persisted config before training (default true)
/// - `save_config_each_epoch` : persist the config after every epoch (default true)
/// - `progress_tx`            : optional channel; a dropped receiver never stops training
pub struct TrainOptions {
    pub epochs: usize,
    pub epoch_save_rate: Option<usize>,
    pub progress_print_rate: usize,
    pub clear_output_callback: Option<Box<dyn FnMut()>>,
    pub use_tensorboard: bool,
    pub sample_test: Option<Vec<Tensor>>,
    pub sample_outputs: SampleOutputs,
    pub load_config_first: bool,
    pub save_config_each_epoch: bool,
    pub progress_tx: Option<mpsc::Sender<TrainEvent>>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            epochs: 40,
            epoch_save_rate: Some(1),
            progress_print_rate: 10,
            clear_output_callback: None,
            use_tensorboard: false,
            sample_test: None,
            sample_outputs: SampleOutputs::default(),
            load_config_first: true,
            save_config_each_epoch: true,
            progress_tx: None,
        }
    }
}

impl TrainOptions {
    /// Default options for `epochs` epochs.
    pub fn new(epochs: usize) -> Self {
        TrainOptions { epochs, ..TrainOptions::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_print_rate == 0 {
            return Err(TrainError::InvalidArgument("progress_print_rate must be at least 1".into()));
        }
        if self.epoch_save_rate == Some(0) {
            return Err(TrainError::InvalidArgument("epoch_save_rate must be at least 1".into()));
        }
        Ok(())
    }
}
