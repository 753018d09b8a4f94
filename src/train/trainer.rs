use std::borrow::Borrow;
use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::error::{Result, TrainError};
use crate::math::Tensor;
use crate::network::CycleGanModels;
use crate::persist::{self, create_dir, RestoreReport, TrainerState};
use crate::train::epoch_stats::EpochStats;
use crate::train::evaluate::evaluate;
use crate::train::loop_fn::{run_one_epoch, EpochContext};
use crate::train::step::{self, Optimizers, StepLosses};
use crate::train::summary::MetricWriters;
use crate::train::train_config::{SampleOutputs, TrainEvent, TrainOptions, TrainerConfig};
use crate::viz::{GridVisualizer, Visualizer};

/// What the trainer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Evaluating,
    Training,
    Checkpointing,
}

/// Orchestrates CycleGAN training of four networks between the clear and
/// fog domains.
pub struct Trainer {
    models: CycleGanModels,
    optimizers: Optimizers,
    config: TrainerConfig,
    state: TrainerState,
    visualizer: Box<dyn Visualizer>,
    phase: Phase,
    /// Set once the persisted config has been merged, so later `train`
    /// calls never roll the in-memory state back to an older file.
    config_loaded: bool,
}

impl Trainer {
    pub fn new(models: CycleGanModels, config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer {
            models,
            optimizers: Optimizers::from_config(&config.optimizer),
            visualizer: Box::new(GridVisualizer::new(config.normalized_input)),
            state: TrainerState::default(),
            config,
            phase: Phase::Idle,
            config_loaded: false,
        })
    }

    pub fn with_visualizer(mut self, visualizer: Box<dyn Visualizer>) -> Self {
        self.visualizer = visualizer;
        self
    }

    pub fn with_state(mut self, state: TrainerState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &TrainerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TrainerState {
        &mut self.state
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn models(&self) -> &CycleGanModels {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut CycleGanModels {
        &mut self.models
    }

    pub fn into_models(self) -> CycleGanModels {
        self.models
    }

    pub fn save_config(&self) -> Result<()> {
        persist::save_config(&self.state)
    }

    /// See [`persist::load_config`]. After this, `train` no longer merges
    /// the config on its own.
    pub fn load_config(&mut self, load_tensorboard_current_logdir: bool) -> Result<bool> {
        let loaded = persist::load_config(&mut self.state, load_tensorboard_current_logdir)?;
        self.config_loaded = true;
        Ok(loaded)
    }

    /// Sets the checkpoint directory and restores whatever weights it holds.
    pub fn configure_checkpoint(&mut self, weights_path: impl Into<PathBuf>) -> Result<RestoreReport> {
        let weights_path = weights_path.into();
        let report = persist::restore_weights(&mut self.models, &weights_path)?;
        self.state.weights_path = Some(weights_path);
        Ok(report)
    }

    /// Writes all four weight files. A trainer without a weights path has
    /// nothing to write to and does nothing.
    pub fn save_weights(&self) -> Result<()> {
        match &self.state.weights_path {
            Some(path) => persist::save_weights(&self.models, path),
            None => Ok(()),
        }
    }

    pub fn train_step(&mut self, real_clear: &Tensor, real_fog: &Tensor) -> Result<StepLosses> {
        step::train_step(&mut self.models, &mut self.optimizers, self.config.lambda, real_clear, real_fog)
    }

    /// Sample evaluation callback; images are numbered by `total_epochs`.
    pub fn evaluate(&mut self, sample: Option<&[Tensor]>, outputs: &SampleOutputs) -> Result<()> {
        evaluate(
            &self.models,
            sample,
            outputs,
            &self.state.image_log_path,
            self.state.total_epochs,
            self.visualizer.as_mut(),
        )
    }

    /// Trains for `options.epochs` epochs. Both streams are re-iterated
    /// every epoch and zipped, so the shorter one sets the epoch length.
    ///
    /// Returns the stats of each completed epoch. The phase is back to
    /// [`Phase::Idle`] when this returns, error or not.
    pub fn train<C, F>(&mut self, train_clear: C, train_fog: F, options: &mut TrainOptions) -> Result<Vec<EpochStats>>
    where
        C: IntoIterator + Clone,
        C::Item: Borrow<Tensor>,
        F: IntoIterator + Clone,
        F::Item: Borrow<Tensor>,
    {
        let result = self.train_epochs(train_clear, train_fog, options);
        self.phase = Phase::Idle;
        result
    }

    fn metric_writers(&mut self) -> Result<MetricWriters> {
        let current = match &self.state.tensorboard_current_logdir {
            Some(current) => current.clone(),
            None => {
                let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
                let current = self.state.tensorboard_base_logdir.join(stamp);
                self.state.tensorboard_current_logdir = Some(current.clone());
                current
            }
        };
        info!("Metric logs in {}", current.display());
        MetricWriters::open(&current)
    }

    fn train_epochs<C, F>(&mut self, train_clear: C, train_fog: F, options: &mut TrainOptions) -> Result<Vec<EpochStats>>
    where
        C: IntoIterator + Clone,
        C::Item: Borrow<Tensor>,
        F: IntoIterator + Clone,
        F::Item: Borrow<Tensor>,
    {
        options.validate()?;
        if let Some(sample) = &options.sample_test {
            if sample.len() != 2 {
                return Err(TrainError::InvalidArgument(format!(
                    "sample_test must hold exactly 2 tensors [clear, fog], got {}",
                    sample.len()
                )));
            }
        }

        if options.load_config_first && !self.config_loaded && self.state.config_path.is_some() {
            self.load_config(true)?;
        }
        if options.sample_outputs.saves_images() {
            create_dir(&self.state.image_log_path)?;
        }
        let mut writers = if options.use_tensorboard { Some(self.metric_writers()?) } else { None };

        let mut history = Vec::with_capacity(options.epochs);
        let mut previous_len = None;

        for epoch in 1..=options.epochs {
            let total_epoch = self.state.total_epochs + 1;
            info!("Starting with epoch {} (total {})", epoch, total_epoch);

            self.phase = Phase::Evaluating;
            self.evaluate(options.sample_test.as_deref(), &options.sample_outputs)?;

            self.phase = Phase::Training;
            let start = Instant::now();
            let ctx = EpochContext {
                epoch,
                lambda: self.config.lambda,
                progress_print_rate: options.progress_print_rate,
                previous_len,
                progress_tx: options.progress_tx.as_ref(),
            };
            let metrics = run_one_epoch(
                &mut self.models,
                &mut self.optimizers,
                train_clear.clone(),
                train_fog.clone(),
                &ctx,
            )?;
            let effective = start.elapsed();
            previous_len = Some(metrics.batches);

            if let Some(callback) = options.clear_output_callback.as_mut() {
                callback();
            }

            self.phase = Phase::Checkpointing;
            if let (Some(path), Some(rate)) = (&self.state.weights_path, options.epoch_save_rate) {
                if epoch % rate == 0 {
                    persist::save_weights(&self.models, path)?;
                    info!("Saving checkpoint for epoch {} (total {}) at {}", epoch, total_epoch, path.display());
                }
            }

            let stats = metrics.finish(epoch, total_epoch, start.elapsed(), effective);
            info!(
                "Time taken for epoch {} (total {}) is {:.3} sec (effective: {:.3} sec)",
                epoch,
                total_epoch,
                stats.elapsed_ms as f64 / 1000.0,
                stats.effective_ms as f64 / 1000.0
            );
            info!(
                "clear2fog loss: {}, fog2clear loss: {}, disc_clear loss: {}, disc_fog loss: {}",
                stats.clear2fog_loss, stats.fog2clear_loss, stats.disc_clear_loss, stats.disc_fog_loss
            );

            if let Some(writers) = writers.as_mut() {
                writers.record(&stats, total_epoch);
            }

            self.state.total_epochs += 1;
            if let Some(tx) = &options.progress_tx {
                let _ = tx.send(TrainEvent::Epoch(stats.clone()));
            }
            if options.save_config_each_epoch && self.state.config_path.is_some() {
                self.save_config()?;
            }
            history.push(stats);
        }

        Ok(history)
    }
}
