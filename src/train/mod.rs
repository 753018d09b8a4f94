pub mod epoch_stats;
pub mod evaluate;
pub mod loop_fn;
pub mod step;
pub mod summary;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::{EpochMetrics, EpochStats};
pub use evaluate::evaluate;
pub use loop_fn::run_one_epoch;
pub use step::{train_step, Optimizers, StepLosses};
pub use summary::{suffixed, MetricWriters};
pub use train_config::{SampleOutputs, TrainEvent, TrainOptions, TrainerConfig};
pub use trainer::{Phase, Trainer};
