pub mod error;
pub mod math;
pub mod autograd;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod persist;
pub mod viz;
pub mod train;

// Convenience re-exports
pub use error::{Result, TrainError};
pub use math::tensor::Tensor;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{CycleGanModels, DenseNetwork, Network, NetworkSpec};
pub use optim::{Adam, Optimizer, OptimizerConfig, Sgd};
pub use persist::TrainerState;
pub use viz::{GridVisualizer, Visualizer};
pub use train::{EpochStats, Phase, SampleOutputs, TrainEvent, TrainOptions, Trainer, TrainerConfig};
