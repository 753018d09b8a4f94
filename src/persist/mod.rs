pub mod config;
pub mod weights;

pub use config::{create_dir, load_config, save_config, TrainerState};
pub use weights::{model_paths, restore_weights, save_weights, RestoreReport};
