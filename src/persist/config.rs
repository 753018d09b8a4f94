use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{Result, TrainError};

/// Trainer bookkeeping that survives process restarts.
///
/// Everything except `config_path` is written to the config file.
/// `total_epochs` only ever grows: it counts fully completed epochs across
/// every run that shared this config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerState {
    pub weights_path: Option<PathBuf>,
    pub tensorboard_base_logdir: PathBuf,
    pub tensorboard_current_logdir: Option<PathBuf>,
    pub total_epochs: u64,
    pub image_log_path: PathBuf,
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for TrainerState {
    fn default() -> Self {
        TrainerState {
            weights_path: None,
            tensorboard_base_logdir: PathBuf::from("tensorboard_logs"),
            tensorboard_current_logdir: None,
            total_epochs: 0,
            image_log_path: PathBuf::from("image_logs"),
            config_path: Some(PathBuf::from("trainer_config.json")),
        }
    }
}

/// `mkdir -p`; an empty path (the parent of a bare file name) is a no-op.
pub fn create_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

fn config_path(state: &TrainerState) -> Result<&Path> {
    state
        .config_path
        .as_deref()
        .ok_or_else(|| TrainError::InvalidArgument("trainer has no config path".into()))
}

/// Writes the persisted fields as indented JSON, overwriting any previous file.
pub fn save_config(state: &TrainerState) -> Result<()> {
    let path = config_path(state)?;
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, state)?;
    info!("Trainer config saved in {}", path.display());
    Ok(())
}

/// Merges the config file into `state`: only keys present in the file
/// overwrite fields, and an explicit `null` clears an optional field.
///
/// Returns `false` without touching `state` when the file does not exist.
pub fn load_config(state: &mut TrainerState, load_tensorboard_current_logdir: bool) -> Result<bool> {
    let path = config_path(state)?.to_path_buf();
    if !path.exists() {
        info!("Config path doesn't exist. Ignoring load config.");
        return Ok(false);
    }

    let stored: Map<String, Value> = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
    let take = |key: &str| stored.get(key).cloned();

    if let Some(v) = take("weights_path") {
        state.weights_path = serde_json::from_value(v)?;
    }
    if let Some(v) = take("tensorboard_base_logdir") {
        state.tensorboard_base_logdir = serde_json::from_value(v)?;
    }
    if load_tensorboard_current_logdir {
        if let Some(v) = take("tensorboard_current_logdir") {
            state.tensorboard_current_logdir = serde_json::from_value(v)?;
        }
    }
    if let Some(v) = take("total_epochs") {
        state.total_epochs = serde_json::from_value(v)?;
    }
    if let Some(v) = take("image_log_path") {
        state.image_log_path = serde_json::from_value(v)?;
    }

    info!("Trainer config loaded from {}", path.display());
    Ok(true)
}
