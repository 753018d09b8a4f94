use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::network::CycleGanModels;
use crate::persist::config::create_dir;

pub const WEIGHTS_EXTENSION: &str = "json";

/// `(network name, weight file)` for each of the four networks.
pub fn model_paths(weights_path: &Path) -> [(&'static str, PathBuf); 4] {
    let file = |name: &'static str| (name, weights_path.join(format!("{name}.{WEIGHTS_EXTENSION}")));
    [
        file(CycleGanModels::GENERATOR_CLEAR2FOG),
        file(CycleGanModels::GENERATOR_FOG2CLEAR),
        file(CycleGanModels::DISCRIMINATOR_CLEAR),
        file(CycleGanModels::DISCRIMINATOR_FOG),
    ]
}

/// Outcome of [`restore_weights`]: which networks loaded, and the weight
/// files that were missing (each one logged as `Not found:`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub loaded: Vec<&'static str>,
    pub missing: Vec<PathBuf>,
}

impl RestoreReport {
    pub fn all_loaded(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Creates `weights_path` and loads whichever weight files exist there.
/// A missing file leaves that network untouched.
pub fn restore_weights(models: &mut CycleGanModels, weights_path: &Path) -> Result<RestoreReport> {
    create_dir(weights_path)?;
    let mut report = RestoreReport::default();
    for ((name, network), (_, path)) in models.named_mut().into_iter().zip(model_paths(weights_path)) {
        if path.is_file() {
            network.load_weights(&path)?;
            info!("Weights loaded: {}", path.display());
            report.loaded.push(name);
        } else {
            info!("Not found: {}", path.display());
            report.missing.push(path);
        }
    }
    Ok(report)
}

pub fn save_weights(models: &CycleGanModels, weights_path: &Path) -> Result<()> {
    create_dir(weights_path)?;
    for ((_, network), (_, path)) in models.named().into_iter().zip(model_paths(weights_path)) {
        network.save_weights(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use tempfile::TempDir;

    #[test]
    fn paths_use_fixed_network_names() {
        let paths = model_paths(Path::new("ckpt"));
        assert_eq!(paths[0].1, PathBuf::from("ckpt/generator_clear2fog.json"));
        assert_eq!(paths[3].0, "discriminator_fog");
    }

    #[test]
    fn restore_is_per_network() {
        let dir = TempDir::new().unwrap();
        let trained = CycleGanModels::dense(12, 4, 100);
        save_weights(&trained, dir.path()).unwrap();
        let [(_, g_c2f), _, _, (_, d_fog)] = model_paths(dir.path());
        std::fs::remove_file(&g_c2f).unwrap();
        std::fs::remove_file(&d_fog).unwrap();

        let mut fresh = CycleGanModels::dense(12, 4, 200);
        let untouched = CycleGanModels::dense(12, 4, 200);
        let report = restore_weights(&mut fresh, dir.path()).unwrap();
        assert_eq!(report.loaded, vec!["generator_fog2clear", "discriminator_clear"]);
        assert_eq!(report.missing, vec![g_c2f, d_fog]);
        assert!(!report.all_loaded());

        assert_eq!(fresh.generator_fog2clear.parameters(), trained.generator_fog2clear.parameters());
        assert_eq!(fresh.discriminator_clear.parameters(), trained.discriminator_clear.parameters());
        assert_eq!(fresh.generator_clear2fog.parameters(), untouched.generator_clear2fog.parameters());
        assert_eq!(fresh.discriminator_fog.parameters(), untouched.discriminator_fog.parameters());
    }

    #[test]
    fn restore_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b");
        let mut models = CycleGanModels::dense(12, 4, 1);
        let report = restore_weights(&mut models, &target).unwrap();
        assert!(report.loaded.is_empty());
        assert_eq!(report.missing.len(), 4);
        assert!(target.is_dir());
    }
}
