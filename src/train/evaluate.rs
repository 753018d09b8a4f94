use std::path::{Path, PathBuf};

use crate::error::{Result, TrainError};
use crate::math::Tensor;
use crate::network::CycleGanModels;
use crate::train::train_config::SampleOutputs;
use crate::viz::{SamplePanel, Visualizer};

pub fn gen_and_disc_image_path(image_log_path: &Path, total_epochs: u64) -> PathBuf {
    image_log_path.join(format!("gen_and_disc_output_epoch_{total_epochs}.jpg"))
}

pub fn gen_image_path(image_log_path: &Path, total_epochs: u64) -> PathBuf {
    image_log_path.join(format!("gen_output_epoch_{total_epochs}.jpg"))
}

/// Runs inference on a held-out `[clear, fog]` pair and renders, shows
/// and saves the panels selected in `outputs`. Weights are not touched.
///
/// `None` is a no-op. Any other length than two fails before inference.
pub fn evaluate(
    models: &CycleGanModels,
    sample: Option<&[Tensor]>,
    outputs: &SampleOutputs,
    image_log_path: &Path,
    total_epochs: u64,
    visualizer: &mut dyn Visualizer,
) -> Result<()> {
    let sample = match sample {
        Some(sample) => sample,
        None => return Ok(()),
    };
    let (sample_clear, sample_fog) = match sample {
        [clear, fog] => (clear, fog),
        _ => {
            return Err(TrainError::InvalidArgument(format!(
                "sample_test must hold exactly 2 tensors [clear, fog], got {}",
                sample.len()
            )))
        }
    };

    let prediction_clear2fog = models.generator_clear2fog.predict(sample_clear)?;
    let prediction_fog2clear = models.generator_fog2clear.predict(sample_fog)?;
    let disc_clear_real = models.discriminator_clear.predict(sample_clear)?;
    let disc_fog_real = models.discriminator_fog.predict(sample_fog)?;
    let disc_clear_fake = models.discriminator_clear.predict(&prediction_fog2clear)?;
    let disc_fog_fake = models.discriminator_fog.predict(&prediction_clear2fog)?;

    let panel = SamplePanel {
        sample_clear,
        prediction_clear2fog: &prediction_clear2fog,
        sample_fog,
        prediction_fog2clear: &prediction_fog2clear,
        disc_clear_real: &disc_clear_real,
        disc_fog_real: &disc_fog_real,
        disc_clear_fake: &disc_clear_fake,
        disc_fog_fake: &disc_fog_fake,
    };

    if outputs.plot_sample_gen_and_disc || outputs.save_sample_gen_and_disc_output {
        let image = visualizer.render_gen_and_disc(&panel)?;
        if outputs.save_sample_gen_and_disc_output {
            visualizer.save(&image, &gen_and_disc_image_path(image_log_path, total_epochs))?;
        }
        if outputs.plot_sample_gen_and_disc {
            visualizer.show("Generators and discriminators", &image)?;
        }
    }

    if outputs.plot_sample_generator {
        let image = visualizer.render_generators(&panel)?;
        visualizer.show("Generators", &image)?;
    }
    if outputs.save_sample_generator_output {
        let image = visualizer.render_generators(&panel)?;
        visualizer.save(&image, &gen_image_path(image_log_path, total_epochs))?;
    }

    Ok(())
}
