//! Trains the dense reference CycleGAN on tiny synthetic images: random
//! "clear" scenes and the same kind of scenes washed towards gray.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fog_cyclegan::{CycleGanModels, Tensor, TrainOptions, Trainer, TrainerConfig, TrainerState};

const SIDE: usize = 4;
const FEATURES: usize = SIDE * SIDE * 3;

fn scene(rng: &mut StdRng, fog: f64) -> anyhow::Result<Tensor> {
    let data = (0..FEATURES)
        .map(|_| {
            let clear: f64 = rng.gen_range(-1.0..1.0);
            clear * (1.0 - fog) + 0.6 * fog
        })
        .collect();
    Ok(Tensor::from_vec(&[1, SIDE, SIDE, 3], data)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let mut rng = StdRng::seed_from_u64(7);
    let clear = (0..24).map(|_| scene(&mut rng, 0.0)).collect::<anyhow::Result<Vec<_>>>()?;
    let fog = (0..20).map(|_| scene(&mut rng, 0.7)).collect::<anyhow::Result<Vec<_>>>()?;
    let sample = vec![scene(&mut rng, 0.0)?, scene(&mut rng, 0.7)?];

    let root = std::path::PathBuf::from("synthetic_fog_run");
    let state = TrainerState {
        tensorboard_base_logdir: root.join("tensorboard_logs"),
        image_log_path: root.join("image_logs"),
        config_path: Some(root.join("trainer_config.json")),
        ..TrainerState::default()
    };

    let models = CycleGanModels::dense(FEATURES, 32, 42);
    let mut trainer = Trainer::new(models, TrainerConfig::default())?.with_state(state);
    // Picks up a previous run's weights and config, if any.
    trainer.load_config(true).context("loading trainer config")?;
    let restored = trainer.configure_checkpoint(root.join("weights")).context("restoring weights")?;
    tracing::info!("{} of 4 networks restored", restored.loaded.len());

    let mut options = TrainOptions {
        epochs: 5,
        progress_print_rate: 5,
        use_tensorboard: true,
        sample_test: Some(sample),
        load_config_first: false,
        ..TrainOptions::default()
    };
    let history = trainer.train(&clear, &fog, &mut options)?;

    for stats in &history {
        println!(
            "epoch {} (total {}): clear2fog {:.4}, fog2clear {:.4}, disc_clear {:.4}, disc_fog {:.4}",
            stats.epoch,
            stats.total_epoch,
            stats.clear2fog_loss,
            stats.fog2clear_loss,
            stats.disc_clear_loss,
            stats.disc_fog_loss
        );
    }
    Ok(())
}
