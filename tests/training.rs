use std::path::Path;

use tempfile::TempDir;

use fog_cyclegan::persist::{load_config, model_paths};
use fog_cyclegan::train::suffixed;
use fog_cyclegan::{
    CycleGanModels, Network, SampleOutputs, Tensor, TrainError, TrainOptions, Trainer, TrainerConfig, TrainerState,
};

const FEATURES: usize = 2 * 2 * 3;

fn images(n: usize, value: f64) -> Vec<Tensor> {
    (0..n).map(|i| Tensor::full(&[1, 2, 2, 3], value - 0.05 * i as f64)).collect()
}

fn state_in(dir: &Path) -> TrainerState {
    TrainerState {
        tensorboard_base_logdir: dir.join("tensorboard_logs"),
        image_log_path: dir.join("image_logs"),
        config_path: Some(dir.join("trainer_config.json")),
        ..TrainerState::default()
    }
}

fn trainer_in(dir: &Path, seed: u64) -> Trainer {
    Trainer::new(CycleGanModels::dense(FEATURES, 8, seed), TrainerConfig::default())
        .unwrap()
        .with_state(state_in(dir))
}

fn quiet(epochs: usize) -> TrainOptions {
    TrainOptions { sample_outputs: SampleOutputs::none(), ..TrainOptions::new(epochs) }
}

#[test]
fn streams_of_different_length_stop_at_the_shorter() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    let history = trainer.train(images(5, 0.5), images(3, -0.5), &mut quiet(1)).unwrap();
    assert_eq!(history[0].batches, 3);
}

#[test]
fn total_epochs_survive_fresh_trainers() {
    let dir = TempDir::new().unwrap();
    for run in 1..=3 {
        let mut trainer = trainer_in(dir.path(), 1);
        let history = trainer.train(images(2, 0.5), images(2, -0.5), &mut quiet(1)).unwrap();
        assert_eq!(history[0].total_epoch, run);
        assert_eq!(trainer.state().total_epochs, run);
    }

    let mut reloaded = state_in(dir.path());
    assert!(load_config(&mut reloaded, true).unwrap());
    assert_eq!(reloaded.total_epochs, 3);
}

#[test]
fn malformed_sample_fails_before_any_epoch() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    let mut options = TrainOptions { sample_test: Some(images(3, 0.1)), ..quiet(2) };
    let err = trainer.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap_err();
    assert!(matches!(err, TrainError::InvalidArgument(_)));
    assert_eq!(trainer.state().total_epochs, 0);
    assert!(!dir.path().join("trainer_config.json").exists());
}

#[test]
fn evaluate_without_sample_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    trainer.evaluate(None, &SampleOutputs::default()).unwrap();
    assert!(!dir.path().join("image_logs").exists());
}

#[test]
fn sample_images_are_numbered_by_total_epoch() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    let sample = vec![images(1, 0.3).remove(0), images(1, -0.3).remove(0)];
    let mut options = TrainOptions { sample_test: Some(sample), ..TrainOptions::new(2) };
    trainer.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap();

    let logs = dir.path().join("image_logs");
    for epoch in 0..2 {
        assert!(logs.join(format!("gen_and_disc_output_epoch_{epoch}.jpg")).is_file());
        assert!(logs.join(format!("gen_output_epoch_{epoch}.jpg")).is_file());
    }
    assert!(!logs.join("gen_output_epoch_2.jpg").exists());

    let saved = image::open(logs.join("gen_and_disc_output_epoch_0.jpg")).unwrap();
    assert!(saved.width() > 0 && saved.height() > 0);
}

/// Reads one varint from `buf` at `pos`.
fn varint(buf: &[u8], pos: &mut usize) -> u64 {
    let mut value = 0u64;
    let mut shift = 0;
    loop {
        let byte = buf[*pos];
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return value;
        }
        shift += 7;
    }
}

/// `(step, summary bytes)` of every event carrying a summary, across all
/// TensorBoard event files in `logdir`. Events are TFRecords: a u64 length,
/// a u32 crc, the payload, and a u32 crc.
fn scalar_events(logdir: &Path) -> Vec<(u64, Vec<u8>)> {
    let mut events = Vec::new();
    for entry in std::fs::read_dir(logdir).unwrap() {
        let entry = entry.unwrap();
        if !entry.file_name().to_string_lossy().starts_with("events.out.tfevents") {
            continue;
        }
        let bytes = std::fs::read(entry.path()).unwrap();
        let mut at = 0;
        while at + 12 <= bytes.len() {
            let len = u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap()) as usize;
            let payload = &bytes[at + 12..at + 12 + len];
            at += 16 + len;

            let (mut pos, mut step, mut summary) = (0, 0, None);
            while pos < payload.len() {
                let key = varint(payload, &mut pos);
                match (key >> 3, key & 7) {
                    (2, 0) => step = varint(payload, &mut pos),
                    (field, 2) => {
                        let n = varint(payload, &mut pos) as usize;
                        if field == 5 {
                            summary = Some(payload[pos..pos + n].to_vec());
                        }
                        pos += n;
                    }
                    (_, 0) => {
                        varint(payload, &mut pos);
                    }
                    (_, 1) => pos += 8,
                    (_, 5) => pos += 4,
                    other => panic!("unexpected wire type {other:?}"),
                }
            }
            if let Some(summary) = summary {
                events.push((step, summary));
            }
        }
    }
    events.sort_by_key(|(step, _)| *step);
    events
}

fn tagged(events: &[(u64, Vec<u8>)], tag: &str) -> Vec<u64> {
    events
        .iter()
        .filter(|(_, summary)| summary.windows(tag.len()).any(|w| w == tag.as_bytes()))
        .map(|(step, _)| *step)
        .collect()
}

#[test]
fn metric_streams_get_two_scalars_per_epoch() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    let mut options = TrainOptions { use_tensorboard: true, ..quiet(2) };
    trainer.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap();

    let current = trainer.state().tensorboard_current_logdir.clone().unwrap();
    assert!(current.starts_with(dir.path().join("tensorboard_logs")));
    let clear_dir = suffixed(&current, "-clear");
    let fog_dir = suffixed(&current, "-fog");

    for logdir in [&clear_dir, &fog_dir] {
        let events = scalar_events(logdir);
        assert_eq!(events.len(), 4, "{}", logdir.display());
        assert_eq!(tagged(&events, "generator"), vec![1, 2]);
        assert_eq!(tagged(&events, "discriminator"), vec![1, 2]);
    }

    // A resumed run keeps writing to the same directories.
    let mut resumed = trainer_in(dir.path(), 1);
    resumed.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap();
    assert_eq!(resumed.state().tensorboard_current_logdir.as_ref(), Some(&current));
    for logdir in [&clear_dir, &fog_dir] {
        let steps = tagged(&scalar_events(logdir), "generator");
        assert!(steps.contains(&3) && steps.contains(&4), "{steps:?}");
    }
}

#[test]
fn checkpoints_follow_save_rate_and_restore() {
    let dir = TempDir::new().unwrap();
    let weights = dir.path().join("weights");
    let mut trainer = trainer_in(dir.path(), 1);
    assert_eq!(trainer.configure_checkpoint(&weights).unwrap().missing.len(), 4);

    let mut options = TrainOptions { epoch_save_rate: Some(2), ..quiet(1) };
    trainer.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap();
    assert!(model_paths(&weights).iter().all(|(_, path)| !path.exists()));

    let mut options = TrainOptions { epoch_save_rate: Some(2), ..quiet(2) };
    trainer.train(images(2, 0.5), images(2, -0.5), &mut options).unwrap();
    assert!(model_paths(&weights).iter().all(|(_, path)| path.is_file()));

    let trained = trainer.into_models();
    let mut fresh = trainer_in(dir.path(), 99);
    assert!(fresh.configure_checkpoint(&weights).unwrap().all_loaded());
    for ((_, a), (_, b)) in trained.named().into_iter().zip(fresh.models().named()) {
        assert_eq!(a.parameters(), b.parameters());
    }
}

#[test]
fn config_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let mut trainer = trainer_in(dir.path(), 1);
    trainer.configure_checkpoint(dir.path().join("weights")).unwrap();
    trainer.state_mut().total_epochs = 12;
    trainer.save_config().unwrap();

    let mut other = trainer_in(dir.path(), 2);
    assert!(other.load_config(true).unwrap());
    assert_eq!(other.state(), trainer.state());
}
