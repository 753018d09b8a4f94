use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tensorboard_rs::summary_writer::SummaryWriter;

use crate::error::Result;
use crate::persist::create_dir;
use crate::train::epoch_stats::EpochStats;

/// `{logdir}{suffix}`, e.g. `logs/20240101-120000-clear`.
pub fn suffixed(logdir: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(logdir.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// The per-domain TensorBoard streams of one run, `{current}-clear` and
/// `{current}-fog`. Each domain gets its generator and discriminator loss.
/// Reopening the same directories adds a new event file next to the old
/// ones, so resumed runs continue the same TensorBoard curves.
pub struct MetricWriters {
    clear: SummaryWriter,
    fog: SummaryWriter,
}

impl MetricWriters {
    pub fn open(current_logdir: &Path) -> Result<Self> {
        let clear = suffixed(current_logdir, "-clear");
        let fog = suffixed(current_logdir, "-fog");
        create_dir(&clear)?;
        create_dir(&fog)?;
        Ok(MetricWriters {
            clear: SummaryWriter::new(&clear),
            fog: SummaryWriter::new(&fog),
        })
    }

    /// Writes the epoch's loss sums at `step` and flushes both files.
    pub fn record(&mut self, stats: &EpochStats, step: u64) {
        let step = step as usize;
        // fog2clear produces clear images, so it is the clear domain's generator.
        self.clear.add_scalar("generator", stats.fog2clear_loss as f32, step);
        self.clear.add_scalar("discriminator", stats.disc_clear_loss as f32, step);
        self.fog.add_scalar("generator", stats.clear2fog_loss as f32, step);
        self.fog.add_scalar("discriminator", stats.disc_fog_loss as f32, step);
        self.clear.flush();
        self.fog.flush();
    }
}
