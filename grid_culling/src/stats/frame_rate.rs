/// Frame-rate measurement.
///
/// `FrameRateCounter` averages over a fixed window instead of a per-frame
/// estimate, so the displayed value is stable. `FpsRecorder` samples that
/// value at a fixed interval and writes a two-column `seconds fps` file.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use crate::error::Result;

/// Averaging window of the frame-rate counter
pub const SAMPLE_WINDOW: Duration = Duration::from_millis(1000);

/// Time between two recorded FPS samples
pub const CHECKPOINT_INTERVAL: Duration = Duration::from_millis(250);

/// Frames per second averaged over `SAMPLE_WINDOW`.
#[derive(Debug, Clone, Default)]
pub struct FrameRateCounter {
    frames: u32,
    elapsed: Duration,
    fps: f32,
}

impl FrameRateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame that took `dt`. Returns the current estimate, which
    /// only changes when a window completes (0 before the first one).
    pub fn tick(&mut self, dt: Duration) -> f32 {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= SAMPLE_WINDOW {
            self.fps = self.frames as f32 / self.elapsed.as_secs_f32();
            self.frames = 0;
            self.elapsed = Duration::ZERO;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// One recorded sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsSample {
    /// Time since the previous sample
    pub interval: Duration,
    pub fps: f32,
}

/// Records the frame rate every `CHECKPOINT_INTERVAL`.
///
/// The first tick records immediately; `checkpoints` more samples follow
/// before the recorder reports completion.
#[derive(Debug, Clone)]
pub struct FpsRecorder {
    checkpoints_left: u32,
    since_last: Duration,
    samples: Vec<FpsSample>,
    finished: bool,
}

impl FpsRecorder {
    pub fn new(checkpoints: u32) -> Self {
        Self {
            checkpoints_left: checkpoints,
            since_last: CHECKPOINT_INTERVAL,
            samples: Vec::with_capacity(checkpoints as usize + 1),
            finished: false,
        }
    }

    /// Recorder covering `duration` (one checkpoint per interval)
    pub fn for_duration(duration: Duration) -> Self {
        let checkpoints = duration.as_millis() / CHECKPOINT_INTERVAL.as_millis();
        Self::new(u32::try_from(checkpoints).unwrap_or(u32::MAX))
    }

    /// Advance by `dt` with the current frame rate. Returns `true` once the
    /// last sample has been taken.
    pub fn tick(&mut self, dt: Duration, fps: f32) -> bool {
        if self.finished {
            return true;
        }
        self.since_last += dt;
        if self.since_last >= CHECKPOINT_INTERVAL {
            self.samples.push(FpsSample { interval: self.since_last, fps });
            self.since_last = Duration::ZERO;
            if self.checkpoints_left == 0 {
                self.finished = true;
            } else {
                self.checkpoints_left -= 1;
            }
        }
        self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn samples(&self) -> &[FpsSample] {
        &self.samples
    }

    /// Write `seconds fps` lines. The first sample is at time 0; later ones
    /// at the accumulated intervals since.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let Some((first, rest)) = self.samples.split_first() else {
            return Ok(());
        };
        writeln!(writer, "0.0 {}", first.fps)?;
        let mut elapsed = Duration::ZERO;
        for sample in rest {
            elapsed += sample.interval;
            writeln!(writer, "{} {}", elapsed.as_secs_f32(), sample.fps)?;
        }
        Ok(())
    }

    /// Write the record to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_rate_tests.rs"]
mod tests;
