/// Camera paths: keyframed flights recorded from the free-fly camera and
/// replayed to benchmark strategies on identical camera motion.
///
/// Keyframes are one second apart. Text format (whitespace separated):
///
/// ```text
/// n
/// x y z        (n + 1 positions)
/// ...
/// x y z        (n + 1 look directions)
/// ...
/// ```

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use glam::Vec3;
use crate::error::{Error, Result};

/// Time between two keyframes
pub const KEYFRAME_INTERVAL: Duration = Duration::from_secs(1);

/// A sequence of `n + 1` keyframes (position + look direction).
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPath {
    positions: Vec<Vec3>,
    look_directions: Vec<Vec3>,
}

impl CameraPath {
    /// Build a path from matching keyframe lists (at least one keyframe).
    pub fn new(positions: Vec<Vec3>, look_directions: Vec<Vec3>) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::ParseError("camera path has no keyframes".to_string()));
        }
        if positions.len() != look_directions.len() {
            return Err(Error::ParseError(format!(
                "camera path has {} positions but {} look directions",
                positions.len(), look_directions.len()
            )));
        }
        Ok(Self { positions, look_directions })
    }

    /// Number of interpolated segments (`n`)
    pub fn segment_count(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn look_directions(&self) -> &[Vec3] {
        &self.look_directions
    }

    /// Total replay time (`n` seconds)
    pub fn duration(&self) -> Duration {
        KEYFRAME_INTERVAL * self.segment_count() as u32
    }

    /// Interpolated (position, look direction) at `elapsed`, or `None` once
    /// the last segment is over.
    pub fn sample(&self, elapsed: Duration) -> Option<(Vec3, Vec3)> {
        let interval_ms = KEYFRAME_INTERVAL.as_millis();
        let elapsed_ms = elapsed.as_millis();
        let index = (elapsed_ms / interval_ms) as usize;
        if index >= self.segment_count() {
            return None;
        }
        let t = (elapsed_ms % interval_ms) as f32 / interval_ms as f32;

        let position = self.positions[index].lerp(self.positions[index + 1], t);
        let look = self.look_directions[index].lerp(self.look_directions[index + 1], t);
        Some((position, look))
    }

    // ===== TEXT FORMAT =====

    /// Parse the text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();

        let count_token = tokens.next()
            .ok_or_else(|| Error::ParseError("empty camera path".to_string()))?;
        let segments: usize = count_token.parse()
            .map_err(|_| Error::ParseError(format!("invalid segment count '{}'", count_token)))?;

        let mut read_vec3 = |what: &str, index: usize| -> Result<Vec3> {
            let mut components = [0.0f32; 3];
            for component in &mut components {
                let token = tokens.next().ok_or_else(|| Error::ParseError(format!(
                    "camera path truncated in {} {}", what, index
                )))?;
                *component = token.parse().map_err(|_| Error::ParseError(format!(
                    "invalid number '{}' in {} {}", token, what, index
                )))?;
            }
            Ok(Vec3::from_array(components))
        };

        let positions = (0..=segments)
            .map(|i| read_vec3("position", i))
            .collect::<Result<Vec<_>>>()?;
        let look_directions = (0..=segments)
            .map(|i| read_vec3("look direction", i))
            .collect::<Result<Vec<_>>>()?;

        Self::new(positions, look_directions)
    }

    /// Read a path file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write the text format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}", self.segment_count())?;
        for v in self.positions.iter().chain(self.look_directions.iter()) {
            writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
        }
        Ok(())
    }

    /// Write a path file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        self.write_to(&mut file)
    }
}

/// Samples the free-fly camera once per keyframe interval.
#[derive(Debug, Clone)]
pub struct PathRecorder {
    segments: usize,
    since_last: Duration,
    positions: Vec<Vec3>,
    look_directions: Vec<Vec3>,
}

impl PathRecorder {
    /// Start recording `segments` seconds of flight from the current pose.
    pub fn new(segments: usize, position: Vec3, look_direction: Vec3) -> Self {
        let mut positions = Vec::with_capacity(segments + 1);
        let mut look_directions = Vec::with_capacity(segments + 1);
        positions.push(position);
        look_directions.push(look_direction);
        Self { segments, since_last: Duration::ZERO, positions, look_directions }
    }

    /// Advance by `dt` with the current pose. Returns `false` once every
    /// keyframe has been captured.
    pub fn record(&mut self, dt: Duration, position: Vec3, look_direction: Vec3) -> bool {
        self.since_last += dt;
        while !self.is_complete() && self.since_last >= KEYFRAME_INTERVAL {
            self.since_last -= KEYFRAME_INTERVAL;
            self.positions.push(position);
            self.look_directions.push(look_direction);
        }
        !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.positions.len() > self.segments
    }

    /// Keyframes captured so far
    pub fn keyframe_count(&self) -> usize {
        self.positions.len()
    }

    /// The recorded path (possibly shorter than requested if stopped early).
    pub fn finish(self) -> Result<CameraPath> {
        CameraPath::new(self.positions, self.look_directions)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
