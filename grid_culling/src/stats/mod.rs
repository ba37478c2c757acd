//! Frame statistics: a rolling frame-rate counter and the FPS recorder used
//! to benchmark strategies over a replayed camera path.

mod frame_rate;

pub use frame_rate::{
    FpsRecorder, FpsSample, FrameRateCounter, CHECKPOINT_INTERVAL, SAMPLE_WINDOW,
};
