//! Camera module: frustum test, camera rig, path recording and input.
//!
//! The scene reads exactly one frustum and one camera position per frame
//! from here; everything else (navigation, replay) only exists to produce
//! those two values.

mod camera;
mod frustum;
mod input;
pub mod path;

pub use camera::{
    Camera, CameraState, FreeFlyCamera, PathCamera,
    DEFAULT_POSITION, DEFAULT_NEAR, DEFAULT_FAR, DEFAULT_FOV_Y,
};
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use input::InputState;
pub use path::{CameraPath, PathRecorder, KEYFRAME_INTERVAL};
