/// Camera rig: free-fly navigation and path replay over a shared state.
///
/// Both variants own a `CameraState` holding the pose, the intrinsics and
/// the derived view, projection and frustum. The derived data is refreshed
/// every time the pose or the viewport changes, so the scene reads a
/// consistent frustum once per frame.

use std::time::Duration;
use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;
use crate::engine_warn;
use crate::log::sources;
use super::frustum::Frustum;
use super::input::InputState;
use super::path::CameraPath;

/// Initial camera position
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);
/// Near clip distance
pub const DEFAULT_NEAR: f32 = 0.01;
/// Far clip distance
pub const DEFAULT_FAR: f32 = 100.0;
/// Vertical field of view (60 degrees)
pub const DEFAULT_FOV_Y: f32 = std::f32::consts::FRAC_PI_3;
/// Free-fly speed in world units per millisecond
pub const DEFAULT_SPEED: f32 = 0.01;
/// Radians per unit of `rotate` input
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
/// Scale from mouse pixels to `rotate` input
pub const MOUSE_SCALE: f32 = 0.05;
/// Pitch stays this far from straight up/down
const PITCH_MARGIN: f32 = 0.1;

// ============================================================================
// CameraState
// ============================================================================

/// Pose, intrinsics and derived matrices shared by every camera variant.
#[derive(Debug, Clone)]
pub struct CameraState {
    position: Vec3,
    look_direction: Vec3,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    frustum: Frustum,
}

impl CameraState {
    /// Camera at (0, 0, 3) looking down -Z with a square viewport
    pub fn new() -> Self {
        let mut state = Self {
            position: DEFAULT_POSITION,
            look_direction: Vec3::NEG_Z,
            fov_y: DEFAULT_FOV_Y,
            aspect: 1.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            frustum: Frustum::from_planes([glam::Vec4::ZERO; 6]),
        };
        state.projection = state.compute_projection();
        state.refresh_view();
        state
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_direction(&self) -> Vec3 {
        self.look_direction
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== SETTERS =====

    /// Move the camera and recompute view and frustum.
    ///
    /// A pose that yields a non-finite view (zero or vertical look
    /// direction) is ignored.
    pub fn set_pose(&mut self, position: Vec3, look_direction: Vec3) {
        let previous = (self.position, self.look_direction);
        self.position = position;
        self.look_direction = look_direction;
        if !self.refresh_view() {
            (self.position, self.look_direction) = previous;
        }
    }

    /// Adapt the projection to a new viewport.
    ///
    /// A zero-area viewport (minimized window) leaves projection and
    /// frustum untouched. Returns whether the viewport was applied.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            engine_warn!(sources::CAMERA,
                "Ignoring degenerate viewport {}x{}", width, height);
            return false;
        }
        self.aspect = width as f32 / height as f32;
        self.projection = self.compute_projection();
        self.refresh_frustum();
        true
    }

    fn compute_projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Recompute view and frustum from the pose; `false` (nothing changed)
    /// if the result would not be finite.
    fn refresh_view(&mut self) -> bool {
        let view = Mat4::look_at_rh(self.position, self.position + self.look_direction, Vec3::Y);
        if !view.is_finite() {
            return false;
        }
        self.view = view;
        self.refresh_frustum();
        true
    }

    fn refresh_frustum(&mut self) {
        let frustum = Frustum::from_view_projection(&(self.projection * self.view));
        if frustum.is_finite() {
            self.frustum = frustum;
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FreeFlyCamera
// ============================================================================

/// Keyboard/mouse driven camera (W/S forward, A/D strafe, Q/E down/up).
///
/// Orientation is stored as yaw (`theta`, around +Y) and pitch (`phi`);
/// movement stays horizontal regardless of pitch.
#[derive(Debug, Clone)]
pub struct FreeFlyCamera {
    state: CameraState,
    theta: f32,
    phi: f32,
    speed: f32,
    sensitivity: f32,
}

impl FreeFlyCamera {
    pub fn new() -> Self {
        Self::from_state(CameraState::new())
    }

    /// Take over an existing state, deriving yaw and pitch from its look
    /// direction.
    pub fn from_state(state: CameraState) -> Self {
        let look = state.look_direction().try_normalize().unwrap_or(Vec3::NEG_Z);
        let max_pitch = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;
        let mut camera = Self {
            theta: (-look.z).atan2(look.x),
            phi: look.y.clamp(-1.0, 1.0).asin().clamp(-max_pitch, max_pitch),
            state,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
        };
        camera.apply_orientation();
        camera
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    pub fn set_speed(&mut self, units_per_ms: f32) {
        self.speed = units_per_ms;
    }

    /// Horizontal forward direction
    pub fn forward(&self) -> Vec3 {
        let look = self.state.look_direction;
        Vec3::new(look.x, 0.0, look.z).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    /// Horizontal right direction
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }

    /// Turn by `x` (yaw) and `y` (pitch) input units
    pub fn rotate(&mut self, x: f32, y: f32) {
        let max_pitch = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;
        self.theta += x * self.sensitivity;
        self.phi = (self.phi + y * self.sensitivity).clamp(-max_pitch, max_pitch);
        self.apply_orientation();
    }

    /// Apply mouse motion and held keys. Always stays active.
    pub fn update(&mut self, dt: Duration, input: &InputState) -> bool {
        let motion = input.mouse_delta();
        if motion != glam::Vec2::ZERO {
            self.rotate(-motion.x * MOUSE_SCALE, -motion.y * MOUSE_SCALE);
        }

        let step = self.speed * dt.as_secs_f32() * 1000.0;
        let translation = self.forward() * input.axis(KeyCode::KeyW, KeyCode::KeyS)
            + self.right() * input.axis(KeyCode::KeyD, KeyCode::KeyA)
            + Vec3::Y * input.axis(KeyCode::KeyE, KeyCode::KeyQ);

        if translation != Vec3::ZERO {
            let position = self.state.position + translation * step;
            let look = self.state.look_direction;
            self.state.set_pose(position, look);
        }
        true
    }

    fn apply_orientation(&mut self) {
        let look = Vec3::new(
            self.phi.cos() * self.theta.cos(),
            self.phi.sin(),
            -self.phi.cos() * self.theta.sin(),
        );
        let position = self.state.position;
        self.state.set_pose(position, look);
    }
}

impl Default for FreeFlyCamera {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PathCamera
// ============================================================================

/// Replays a recorded path, interpolating between keyframes.
#[derive(Debug, Clone)]
pub struct PathCamera {
    state: CameraState,
    path: CameraPath,
    elapsed: Duration,
}

impl PathCamera {
    /// Start a replay, keeping the intrinsics of `state`.
    pub fn new(path: CameraPath, mut state: CameraState) -> Self {
        if let Some((position, look)) = path.sample(Duration::ZERO) {
            state.set_pose(position, look);
        }
        Self { state, path, elapsed: Duration::ZERO }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    pub fn path(&self) -> &CameraPath {
        &self.path
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance the replay. Returns `false` once the path is exhausted.
    pub fn update(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        match self.path.sample(self.elapsed) {
            Some((position, look)) => {
                self.state.set_pose(position, look);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Camera
// ============================================================================

/// The active camera: one variant at a time, swapped wholesale on mode
/// transitions.
#[derive(Debug, Clone)]
pub enum Camera {
    FreeFly(FreeFlyCamera),
    PathReplay(PathCamera),
}

impl Camera {
    /// Default free-fly camera
    pub fn free_fly() -> Self {
        Camera::FreeFly(FreeFlyCamera::new())
    }

    /// Replay `path` with the intrinsics of this camera
    pub fn replay(&self, path: CameraPath) -> Self {
        Camera::PathReplay(PathCamera::new(path, self.state().clone()))
    }

    /// Free-fly camera continuing from this camera's pose
    pub fn to_free_fly(&self) -> Self {
        Camera::FreeFly(FreeFlyCamera::from_state(self.state().clone()))
    }

    pub fn is_free_fly(&self) -> bool {
        matches!(self, Camera::FreeFly(_))
    }

    pub fn state(&self) -> &CameraState {
        match self {
            Camera::FreeFly(camera) => camera.state(),
            Camera::PathReplay(camera) => camera.state(),
        }
    }

    fn state_mut(&mut self) -> &mut CameraState {
        match self {
            Camera::FreeFly(camera) => camera.state_mut(),
            Camera::PathReplay(camera) => camera.state_mut(),
        }
    }

    /// Advance by `dt`. Returns `false` when a replay has finished.
    pub fn update(&mut self, dt: Duration, input: &InputState) -> bool {
        match self {
            Camera::FreeFly(camera) => camera.update(dt, input),
            Camera::PathReplay(camera) => camera.update(dt),
        }
    }

    /// Turn the camera (ignored during a replay)
    pub fn rotate(&mut self, x: f32, y: f32) {
        if let Camera::FreeFly(camera) = self {
            camera.rotate(x, y);
        }
    }

    /// Adapt to a new viewport; zero-area viewports are ignored
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.state_mut().resize(width, height)
    }

    pub fn position(&self) -> Vec3 {
        self.state().position()
    }

    pub fn view_matrix(&self) -> &Mat4 {
        self.state().view_matrix()
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        self.state().projection_matrix()
    }

    pub fn frustum(&self) -> &Frustum {
        self.state().frustum()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::free_fly()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
