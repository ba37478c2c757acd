/// Input snapshot consumed by the camera once per frame.
///
/// The windowing layer owns the event loop; it feeds key and mouse events
/// into an `InputState` and passes it to `Scene::update`.

use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::keyboard::KeyCode;

/// Keys currently held plus the accumulated mouse motion.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: FxHashSet<KeyCode>,
    mouse_delta: Vec2,
}

impl InputState {
    /// Create an empty input state (nothing pressed, no motion)
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press
    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    /// Record a key release
    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    /// Whether a key is currently held
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// +1 if `positive` is held, -1 if `negative` is held, 0 for both or neither
    pub fn axis(&self, positive: KeyCode, negative: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.is_pressed(positive) {
            value += 1.0;
        }
        if self.is_pressed(negative) {
            value -= 1.0;
        }
        value
    }

    /// Accumulate mouse motion (in pixels)
    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    /// Mouse motion accumulated since the last `take_mouse_delta`
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Return and clear the accumulated mouse motion
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Release every key and drop pending motion (e.g. on focus loss)
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}
