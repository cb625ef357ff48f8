use glam::{DVec2, Quat, Vec3};

use crate::scene::GlobalScene;

pub const WORLD_UP: Vec3 = Vec3::Y;

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftControl,
    LeftShift,
    LeftAlt,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Pressed,
    Released,
}

/// What the windowing side should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    Continue,
    Exit,
}

/// Callbacks the window event loop delivers. Implementations only update
/// their own state; GPU work happens later in the frame.
pub trait InputHandler {
    fn key(&mut self, key: Key, action: KeyAction) -> InputResponse;
    fn pointer_moved(&mut self, x: f64, y: f64);
    fn viewport_resized(&mut self, width: u32, height: u32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Units per second.
    pub base_speed: f32,
    /// Multiplier applied by boost and divisor applied by reduce.
    pub speed_factor: f32,
    /// Degrees per pointer pixel. The default is 0.1 on purpose; at 0.002 the
    /// view barely turns.
    pub sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]` degrees.
    pub pitch_limit: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            base_speed: 3.0,
            speed_factor: 3.0,
            sensitivity: 0.1,
            pitch_limit: 89.0,
        }
    }
}

/// Held state of every movement key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
    pub reduce: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub front: Vec3,
    pub right: Vec3,
    pub rotation: Quat,
}

impl Orientation {
    /// Yaw and pitch in degrees.
    pub fn from_yaw_pitch(yaw: f32, pitch: f32) -> Self {
        let (yaw_r, pitch_r) = (yaw.to_radians(), pitch.to_radians());
        let front = Vec3::new(
            yaw_r.sin() * pitch_r.cos(),
            pitch_r.sin(),
            yaw_r.cos() * pitch_r.cos(),
        )
        .normalize();
        let right = (-front).cross(WORLD_UP).normalize();
        // Euler (-pitch, yaw, 0) applied X first.
        let rotation = Quat::from_rotation_y(yaw_r) * Quat::from_rotation_x(-pitch_r);
        Self {
            front,
            right,
            rotation,
        }
    }
}

/// Free-fly camera driven by held keys and relative pointer motion.
#[derive(Debug, Clone)]
pub struct CameraController {
    settings: CameraSettings,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    /// `None` until the first pointer sample establishes a baseline.
    last_pointer: Option<DVec2>,
    keys: MoveState,
    orientation: Orientation,
}

impl CameraController {
    pub fn new(settings: CameraSettings, position: Vec3) -> Self {
        Self {
            settings,
            position,
            yaw: 0.0,
            pitch: 0.0,
            last_pointer: None,
            keys: MoveState::default(),
            orientation: Orientation::from_yaw_pitch(0.0, 0.0),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn keys(&self) -> MoveState {
        self.keys
    }

    /// Orientation computed by the last [`CameraController::update`].
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn process_key(&mut self, key: Key, action: KeyAction) -> InputResponse {
        let pressed = action == KeyAction::Pressed;
        match key {
            Key::Escape => {
                if pressed {
                    tracing::info!("escape pressed, requesting shutdown");
                    return InputResponse::Exit;
                }
            }
            Key::W => self.keys.forward = pressed,
            Key::S => self.keys.back = pressed,
            Key::A => self.keys.left = pressed,
            Key::D => self.keys.right = pressed,
            Key::Space => self.keys.up = pressed,
            Key::LeftControl => self.keys.down = pressed,
            Key::LeftShift => self.keys.boost = pressed,
            Key::LeftAlt => self.keys.reduce = pressed,
        }
        InputResponse::Continue
    }

    /// Integrate pointer motion. Deltas are taken in `f64`; samples that are not
    /// finite, or whose scaled delta overflows, are dropped. Yaw wraps into
    /// `[0, 360)` and pitch is clamped.
    pub fn process_pointer(&mut self, x: f64, y: f64) {
        let current = DVec2::new(x, y);
        if !current.is_finite() {
            return;
        }
        let last = self.last_pointer.replace(current).unwrap_or(current);

        let offset = DVec2::new(current.x - last.x, last.y - current.y)
            * f64::from(self.settings.sensitivity);
        if !offset.is_finite() {
            return;
        }
        let limit = f64::from(self.settings.pitch_limit);
        self.yaw = (f64::from(self.yaw) + offset.x).rem_euclid(360.0) as f32;
        self.pitch = (f64::from(self.pitch) + offset.y).clamp(-limit, limit) as f32;
    }

    /// Speed in units per second given the held modifiers.
    pub fn speed(&self) -> f32 {
        let mut speed = self.settings.base_speed;
        if self.keys.boost {
            speed *= self.settings.speed_factor;
        }
        if self.keys.reduce {
            speed /= self.settings.speed_factor;
        }
        speed
    }

    /// Integrate one frame of motion and write the camera into `global`.
    pub fn update(&mut self, elapsed: f32, global: &mut GlobalScene) {
        self.orientation = Orientation::from_yaw_pitch(self.yaw, self.pitch);
        let Orientation { front, right, .. } = self.orientation;
        let step = self.speed() * elapsed;

        let mut direction = Vec3::ZERO;
        if self.keys.forward {
            direction += front;
        }
        if self.keys.back {
            direction -= front;
        }
        if self.keys.right {
            direction += right;
        }
        if self.keys.left {
            direction -= right;
        }
        if self.keys.up {
            direction += WORLD_UP;
        }
        if self.keys.down {
            direction -= WORLD_UP;
        }
        self.position += direction * step;

        global.camera_pos = self.position;
        global.camera_rotation = self.orientation.rotation;
    }
}

impl InputHandler for CameraController {
    fn key(&mut self, key: Key, action: KeyAction) -> InputResponse {
        self.process_key(key, action)
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        self.process_pointer(x, y);
    }

    fn viewport_resized(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "viewport resized");
    }
}
