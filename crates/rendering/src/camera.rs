use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

const PAN_SPEED: f32 = 500.0;
const ZOOM_SPEED: f32 = 0.15;
const MIN_DISTANCE: f32 = 10.0;
const MAX_DISTANCE: f32 = 3000.0;
const MIN_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;

/// Orbital camera around a focus point on the Z-up ground plane.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub focus: Vec3,
    /// Rotation around Z in radians
    pub yaw: f32,
    /// Elevation above the ground plane in radians
    pub pitch: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.0,
            pitch: MAX_PITCH,
            distance: 400.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let ground = self.distance * self.pitch.cos();
        let offset = Vec3::new(
            ground * self.yaw.sin(),
            -ground * self.yaw.cos(),
            self.distance * self.pitch.sin(),
        );
        self.focus + offset
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Z)
    }

    /// Move the focus by a screen space delta, scaled with the zoom level.
    fn pan(&mut self, screen_delta: Vec2) {
        let scale = self.distance / 1000.0;
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let right = Vec2::new(cos_yaw, sin_yaw);
        let up = Vec2::new(-sin_yaw, cos_yaw);
        let world = -right * screen_delta.x + up * screen_delta.y;
        self.focus += (world * scale).extend(0.0);
    }
}

#[derive(Resource, Default)]
pub struct CameraDrag {
    pub dragging: bool,
    pub panning: bool,
    pub last_pos: Vec2,
}

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    commands.spawn((Camera3d::default(), orbit.transform()));
    commands.insert_resource(orbit);
}

/// System: apply OrbitCamera state to the camera Transform.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = orbit.transform();
}

/// WASD/Arrow keys: pan along the ground plane. `dir` is in drag space.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        dir.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        dir.x -= 1.0;
    }
    if dir != Vec2::ZERO {
        let delta = dir.normalize() * PAN_SPEED * time.delta_secs();
        orbit.pan(delta);
    }
}

/// Middle-mouse drag orbits, shift + middle-mouse drag pans.
pub fn camera_middle_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    windows: Query<&Window>,
    mut drag: ResMut<CameraDrag>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Middle) {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.panning = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
            drag.last_pos = pos;
        }
    }
    if buttons.just_released(MouseButton::Middle) {
        drag.dragging = false;
    }

    if !drag.dragging {
        return;
    }
    let Some(pos) = window.cursor_position() else {
        return;
    };
    let delta = pos - drag.last_pos;
    drag.last_pos = pos;
    if delta == Vec2::ZERO {
        return;
    }
    if drag.panning {
        orbit.pan(delta);
    } else {
        orbit.yaw -= delta.x * ORBIT_SENSITIVITY;
        orbit.pitch = (orbit.pitch + delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }
}

/// Scroll wheel: zoom (change distance).
pub fn camera_zoom(mut scroll_evts: EventReader<MouseWheel>, mut orbit: ResMut<OrbitCamera>) {
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_view_eye_above_focus() {
        let orbit = OrbitCamera {
            focus: Vec3::new(10.0, 20.0, 0.0),
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_2,
            distance: 100.0,
        };
        let eye = orbit.eye();
        assert!((eye - Vec3::new(10.0, 20.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_pan_stays_on_ground_plane() {
        let mut orbit = OrbitCamera {
            yaw: 0.7,
            ..Default::default()
        };
        orbit.pan(Vec2::new(30.0, -12.0));
        assert_eq!(orbit.focus.z, 0.0);
        assert!(orbit.focus.truncate().length() > 0.0);
    }

    #[test]
    fn test_pan_scales_with_distance() {
        let mut near = OrbitCamera {
            distance: 100.0,
            ..Default::default()
        };
        let mut far = OrbitCamera {
            distance: 1000.0,
            ..Default::default()
        };
        near.pan(Vec2::X * 10.0);
        far.pan(Vec2::X * 10.0);
        assert!((far.focus.length() / near.focus.length() - 10.0).abs() < 1e-3);
    }
}
