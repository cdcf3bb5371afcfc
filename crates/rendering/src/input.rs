//! Window input to [`ModalInput`] events.
//!
//! The cursor is projected onto the `z = 0` ground plane. Pointer events over
//! egui panels are sent as outside the viewport so build roads passes them on.

use bevy::input::mouse::MouseWheel;
use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;
use bevy::window::CursorMoved;
use bevy_egui::EguiContexts;

use roads::build_roads::{EventKind, EventValue, ModalEvent, ModalInput};

/// Cursor position on the ground plane, `None` when it misses.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct CursorGroundPos(pub Option<Vec3>);

const MOUSE_BUTTONS: [(MouseButton, EventKind); 3] = [
    (MouseButton::Left, EventKind::LeftMouse),
    (MouseButton::Right, EventKind::RightMouse),
    (MouseButton::Middle, EventKind::MiddleMouse),
];

/// True when egui wants the pointer, so world input should be skipped.
fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
}

pub fn ground_hit(camera: &Camera, transform: &GlobalTransform, screen_pos: Vec2) -> Option<Vec3> {
    let ray = camera.viewport_to_world(transform, screen_pos).ok()?;
    let t = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Z))?;
    Some(ray.get_point(t))
}

pub fn update_cursor_ground_pos(
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor: ResMut<CursorGroundPos>,
) {
    let (Ok(window), Ok((camera, cam_transform))) = (windows.get_single(), camera_q.get_single())
    else {
        cursor.0 = None;
        return;
    };
    cursor.0 = window
        .cursor_position()
        .and_then(|pos| ground_hit(camera, cam_transform, pos));
}

#[allow(clippy::too_many_arguments)]
pub fn forward_modal_input(
    mut moved: EventReader<CursorMoved>,
    mut wheel: EventReader<MouseWheel>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    cursor: Res<CursorGroundPos>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut out: EventWriter<ModalInput>,
) {
    let in_window = windows
        .get_single()
        .is_ok_and(|w| w.cursor_position().is_some());
    let in_viewport = in_window && !egui_wants_pointer(&mut contexts);
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    let mut events = Vec::new();
    if moved.read().count() > 0 {
        if let Some(pos) = cursor.0 {
            events.push(ModalEvent::mouse_move(pos));
        }
    }
    for (button, kind) in MOUSE_BUTTONS {
        if buttons.just_pressed(button) {
            events.push(ModalEvent::new(kind, EventValue::Press));
        }
        if buttons.just_released(button) {
            events.push(ModalEvent::new(kind, EventValue::Release));
        }
    }
    for evt in wheel.read() {
        if evt.y > 0.0 {
            events.push(ModalEvent::press(EventKind::WheelUp));
        } else if evt.y < 0.0 {
            events.push(ModalEvent::press(EventKind::WheelDown));
        }
    }
    for key in keys.get_just_pressed() {
        events.push(ModalEvent::key(*key));
    }
    for key in keys.get_just_released() {
        events.push(ModalEvent::new(EventKind::Key(*key), EventValue::Release));
    }

    out.send_batch(events.into_iter().map(|e| {
        let e = e.with_ctrl(ctrl).with_shift(shift);
        let e = if in_viewport { e } else { e.outside_viewport() };
        ModalInput(ModalEvent {
            cursor: e.cursor.or(cursor.0),
            ..e
        })
    }));
}

