//! Input event helpers for `TestRoads`.

use bevy::prelude::*;

use crate::build_roads::{BuildRoadsRequest, EventKind, ModalEvent, ModalInput};

use super::TestRoads;

impl TestRoads {
    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn request_build_roads(&mut self) {
        self.app.world_mut().send_event(BuildRoadsRequest);
        self.app.update();
    }

    /// Send `events` and run one update to process them.
    pub fn send(&mut self, events: impl IntoIterator<Item = ModalEvent>) {
        for event in events {
            self.app.world_mut().send_event(ModalInput(event));
        }
        self.app.update();
    }

    pub fn move_mouse(&mut self, x: f32, y: f32) {
        self.send([ModalEvent::mouse_move(Vec3::new(x, y, 0.0))]);
    }

    /// Move to `(x, y)` and left click there.
    pub fn click(&mut self, x: f32, y: f32) {
        self.send([
            ModalEvent::mouse_move(Vec3::new(x, y, 0.0)),
            ModalEvent::press(EventKind::LeftMouse),
        ]);
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.send([ModalEvent::key(key)]);
    }

    /// Click at `from`, then at `to`.
    pub fn draw(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.click(from.0, from.1);
        self.click(to.0, to.1);
    }
}
