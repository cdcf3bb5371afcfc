use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

// =============================================================================
// Input events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MouseMove,
    LeftMouse,
    RightMouse,
    MiddleMouse,
    WheelUp,
    WheelDown,
    Key(KeyCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventValue {
    Press,
    Release,
    #[default]
    Nothing,
}

/// One input event, already resolved against the viewport by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalEvent {
    pub kind: EventKind,
    pub value: EventValue,
    pub ctrl: bool,
    pub shift: bool,
    /// False when the cursor is over UI or outside the 3D viewport.
    pub in_viewport: bool,
    /// Cursor projected to the ground plane, if it hits it.
    pub cursor: Option<Vec3>,
}

impl ModalEvent {
    pub fn new(kind: EventKind, value: EventValue) -> Self {
        Self {
            kind,
            value,
            ctrl: false,
            shift: false,
            in_viewport: true,
            cursor: None,
        }
    }

    pub fn mouse_move(cursor: Vec3) -> Self {
        Self {
            cursor: Some(cursor),
            ..Self::new(EventKind::MouseMove, EventValue::Nothing)
        }
    }

    pub fn press(kind: EventKind) -> Self {
        Self::new(kind, EventValue::Press)
    }

    pub fn key(key: KeyCode) -> Self {
        Self::press(EventKind::Key(key))
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn outside_viewport(mut self) -> Self {
        self.in_viewport = false;
        self
    }
}

/// Bevy event carrying one [`ModalEvent`] to a running operator.
#[derive(Event, Debug, Clone)]
pub struct ModalInput(pub ModalEvent);

/// Ask to start the build roads operator.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct BuildRoadsRequest;

/// Outcome of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Event consumed, the operator keeps running.
    RunningModal,
    /// Event not consumed, the host should handle it.
    PassThrough,
    /// The operator is done and released its lock.
    Finished,
}

// =============================================================================
// Single instance lock
// =============================================================================

/// Allows one build roads operator at a time.
#[derive(Resource, Debug, Clone, Default)]
pub struct BuildRoadsLock(Arc<AtomicBool>);

impl BuildRoadsLock {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Take the lock, `None` when another operator holds it.
    pub(crate) fn try_acquire(&self) -> Option<LockGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LockGuard(self.0.clone()))
    }
}

/// Held by a running operator, releases the lock when dropped.
#[derive(Debug)]
pub(crate) struct LockGuard(Arc<AtomicBool>);

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Grid scale of the viewport overlay, used for grid snapping.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct OverlayGridScale(pub f32);

impl Default for OverlayGridScale {
    fn default() -> Self {
        Self(1.0)
    }
}
