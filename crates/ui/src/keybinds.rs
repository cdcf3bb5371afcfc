use bevy::prelude::*;
use bevy_egui::EguiContexts;

use roads::build_roads::BuildRoadsRequest;
use roads::BuildRoadsSession;
use save::{LoadRoadsEvent, SaveRoadsEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    BuildRoads,
    Save,
    Load,
}

/// Actions triggered this frame. While build roads runs the keyboard belongs
/// to the operator, so nothing triggers.
pub fn hotkey_actions(keys: &ButtonInput<KeyCode>, session_active: bool) -> Vec<HotkeyAction> {
    if session_active {
        return Vec::new();
    }
    [
        (KeyCode::KeyB, HotkeyAction::BuildRoads),
        (KeyCode::F5, HotkeyAction::Save),
        (KeyCode::F9, HotkeyAction::Load),
    ]
    .into_iter()
    .filter(|(key, _)| keys.just_pressed(*key))
    .map(|(_, action)| action)
    .collect()
}

pub fn hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    session: Res<BuildRoadsSession>,
    mut requests: EventWriter<BuildRoadsRequest>,
    mut save_events: EventWriter<SaveRoadsEvent>,
    mut load_events: EventWriter<LoadRoadsEvent>,
) {
    if contexts
        .try_ctx_mut()
        .is_some_and(|ctx| ctx.wants_keyboard_input())
    {
        return;
    }
    for action in hotkey_actions(&keys, session.is_active()) {
        match action {
            HotkeyAction::BuildRoads => {
                requests.send(BuildRoadsRequest);
            }
            HotkeyAction::Save => {
                save_events.send(SaveRoadsEvent);
            }
            HotkeyAction::Load => {
                load_events.send(LoadRoadsEvent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkeys_when_idle() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyB);
        keys.press(KeyCode::F9);
        assert_eq!(
            hotkey_actions(&keys, false),
            vec![HotkeyAction::BuildRoads, HotkeyAction::Load]
        );
    }

    #[test]
    fn test_hotkeys_suppressed_while_building() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::F5);
        assert!(hotkey_actions(&keys, true).is_empty());
    }

    #[test]
    fn test_held_key_triggers_once() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::F5);
        keys.clear();
        assert!(keys.pressed(KeyCode::F5));
        assert!(hotkey_actions(&keys, false).is_empty());
    }
}
