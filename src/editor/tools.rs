use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::measure::{AreaStore, EditorMode, InteractionState};

/// Keyboard shortcut for each editor mode
pub fn mode_for_key(key: KeyCode) -> Option<EditorMode> {
    match key {
        KeyCode::KeyV | KeyCode::KeyS => Some(EditorMode::Select),
        KeyCode::KeyE => Some(EditorMode::Edit),
        KeyCode::KeyD => Some(EditorMode::Draw),
        _ => None,
    }
}

pub fn cursor_icon(mode: EditorMode, dragging: bool) -> CursorIcon {
    match (mode, dragging) {
        (EditorMode::Edit, true) => CursorIcon::System(SystemCursorIcon::Grabbing),
        (EditorMode::Edit, false) => CursorIcon::System(SystemCursorIcon::Pointer),
        (EditorMode::Draw, _) => CursorIcon::System(SystemCursorIcon::Crosshair),
        (EditorMode::Select, _) => CursorIcon::System(SystemCursorIcon::Default),
    }
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut interaction: ResMut<InteractionState>,
    mut store: ResMut<AreaStore>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    if let Some(mode) = keyboard.get_just_pressed().find_map(|key| mode_for_key(*key)) {
        interaction.switch_tool(mode);
    }

    if keyboard.just_pressed(KeyCode::Enter) && interaction.mode() == EditorMode::Draw {
        interaction.finish_drawing(&mut store);
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        if interaction.is_drawing() {
            interaction.cancel_drawing();
        } else {
            store.deselect();
        }
    }
}

pub fn update_cursor_icon(
    interaction: Res<InteractionState>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, tool cursor on the canvas
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands.entity(entity).insert(cursor_icon(
        interaction.mode(),
        interaction.drag().is_some(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_shortcuts() {
        assert_eq!(mode_for_key(KeyCode::KeyV), Some(EditorMode::Select));
        assert_eq!(mode_for_key(KeyCode::KeyS), Some(EditorMode::Select));
        assert_eq!(mode_for_key(KeyCode::KeyE), Some(EditorMode::Edit));
        assert_eq!(mode_for_key(KeyCode::KeyD), Some(EditorMode::Draw));
        assert_eq!(mode_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_draw_has_crosshair() {
        assert_eq!(
            cursor_icon(EditorMode::Draw, false),
            CursorIcon::System(SystemCursorIcon::Crosshair)
        );
    }

    #[test]
    fn test_dragging_vertex_shows_grabbing() {
        assert_eq!(
            cursor_icon(EditorMode::Edit, true),
            CursorIcon::System(SystemCursorIcon::Grabbing)
        );
        assert_ne!(
            cursor_icon(EditorMode::Edit, false),
            cursor_icon(EditorMode::Edit, true)
        );
    }

    #[test]
    fn test_cursor_icons_are_system_cursors() {
        for mode in EditorMode::all() {
            assert!(matches!(cursor_icon(*mode, false), CursorIcon::System(_)));
        }
    }
}
