//! Pointer input: feeds canvas clicks and drags into the interaction state machine.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::constants::VERTEX_HIT_RADIUS;
use crate::measure::{AreaStore, InteractionState, PointerOutcome};

use super::params::{is_cursor_over_ui, CameraParams};

pub fn handle_pointer(
    mouse_button: Res<ButtonInput<MouseButton>>,
    camera: CameraParams,
    mut interaction: ResMut<InteractionState>,
    mut store: ResMut<AreaStore>,
    mut contexts: EguiContexts,
) {
    // Releasing over the UI still ends a drag
    if mouse_button.just_released(MouseButton::Left) && interaction.drag().is_some() {
        interaction.pointer_up();
    }

    if is_cursor_over_ui(&mut contexts) {
        return;
    }

    let Some(world_pos) = camera.cursor_world_pos() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        let radius = VERTEX_HIT_RADIUS * camera.zoom_scale();
        match interaction.pointer_down(world_pos, radius, &mut store) {
            PointerOutcome::Nothing => {}
            outcome => debug!("Pointer down at {:?}: {:?}", world_pos, outcome),
        }
    } else if mouse_button.pressed(MouseButton::Left)
        && let Some(drag) = interaction.drag()
    {
        let unchanged = store
            .get(&drag.area_id)
            .and_then(|a| a.coordinates().get(drag.vertex))
            .is_some_and(|v| *v == world_pos);
        if !unchanged {
            interaction.pointer_move(world_pos, &mut store);
        }
    }
}

/// Right click completes the polygon being drawn
pub fn finish_on_right_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut interaction: ResMut<InteractionState>,
    mut store: ResMut<AreaStore>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.just_pressed(MouseButton::Right) || is_cursor_over_ui(&mut contexts) {
        return;
    }
    interaction.finish_drawing(&mut store);
}
