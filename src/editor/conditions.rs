//! Run conditions for controlling when editor systems execute.

use bevy::prelude::*;

use crate::measure::{EditorMode, InteractionState};
use crate::ui::DialogState;

/// Run condition: returns true when the editor is in the given mode.
///
/// Usage: `.run_if(mode_is(EditorMode::Draw))`
pub fn mode_is(mode: EditorMode) -> impl FnMut(Res<InteractionState>) -> bool + Clone {
    move |state: Res<InteractionState>| state.mode() == mode
}

/// Run condition: returns true when no modal dialog is open.
///
/// Use this to prevent canvas input handlers from processing when
/// the user is interacting with a dialog.
pub fn no_dialog_open(dialog_state: Res<DialogState>) -> bool {
    !dialog_state.any_modal_open
}
