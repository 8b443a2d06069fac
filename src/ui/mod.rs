mod areas_panel;
mod dialogs;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;
use crate::editor::{DetectionState, ExportState, PhotoState};

/// Resource that tracks whether any modal dialog is currently open.
/// Canvas input handlers check this to avoid processing input
/// while the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// Aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    config_reset: Res<ConfigResetNotification>,
    detection: Res<DetectionState>,
    export: Res<ExportState>,
    photo: Res<PhotoState>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = config_reset.show
        || detection.show_error
        || export.is_busy()
        || export.error.is_some()
        || export.last_message.is_some()
        || photo.pending.is_some()
        || photo.error.is_some();
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            // Side panel must render first so the top panels fit beside it
            .add_systems(EguiPrimaryContextPass, areas_panel::areas_panel_ui)
            .add_systems(
                EguiPrimaryContextPass,
                (toolbar::toolbar_ui, toolbar::draw_hint_ui)
                    .chain()
                    .after(areas_panel::areas_panel_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    dialogs::detection_error_dialog_ui,
                    dialogs::config_reset_notification_ui,
                    dialogs::export_result_dialog_ui,
                    dialogs::photo_error_dialog_ui,
                )
                    .after(toolbar::toolbar_ui),
            )
            .add_systems(First, update_dialog_state);
    }
}
