mod camera;
mod conditions;
pub mod detection;
pub mod export;
mod input;
pub mod params;
pub mod photo;
pub mod rendering;
pub mod tools;

pub use detection::{DetectionState, RunDetectionRequest};
pub use export::{ExportGeoJsonRequest, ExportScope, ExportState};
pub use photo::{OpenPhotoRequest, PhotoState};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::measure::{AreaStore, EditorMode, InteractionState};
use conditions::{mode_is, no_dialog_open};

/// Trace every store mutation to the log
fn log_store_events(mut store: ResMut<AreaStore>) {
    store.subscribe(|event| debug!("Area store: {:?}", event));
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AreaStore>()
            .init_resource::<InteractionState>()
            .init_resource::<rendering::AreaProjection>()
            .init_resource::<detection::ActiveDetector>()
            .init_resource::<DetectionState>()
            .init_resource::<ExportState>()
            .init_resource::<PhotoState>()
            .add_message::<RunDetectionRequest>()
            .add_message::<ExportGeoJsonRequest>()
            .add_message::<OpenPhotoRequest>()
            .init_gizmo_group::<rendering::AreaGizmoGroup>()
            .init_gizmo_group::<rendering::HighlightGizmoGroup>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera,
                    rendering::configure_area_gizmos,
                    log_store_events,
                    photo::restore_last_photo.after(crate::config::ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::camera_reset,
                    camera::apply_camera_zoom,
                    tools::update_cursor_icon,
                ),
            )
            .add_systems(
                Update,
                (
                    tools::handle_tool_shortcuts,
                    input::handle_pointer,
                    input::finish_on_right_click.run_if(mode_is(EditorMode::Draw)),
                )
                    .chain()
                    .run_if(no_dialog_open),
            )
            .add_systems(
                Update,
                (
                    detection::configure_detector,
                    detection::start_detection.run_if(on_message::<RunDetectionRequest>),
                    detection::poll_detection_tasks,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    export::start_export.run_if(on_message::<ExportGeoJsonRequest>),
                    export::poll_export_dialog,
                    export::poll_export_write,
                    photo::open_photo_dialog.run_if(on_message::<OpenPhotoRequest>),
                    photo::poll_photo_dialog,
                    photo::detect_failed_photo,
                ),
            )
            .add_systems(
                PostUpdate,
                (rendering::update_projection, rendering::draw_projection).chain(),
            )
            .add_systems(EguiPrimaryContextPass, rendering::draw_labels);
    }
}
