//! Modal notifications: detection failures, config resets, export results.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::ConfigResetNotification;
use crate::editor::{DetectionState, ExportState, PhotoState};
use crate::theme;

fn error_window(ctx: &egui::Context, title: &str, heading: &str, message: &str) -> bool {
    let mut dismissed = false;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.colored_label(theme::ui::ERROR_TEXT, heading);
            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .max_height(150.0)
                .show(ui, |ui| {
                    ui.label(message);
                });
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    dismissed
}

pub fn detection_error_dialog_ui(
    mut contexts: EguiContexts,
    mut detection: ResMut<DetectionState>,
) -> Result {
    if !detection.show_error {
        return Ok(());
    }
    let message = detection.last_error.clone().unwrap_or_default();

    if error_window(
        contexts.ctx_mut()?,
        "Detection Failed",
        "No areas were added",
        &message,
    ) {
        detection.show_error = false;
    }
    Ok(())
}

pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(reason)
                        .color(theme::ui::HINT_TEXT)
                        .size(11.0),
                );
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });
    Ok(())
}

pub fn export_result_dialog_ui(
    mut contexts: EguiContexts,
    mut export: ResMut<ExportState>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    if let Some(error) = export.error.clone() {
        if error_window(ctx, "Export Failed", "Could not export areas", &error) {
            export.error = None;
        }
        return Ok(());
    }

    let Some(message) = export.last_message.clone() else {
        return Ok(());
    };
    egui::Window::new("Export Complete")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                export.last_message = None;
            }
        });
    Ok(())
}

pub fn photo_error_dialog_ui(mut contexts: EguiContexts, mut photo: ResMut<PhotoState>) -> Result {
    let Some(error) = photo.error.clone() else {
        return Ok(());
    };
    if error_window(contexts.ctx_mut()?, "Photo Error", "Could not open photo", &error) {
        photo.error = None;
    }
    Ok(())
}
