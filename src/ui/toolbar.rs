use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{AppConfig, SetConfidenceThresholdRequest};
use crate::editor::{DetectionState, OpenPhotoRequest, RunDetectionRequest};
use crate::measure::{AreaStore, EditorMode, InteractionState, MIN_POLYGON_POINTS};
use crate::theme;

/// Main toolbar: mode buttons, detection controls and the photo picker
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut interaction: ResMut<InteractionState>,
    mut store: ResMut<AreaStore>,
    config: Res<AppConfig>,
    detection: Res<DetectionState>,
    mut detect_events: MessageWriter<RunDetectionRequest>,
    mut threshold_events: MessageWriter<SetConfidenceThresholdRequest>,
    mut photo_events: MessageWriter<OpenPhotoRequest>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for mode in EditorMode::all() {
                    let button = egui::Button::new(
                        egui::RichText::new(mode.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(interaction.mode() == *mode);

                    if ui.add(button).clicked() {
                        interaction.switch_tool(*mode);
                    }
                }

                if interaction.mode() == EditorMode::Draw {
                    ui.add_space(8.0);
                    let can_finish = interaction.current_path().len() >= MIN_POLYGON_POINTS;
                    if ui
                        .add_enabled(can_finish, egui::Button::new("Finish"))
                        .on_hover_text("Enter or right click")
                        .clicked()
                    {
                        interaction.finish_drawing(&mut store);
                    }
                    if ui
                        .add_enabled(interaction.is_drawing(), egui::Button::new("Cancel"))
                        .on_hover_text("Escape")
                        .clicked()
                    {
                        interaction.cancel_drawing();
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add(egui::Button::new("Detect Areas").min_size(egui::vec2(0.0, 24.0)))
                    .clicked()
                {
                    detect_events.write(RunDetectionRequest);
                }

                ui.label(egui::RichText::new("Confidence:").color(theme::ui::LABEL_TEXT));
                let mut threshold = config.data.detector.confidence_threshold;
                let response = ui.add(
                    egui::Slider::new(&mut threshold, 0.0..=1.0)
                        .fixed_decimals(2)
                        .step_by(0.05),
                );
                // Persist once the drag settles rather than every frame
                if response.drag_stopped() || (response.changed() && !response.dragged()) {
                    threshold_events.write(SetConfidenceThresholdRequest { threshold });
                }

                if detection.is_detecting() {
                    ui.add_space(4.0);
                    ui.spinner();
                    ui.colored_label(theme::ui::DETECTING, "Detecting...");
                } else if let Some(summary) = detection.summary() {
                    ui.add_space(4.0);
                    ui.colored_label(theme::ui::HINT_TEXT, summary);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add(egui::Button::new("Open Photo").min_size(egui::vec2(0.0, 24.0)))
                        .clicked()
                    {
                        photo_events.write(OpenPhotoRequest);
                    }
                });
            });
        });
    Ok(())
}

/// Hint bar for the active mode
pub fn draw_hint_ui(mut contexts: EguiContexts, interaction: Res<InteractionState>) -> Result {
    let hint = match interaction.mode() {
        EditorMode::Select => return Ok(()),
        EditorMode::Edit => "Drag a vertex of the selected area to reshape it".to_string(),
        EditorMode::Draw => format!(
            "Click to add points ({} placed). Enter or right click to finish, Escape to cancel.",
            interaction.current_path().len()
        ),
    };

    egui::TopBottomPanel::top("mode_hint")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(theme::ui::PANEL_BACKGROUND),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.label(
                egui::RichText::new(hint)
                    .color(theme::ui::HINT_TEXT)
                    .size(11.0),
            );
        });
    Ok(())
}
