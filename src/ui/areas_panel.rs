//! Right-hand panel listing every area with the selected area's measurements.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::editor::{ExportGeoJsonRequest, ExportScope};
use crate::measure::projector::pci_fill;
use crate::measure::{AreaStore, AsphaltArea, MeasurementExport};
use crate::theme;

fn list_label(area: &AsphaltArea) -> String {
    match area.confidence() {
        Some(confidence) => format!(
            "Area {}: {:.0} sq px ({:.0}%)",
            area.id(),
            area.area(),
            confidence * 100.0
        ),
        None => format!("Area {}: {:.0} sq px", area.id(), area.area()),
    }
}

fn measurement_row(ui: &mut egui::Ui, name: &str, value: String) {
    ui.label(egui::RichText::new(name).color(theme::ui::LABEL_TEXT));
    ui.label(value);
    ui.end_row();
}

fn selected_details(
    ui: &mut egui::Ui,
    area: &AsphaltArea,
    pci_edit: &mut Option<(String, f32)>,
) {
    egui::Grid::new("selected_area_metrics")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            measurement_row(ui, "Area", format!("{:.2} sq px", area.area()));
            measurement_row(ui, "Length", format!("{:.2} px", area.length()));
            measurement_row(ui, "Width", format!("{:.2} px", area.width()));
            measurement_row(ui, "Perimeter", format!("{:.2} px", area.perimeter()));
            measurement_row(
                ui,
                "Confidence",
                area.confidence()
                    .map(|c| format!("{:.0}%", c * 100.0))
                    .unwrap_or_else(|| "Drawn".to_string()),
            );

            ui.label(egui::RichText::new("PCI").color(theme::ui::LABEL_TEXT));
            ui.horizontal(|ui| {
                let mut score = area.pci_score().unwrap_or(0.0);
                let response = ui.add(
                    egui::DragValue::new(&mut score)
                        .range(0.0..=100.0)
                        .speed(1.0)
                        .fixed_decimals(0),
                );
                if response.changed() {
                    *pci_edit = Some((area.id().to_string(), score));
                }
                match area.pci_rating() {
                    Some(rating) => ui.colored_label(
                        theme::bevy_to_egui_opaque(pci_fill(rating)),
                        rating.display_name(),
                    ),
                    None => ui.label(egui::RichText::new("Not scored").weak().italics()),
                };
            });
            ui.end_row();
        });

    if area.manually_edited() {
        ui.add_space(4.0);
        ui.colored_label(theme::ui::EDITED_BADGE, "Manually edited");
    }
}

pub fn areas_panel_ui(
    mut contexts: EguiContexts,
    mut store: ResMut<AreaStore>,
    mut export_events: MessageWriter<ExportGeoJsonRequest>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let mut clicked: Option<String> = None;
    let mut pci_edit: Option<(String, f32)> = None;

    egui::SidePanel::right("areas_panel")
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Areas").heading().size(18.0));
            ui.label(
                egui::RichText::new(format!(
                    "{} areas, {:.0} sq px total",
                    store.len(),
                    store.total_area()
                ))
                .color(theme::ui::HINT_TEXT)
                .size(11.0),
            );
            ui.add_space(4.0);
            ui.separator();

            if store.is_empty() {
                ui.label(
                    egui::RichText::new("Run detection or draw an area to get started")
                        .color(theme::ui::HINT_TEXT)
                        .italics(),
                );
            }

            egui::ScrollArea::vertical()
                .max_height(260.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for area in store.areas() {
                        let is_selected = store.selected_area_id() == Some(area.id());
                        ui.horizontal(|ui| {
                            if ui.selectable_label(is_selected, list_label(area)).clicked() {
                                clicked = Some(area.id().to_string());
                            }
                            if area.manually_edited() {
                                ui.colored_label(theme::ui::EDITED_BADGE, "✎");
                            }
                        });
                    }
                });

            ui.separator();

            match store.selected() {
                Some(area) => {
                    ui.label(
                        egui::RichText::new(format!("Area {}", area.id()))
                            .strong()
                            .size(15.0),
                    );
                    ui.add_space(4.0);
                    selected_details(ui, area, &mut pci_edit);
                    ui.add_space(8.0);

                    ui.horizontal(|ui| {
                        if ui
                            .button("Copy Estimate Params")
                            .on_hover_text("Copy area, length and width as a query string")
                            .clicked()
                        {
                            let query = MeasurementExport::from(area).to_query_string();
                            ui.ctx().copy_text(query);
                        }
                        if ui.button("Export GeoJSON...").clicked() {
                            export_events.write(ExportGeoJsonRequest {
                                scope: ExportScope::Selected,
                            });
                        }
                    });
                }
                None => {
                    ui.label(
                        egui::RichText::new("Click an area to see its measurements")
                            .color(theme::ui::HINT_TEXT),
                    );
                }
            }

            ui.add_space(8.0);
            if ui
                .add_enabled(!store.is_empty(), egui::Button::new("Export All"))
                .clicked()
            {
                export_events.write(ExportGeoJsonRequest {
                    scope: ExportScope::All,
                });
            }
        });

    if let Some(id) = clicked {
        store.select(&id);
    }
    if let Some((id, score)) = pci_edit {
        store.set_pci_score(&id, score);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn test_list_label_shows_confidence_for_detected() {
        let triangle = vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)];
        let detected = AsphaltArea::detected("7", triangle.clone(), 0.9);
        assert_eq!(list_label(&detected), "Area 7: 6 sq px (90%)");

        let drawn = AsphaltArea::drawn("manual-1", triangle);
        assert_eq!(list_label(&drawn), "Area manual-1: 6 sq px");
    }
}
