//! Render projector: turns the store and interaction state into draw instructions.
//!
//! [`project`] is pure. Identical inputs always produce identical instruction lists, so
//! hosts can simply redraw everything whenever either input changes.

use bevy::prelude::*;

use super::area::{AsphaltArea, PciRating};
use super::geometry::centroid;
use super::interaction::{EditorMode, InteractionState};
use super::store::AreaStore;
use crate::theme;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    FillPolygon {
        points: Vec<Vec2>,
        color: Color,
    },
    StrokePolygon {
        points: Vec<Vec2>,
        color: Color,
        width: f32,
        /// Whether the last point connects back to the first.
        closed: bool,
    },
    VertexMarker {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Label {
        position: Vec2,
        text: String,
        color: Color,
    },
}

/// Colors and sizes used by [`project`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub selected_fill: Color,
    pub selected_stroke: Color,
    pub selected_stroke_width: f32,
    pub vertex_color: Color,
    pub vertex_radius: f32,
    pub draw_path: Color,
    pub label: Color,
}

impl Default for ProjectionStyle {
    fn default() -> Self {
        Self {
            fill: theme::AREA_FILL,
            stroke: theme::AREA_STROKE,
            stroke_width: 2.0,
            selected_fill: theme::SELECTED_AREA_FILL,
            selected_stroke: theme::SELECTION_COLOR,
            selected_stroke_width: 3.0,
            vertex_color: theme::VERTEX_HANDLE,
            vertex_radius: crate::constants::VERTEX_HANDLE_RADIUS,
            draw_path: theme::DRAW_PATH,
            label: theme::AREA_LABEL,
        }
    }
}

/// Overlay fill for a PCI band.
pub fn pci_fill(rating: PciRating) -> Color {
    match rating {
        PciRating::Good => theme::PCI_GOOD,
        PciRating::Fair => theme::PCI_FAIR,
        PciRating::Poor => theme::PCI_POOR,
    }
}

fn area_label(area: &AsphaltArea) -> String {
    match area.pci_score() {
        Some(score) => format!("{:.0} sq px\nPCI {:.0}", area.area(), score),
        None => format!("{:.0} sq px", area.area()),
    }
}

/// Build the full instruction list for one frame.
pub fn project(
    store: &AreaStore,
    interaction: &InteractionState,
    style: &ProjectionStyle,
) -> Vec<DrawInstruction> {
    let mut out = Vec::new();
    let selected_id = store.selected_area_id();

    for area in store.areas() {
        let is_selected = selected_id == Some(area.id());
        let points = area.coordinates().to_vec();

        let fill = match (is_selected, area.pci_rating()) {
            (true, _) => style.selected_fill,
            (false, Some(rating)) => pci_fill(rating),
            (false, None) => style.fill,
        };
        out.push(DrawInstruction::FillPolygon {
            points: points.clone(),
            color: fill,
        });

        let (stroke, width) = if is_selected {
            (style.selected_stroke, style.selected_stroke_width)
        } else {
            (style.stroke, style.stroke_width)
        };
        out.push(DrawInstruction::StrokePolygon {
            points,
            color: stroke,
            width,
            closed: true,
        });

        if let Some(position) = centroid(area.coordinates()) {
            out.push(DrawInstruction::Label {
                position,
                text: area_label(area),
                color: style.label,
            });
        }

        if is_selected && interaction.mode() == EditorMode::Edit {
            out.extend(area.coordinates().iter().map(|&center| {
                DrawInstruction::VertexMarker {
                    center,
                    radius: style.vertex_radius,
                    color: style.vertex_color,
                }
            }));
        }
    }

    if interaction.mode() == EditorMode::Draw && !interaction.current_path().is_empty() {
        let path = interaction.current_path();
        if path.len() >= 2 {
            out.push(DrawInstruction::StrokePolygon {
                points: path.to_vec(),
                color: style.draw_path,
                width: style.stroke_width,
                closed: false,
            });
        }
        out.extend(path.iter().map(|&center| DrawInstruction::VertexMarker {
            center,
            radius: style.vertex_radius,
            color: style.draw_path,
        }));
    }

    out
}
