//! Canvas rendering: replays the projector's draw instructions with gizmos and egui.
//!
//! The instruction list is rebuilt only when the store or interaction state changes;
//! gizmos are immediate mode, so the cached list is replayed every frame.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::constants::FILL_SPACING;
use crate::measure::geometry::scanline_spans;
use crate::measure::{project, AreaStore, DrawInstruction, InteractionState, ProjectionStyle};
use crate::theme;

use super::params::CameraParams;

/// Gizmo group for fills and regular outlines
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct AreaGizmoGroup;

/// Gizmo group for the selected outline, vertex handles and the draw path
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct HighlightGizmoGroup;

const AREA_LINE_WIDTH: f32 = 2.0;

pub fn configure_area_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (area_config, _) = config_store.config_mut::<AreaGizmoGroup>();
    area_config.line.width = AREA_LINE_WIDTH;

    let (highlight_config, _) = config_store.config_mut::<HighlightGizmoGroup>();
    highlight_config.line.width = 3.0;
}

/// Latest projection of the store, replayed every frame
#[derive(Resource, Default)]
pub struct AreaProjection {
    pub instructions: Vec<DrawInstruction>,
    pub style: ProjectionStyle,
}

pub fn update_projection(
    store: Res<AreaStore>,
    interaction: Res<InteractionState>,
    mut projection: ResMut<AreaProjection>,
) {
    if !store.is_changed() && !interaction.is_changed() && !projection.is_added() {
        return;
    }
    let instructions = project(&store, &interaction, &projection.style);
    projection.instructions = instructions;
}

fn draw_outline<G: GizmoConfigGroup>(
    gizmos: &mut Gizmos<G>,
    points: &[Vec2],
    color: Color,
    closed: bool,
) {
    for window in points.windows(2) {
        gizmos.line_2d(window[0], window[1], color);
    }
    if closed
        && points.len() > 2
        && let (Some(&first), Some(&last)) = (points.first(), points.last())
    {
        gizmos.line_2d(last, first, color);
    }
}

pub fn draw_projection(
    mut gizmos: Gizmos<AreaGizmoGroup>,
    mut highlight: Gizmos<HighlightGizmoGroup>,
    projection: Res<AreaProjection>,
    camera: CameraParams,
) {
    let zoom = camera.zoom_scale();

    for instruction in &projection.instructions {
        match instruction {
            DrawInstruction::FillPolygon { points, color } => {
                for (start, end) in scanline_spans(points, FILL_SPACING * zoom) {
                    gizmos.line_2d(start, end, *color);
                }
            }
            DrawInstruction::StrokePolygon {
                points,
                color,
                width,
                closed,
            } => {
                if *width > AREA_LINE_WIDTH {
                    draw_outline(&mut highlight, points, *color, *closed);
                } else {
                    draw_outline(&mut gizmos, points, *color, *closed);
                }
            }
            DrawInstruction::VertexMarker {
                center,
                radius,
                color,
            } => {
                highlight.circle_2d(Isometry2d::from_translation(*center), radius * zoom, *color);
            }
            DrawInstruction::Label { .. } => {}
        }
    }
}

/// Render measurement labels using egui, anchored at each area's centroid
pub fn draw_labels(
    mut contexts: EguiContexts,
    projection: Res<AreaProjection>,
    camera: CameraParams,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let labels = projection.instructions.iter().filter_map(|i| match i {
        DrawInstruction::Label {
            position,
            text,
            color,
        } => Some((position, text, color)),
        _ => None,
    });

    for (index, (position, text, color)) in labels.enumerate() {
        let Some(screen_pos) = camera.world_to_viewport(*position) else {
            continue;
        };

        egui::Area::new(egui::Id::new(("area_label", index)))
            .fixed_pos(egui::pos2(screen_pos.x, screen_pos.y))
            .pivot(egui::Align2::CENTER_CENTER)
            .interactable(false)
            .order(egui::Order::Background)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(text)
                        .color(theme::bevy_to_egui(*color))
                        .size(13.0)
                        .strong(),
                );
            });
    }
}
