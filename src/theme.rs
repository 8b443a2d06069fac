//! Centralized color theme for the application.
//!
//! This module provides all colors used by the canvas renderer and the egui panels.
//! Modify values here to change the application's color scheme.

use bevy::prelude::{Alpha, Color};
use bevy_egui::egui;

// ============================================================================
// Area Colors
// ============================================================================

/// Translucent asphalt grey fill for unscored areas
pub const AREA_FILL: Color = Color::srgba(0.35, 0.35, 0.4, 0.35);

/// Outline for unselected areas
pub const AREA_STROKE: Color = Color::srgba(0.9, 0.9, 0.95, 0.9);

/// Fill for the selected area
pub const SELECTED_AREA_FILL: Color = Color::srgba(0.2, 0.6, 1.0, 0.3);

/// Light blue for the selected outline
pub const SELECTION_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

/// Vertex handles shown while editing
pub const VERTEX_HANDLE: Color = Color::srgb(1.0, 1.0, 1.0);

/// Measurement labels
pub const AREA_LABEL: Color = Color::WHITE;

/// In-progress draw path and its vertices
pub const DRAW_PATH: Color = Color::srgb(1.0, 0.7, 0.2);

// ============================================================================
// Pavement Condition Overlay
// ============================================================================

pub const PCI_GOOD: Color = Color::srgba(0.2, 0.8, 0.3, 0.4);

pub const PCI_FAIR: Color = Color::srgba(1.0, 0.8, 0.1, 0.4);

pub const PCI_POOR: Color = Color::srgba(0.9, 0.2, 0.2, 0.4);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tool settings bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::RED;

    /// Amber "detecting" indicator
    pub const DETECTING: egui::Color32 = egui::Color32::from_rgb(255, 180, 60);

    /// Marker for areas the user has touched
    pub const EDITED_BADGE: egui::Color32 = egui::Color32::from_rgb(120, 180, 255);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a Bevy Color to egui Color32 (preserving alpha)
pub fn bevy_to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

/// Convert a Bevy Color to egui Color32 (fully opaque)
pub fn bevy_to_egui_opaque(color: Color) -> egui::Color32 {
    bevy_to_egui(color.with_alpha(1.0))
}
