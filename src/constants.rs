//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Radius of vertex handles at zoom 1.0 (canvas units)
pub const VERTEX_HANDLE_RADIUS: f32 = 5.0;

/// Pointer distance within which a vertex handle is grabbed, at zoom 1.0
pub const VERTEX_HIT_RADIUS: f32 = 10.0;

/// Distance between fill scanlines (canvas units)
pub const FILL_SPACING: f32 = 3.0;

/// Default minimum detector confidence
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Default deadline for a detection run
pub const DEFAULT_DETECTION_TIMEOUT_SECS: u64 = 30;
