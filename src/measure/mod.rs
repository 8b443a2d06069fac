//! Area detection and measurement engine.
//!
//! Everything here is plain data and functions; the editor plugin wires it into Bevy.
//!
//! ## Module Structure
//!
//! - [`geometry`] - Polygon area, containment, bounds, centroid
//! - [`area`] - The `AsphaltArea` entity and its derived measurements
//! - [`store`] - The authoritative area collection, selection and change events
//! - [`interaction`] - Select/edit/draw state machine driven by pointer events
//! - [`detector`] - Async detector boundary (stub and HTTP model server)
//! - [`projector`] - Store + interaction state to draw instructions
//! - [`export`] - Measurement and GeoJSON export for the estimator

pub mod area;
pub mod detector;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod projector;
pub mod store;

pub use area::{AsphaltArea, PciRating, MIN_POLYGON_POINTS};
pub use detector::{AreaDetector, DetectedArea, DetectionError, HttpDetector, StubDetector};
pub use export::{geojson_string, write_geojson, ExportError, MeasurementExport};
pub use interaction::{EditorMode, InteractionState, PointerOutcome};
pub use projector::{project, DrawInstruction, ProjectionStyle};
pub use store::{AreaStore, AreaStoreEvent};
