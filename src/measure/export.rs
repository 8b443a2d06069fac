//! Export boundary towards the estimate/invoice system.
//!
//! Two shapes leave the engine: a bare `{area, length, width}` measurement (handed over as
//! JSON or URL parameters) and a GeoJSON `FeatureCollection` for files. GeoJSON rings are
//! written exactly as stored: the first vertex is not repeated at the end.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;

use super::area::AsphaltArea;

/// Measurements consumed by the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementExport {
    pub area: f32,
    pub length: f32,
    pub width: f32,
}

impl From<&AsphaltArea> for MeasurementExport {
    fn from(area: &AsphaltArea) -> Self {
        Self {
            area: area.area(),
            length: area.length(),
            width: area.width(),
        }
    }
}

impl MeasurementExport {
    /// `area=..&length=..&width=..` with two decimals.
    pub fn to_query_string(&self) -> String {
        format!(
            "area={:.2}&length={:.2}&width={:.2}",
            self.area, self.length, self.width
        )
    }
}

#[derive(Debug)]
pub enum ExportError {
    NothingToExport,
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NothingToExport => write!(f, "No areas selected for export"),
            ExportError::Serialize(e) => write!(f, "Failed to serialize GeoJSON: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write file: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::NothingToExport => None,
            ExportError::Serialize(e) => Some(e),
            ExportError::Io(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialize(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

fn feature(area: &AsphaltArea) -> Value {
    let ring: Vec<[f32; 2]> = area.coordinates().iter().map(|p| [p.x, p.y]).collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring],
        },
        "properties": {
            "id": area.id(),
            "area": area.area(),
            "length": area.length(),
            "width": area.width(),
            "perimeter": area.perimeter(),
            "confidence": area.confidence(),
            "manuallyEdited": area.manually_edited(),
            "pciScore": area.pci_score(),
        },
    })
}

/// One `Feature` per area, in the given order.
pub fn to_geojson<'a>(areas: impl IntoIterator<Item = &'a AsphaltArea>) -> Value {
    let features: Vec<Value> = areas.into_iter().map(feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Pretty-printed GeoJSON document for `areas`.
pub fn geojson_string(areas: &[&AsphaltArea]) -> Result<String, ExportError> {
    if areas.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(serde_json::to_string_pretty(&to_geojson(
        areas.iter().copied(),
    ))?)
}

pub fn write_geojson(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn rectangle() -> AsphaltArea {
        AsphaltArea::drawn(
            "manual-1",
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(100.0, 0.0),
                Vec2::new(100.0, 50.0),
                Vec2::new(0.0, 50.0),
            ],
        )
    }

    #[test]
    fn test_measurement_export() {
        let export = MeasurementExport::from(&rectangle());
        assert_eq!(
            export,
            MeasurementExport {
                area: 5000.0,
                length: 100.0,
                width: 50.0
            }
        );
        let json = serde_json::to_value(export).unwrap();
        assert_eq!(json, json!({"area": 5000.0, "length": 100.0, "width": 50.0}));
    }

    #[test]
    fn test_query_string() {
        let export = MeasurementExport::from(&rectangle());
        assert_eq!(
            export.to_query_string(),
            "area=5000.00&length=100.00&width=50.00"
        );
    }

    #[test]
    fn test_geojson_ring_is_not_closed() {
        let area = rectangle();
        let doc = to_geojson([&area]);

        assert_eq!(doc["type"], "FeatureCollection");
        let features = doc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);

        let geometry = &features[0]["geometry"];
        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 4);
        assert_ne!(ring.first(), ring.last());
        assert_eq!(ring[2], json!([100.0, 50.0]));
    }

    #[test]
    fn test_geojson_properties() {
        let mut area = AsphaltArea::detected(
            "7",
            vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)],
            0.75,
        );
        area.set_pci_score(64.0);
        let doc = to_geojson([&area]);
        let props = &doc["features"][0]["properties"];

        assert_eq!(props["id"], "7");
        assert_eq!(props["area"], 6.0);
        assert_eq!(props["confidence"], 0.75);
        assert_eq!(props["manuallyEdited"], false);
        assert_eq!(props["pciScore"], 64.0);
    }

    #[test]
    fn test_geojson_string_requires_areas() {
        assert!(matches!(
            geojson_string(&[]),
            Err(ExportError::NothingToExport)
        ));
        let area = rectangle();
        let text = geojson_string(&[&area]).unwrap();
        assert!(text.contains("FeatureCollection"));
    }
}
