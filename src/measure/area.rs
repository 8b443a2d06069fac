//! The `AsphaltArea` entity: a paved-surface polygon and its derived measurements.

use bevy::math::Vec2;

use super::geometry::{bounding_box, perimeter, polygon_area};

/// Minimum vertex count for a polygon to be stored.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A detected or hand-drawn paved surface.
///
/// `area`, `length`, `width` and `perimeter` are derived from `coordinates` and are only
/// ever recomputed, never set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AsphaltArea {
    id: String,
    coordinates: Vec<Vec2>,
    area: f32,
    length: f32,
    width: f32,
    perimeter: f32,
    confidence: Option<f32>,
    manually_edited: bool,
    pci_score: Option<f32>,
}

impl AsphaltArea {
    fn new(id: String, coordinates: Vec<Vec2>) -> Self {
        let mut area = Self {
            id,
            coordinates,
            area: 0.0,
            length: 0.0,
            width: 0.0,
            perimeter: 0.0,
            confidence: None,
            manually_edited: false,
            pci_score: None,
        };
        area.recompute();
        area
    }

    /// An area proposed by a detector, scored with `confidence` (clamped to [0, 1]).
    pub fn detected(id: impl Into<String>, coordinates: Vec<Vec2>, confidence: f32) -> Self {
        let mut area = Self::new(id.into(), coordinates);
        area.confidence = Some(confidence.clamp(0.0, 1.0));
        area
    }

    /// An area traced by hand. Always marked as manually edited.
    pub fn drawn(id: impl Into<String>, coordinates: Vec<Vec2>) -> Self {
        let mut area = Self::new(id.into(), coordinates);
        area.manually_edited = true;
        area
    }

    fn recompute(&mut self) {
        let bbox = bounding_box(&self.coordinates);
        self.area = polygon_area(&self.coordinates);
        self.length = bbox.width;
        self.width = bbox.height;
        self.perimeter = perimeter(&self.coordinates);
    }

    /// Move vertex `index` to `point` and refresh the measurements.
    ///
    /// Returns `false` (and changes nothing) when `index` is out of range.
    pub fn set_vertex(&mut self, index: usize, point: Vec2) -> bool {
        let Some(vertex) = self.coordinates.get_mut(index) else {
            return false;
        };
        *vertex = point;
        self.manually_edited = true;
        self.recompute();
        true
    }

    pub fn set_pci_score(&mut self, score: f32) {
        self.pci_score = Some(score.clamp(0.0, 100.0));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn coordinates(&self) -> &[Vec2] {
        &self.coordinates
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    /// Horizontal extent of the bounding box.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Vertical extent of the bounding box.
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn perimeter(&self) -> f32 {
        self.perimeter
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    pub fn manually_edited(&self) -> bool {
        self.manually_edited
    }

    pub fn pci_score(&self) -> Option<f32> {
        self.pci_score
    }

    pub fn pci_rating(&self) -> Option<PciRating> {
        self.pci_score.map(PciRating::from_score)
    }

    pub fn is_complete(&self) -> bool {
        self.coordinates.len() >= MIN_POLYGON_POINTS
    }
}

/// Pavement Condition Index band used for the color overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciRating {
    Good,
    Fair,
    Poor,
}

impl PciRating {
    pub fn from_score(score: f32) -> Self {
        if score >= 70.0 {
            PciRating::Good
        } else if score >= 40.0 {
            PciRating::Fair
        } else {
            PciRating::Poor
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PciRating::Good => "Good",
            PciRating::Fair => "Fair",
            PciRating::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(side, 0.0),
            Vec2::new(side, side),
            Vec2::new(0.0, side),
        ]
    }

    #[test]
    fn test_detected_area_measurements() {
        let area = AsphaltArea::detected("1", square(10.0), 0.9);
        assert_eq!(area.id(), "1");
        assert_eq!(area.area(), 100.0);
        assert_eq!(area.length(), 10.0);
        assert_eq!(area.width(), 10.0);
        assert_eq!(area.perimeter(), 40.0);
        assert_eq!(area.confidence(), Some(0.9));
        assert!(!area.manually_edited());
        assert!(area.pci_score().is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(AsphaltArea::detected("1", square(1.0), 1.5).confidence(), Some(1.0));
        assert_eq!(AsphaltArea::detected("2", square(1.0), -0.2).confidence(), Some(0.0));
    }

    #[test]
    fn test_drawn_area_is_manually_edited() {
        let area = AsphaltArea::drawn("manual-1", square(2.0));
        assert!(area.manually_edited());
        assert!(area.confidence().is_none());
    }

    #[test]
    fn test_set_vertex_recomputes() {
        let mut area = AsphaltArea::detected("1", square(10.0), 0.8);
        // Stretch the right side to x = 20
        assert!(area.set_vertex(1, Vec2::new(20.0, 0.0)));
        assert!(area.set_vertex(2, Vec2::new(20.0, 10.0)));
        assert_eq!(area.area(), 200.0);
        assert_eq!(area.length(), 20.0);
        assert!(area.manually_edited());
    }

    #[test]
    fn test_set_vertex_out_of_range() {
        let mut area = AsphaltArea::detected("1", square(10.0), 0.8);
        let before = area.clone();
        assert!(!area.set_vertex(4, Vec2::new(50.0, 50.0)));
        assert_eq!(area, before);
    }

    #[test]
    fn test_pci_score_clamped_and_rated() {
        let mut area = AsphaltArea::drawn("manual-1", square(1.0));
        area.set_pci_score(120.0);
        assert_eq!(area.pci_score(), Some(100.0));
        assert_eq!(area.pci_rating(), Some(PciRating::Good));

        area.set_pci_score(55.0);
        assert_eq!(area.pci_rating(), Some(PciRating::Fair));

        area.set_pci_score(-3.0);
        assert_eq!(area.pci_score(), Some(0.0));
        assert_eq!(area.pci_rating(), Some(PciRating::Poor));
    }
}
