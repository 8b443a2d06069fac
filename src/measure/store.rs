//! The authoritative collection of asphalt areas and the current selection.
//!
//! All mutation goes through [`AreaStore`] methods. Subscribers registered with
//! [`AreaStore::subscribe`] are called synchronously after each mutation so any UI layer
//! can redraw on change.

use bevy::prelude::*;

use super::area::{AsphaltArea, MIN_POLYGON_POINTS};
use super::detector::DetectedArea;

/// Change notification emitted by the store after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaStoreEvent {
    /// A batch of areas was appended (detector results).
    Inserted { ids: Vec<String> },
    /// A hand-drawn polygon was committed.
    Committed { id: String },
    /// An existing area's vertices changed.
    Updated { id: String },
    SelectionChanged { selected: Option<String> },
    PciScored { id: String, score: f32 },
}

/// Handle returned by [`AreaStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&AreaStoreEvent) + Send + Sync>;

#[derive(Resource, Default)]
pub struct AreaStore {
    areas: Vec<AsphaltArea>,
    selected_area_id: Option<String>,
    next_detected_id: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl AreaStore {
    pub fn subscribe(
        &mut self,
        callback: impl Fn(&AreaStoreEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
    }

    fn notify(&self, event: AreaStoreEvent) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&event);
        }
    }

    pub fn areas(&self) -> &[AsphaltArea] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AsphaltArea> {
        self.areas.iter().find(|a| a.id() == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn selected_area_id(&self) -> Option<&str> {
        self.selected_area_id.as_deref()
    }

    pub fn selected(&self) -> Option<&AsphaltArea> {
        self.selected_area_id.as_deref().and_then(|id| self.get(id))
    }

    /// Sum of all stored areas.
    pub fn total_area(&self) -> f32 {
        self.areas.iter().map(AsphaltArea::area).sum()
    }

    /// Append a batch of areas.
    ///
    /// Areas with fewer than three vertices or an id already in the store are skipped.
    /// Returns the ids that were actually inserted.
    pub fn insert_batch(&mut self, areas: Vec<AsphaltArea>) -> Vec<String> {
        let mut inserted = Vec::with_capacity(areas.len());
        for area in areas {
            if !area.is_complete() {
                warn!(
                    "Skipping area {} with only {} vertices",
                    area.id(),
                    area.coordinates().len()
                );
                continue;
            }
            if self.contains(area.id()) {
                warn!("Skipping area with duplicate id {}", area.id());
                continue;
            }
            inserted.push(area.id().to_string());
            self.areas.push(area);
        }

        if !inserted.is_empty() {
            debug!("Inserted {} areas", inserted.len());
            self.notify(AreaStoreEvent::Inserted {
                ids: inserted.clone(),
            });
        }
        inserted
    }

    /// Assign store-unique numeric ids to detector candidates and insert them.
    pub fn insert_detections(&mut self, candidates: Vec<DetectedArea>) -> Vec<String> {
        let areas = candidates
            .into_iter()
            .filter(|c| {
                let complete = c.coordinates.len() >= MIN_POLYGON_POINTS;
                if !complete {
                    warn!("Dropping detection with only {} vertices", c.coordinates.len());
                }
                complete
            })
            .map(|c| {
                let id = self.fresh_detected_id();
                AsphaltArea::detected(id, c.coordinates, c.confidence)
            })
            .collect();
        self.insert_batch(areas)
    }

    fn fresh_detected_id(&mut self) -> String {
        loop {
            self.next_detected_id += 1;
            let id = self.next_detected_id.to_string();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    fn fresh_manual_id(&self) -> String {
        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let id = format!("manual-{}", stamp);
            if !self.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }

    /// Commit a finished draw as a new, selected area.
    ///
    /// Fewer than three points is silently discarded and returns `None`.
    pub fn commit_drawn_polygon(&mut self, points: &[Vec2]) -> Option<String> {
        if points.len() < MIN_POLYGON_POINTS {
            debug!("Discarding draw with {} points", points.len());
            return None;
        }

        let id = self.fresh_manual_id();
        let area = AsphaltArea::drawn(id.clone(), points.to_vec());
        info!("Committed drawn area {} ({:.1} sq px)", id, area.area());
        self.areas.push(area);
        self.notify(AreaStoreEvent::Committed { id: id.clone() });
        self.select(&id);
        Some(id)
    }

    /// Select an area by id. Unknown ids are ignored and return `false`.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selected_area_id = Some(id.to_string());
        self.notify(AreaStoreEvent::SelectionChanged {
            selected: self.selected_area_id.clone(),
        });
        true
    }

    pub fn deselect(&mut self) {
        if self.selected_area_id.take().is_some() {
            self.notify(AreaStoreEvent::SelectionChanged { selected: None });
        }
    }

    /// First area in store order containing `point`.
    ///
    /// Overlapping polygons resolve to the earliest inserted, not the topmost drawn.
    pub fn find_containing(&self, point: Vec2) -> Option<&AsphaltArea> {
        self.areas
            .iter()
            .find(|a| super::geometry::point_in_polygon(point, a.coordinates()))
    }

    /// Move one vertex of an area and recompute its measurements.
    ///
    /// Unknown ids and out-of-range indices are no-ops returning `false`.
    pub fn move_vertex(&mut self, id: &str, index: usize, point: Vec2) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        if !area.set_vertex(index, point) {
            return false;
        }
        self.notify(AreaStoreEvent::Updated { id: id.to_string() });
        true
    }

    /// Record an externally computed Pavement Condition Index for an area.
    pub fn set_pci_score(&mut self, id: &str, score: f32) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        area.set_pci_score(score);
        let score = area.pci_score().unwrap_or(score);
        self.notify(AreaStoreEvent::PciScored {
            id: id.to_string(),
            score,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::geometry::{bounding_box, polygon_area};
    use std::sync::{Arc, Mutex};

    fn square(origin: Vec2, side: f32) -> Vec<Vec2> {
        vec![
            origin,
            origin + Vec2::new(side, 0.0),
            origin + Vec2::new(side, side),
            origin + Vec2::new(0.0, side),
        ]
    }

    fn recording_store() -> (AreaStore, Arc<Mutex<Vec<AreaStoreEvent>>>) {
        let mut store = AreaStore::default();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        (store, events)
    }

    #[test]
    fn test_commit_triangle_derives_fields() {
        let mut store = AreaStore::default();
        let triangle = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)];
        let id = store.commit_drawn_polygon(&triangle).unwrap();

        let area = store.get(&id).unwrap();
        assert_eq!(area.area(), 6.0);
        assert_eq!(area.length(), 4.0);
        assert_eq!(area.width(), 3.0);

        // Re-deriving from stored coordinates gives the same values
        assert_eq!(polygon_area(area.coordinates()), area.area());
        let bbox = bounding_box(area.coordinates());
        assert_eq!(bbox.width, area.length());
        assert_eq!(bbox.height, area.width());
    }

    #[test]
    fn test_commit_selects_and_marks_manual() {
        let mut store = AreaStore::default();
        let id = store.commit_drawn_polygon(&square(Vec2::ZERO, 5.0)).unwrap();
        assert!(id.starts_with("manual-"));
        assert_eq!(store.selected_area_id(), Some(id.as_str()));
        assert!(store.selected().unwrap().manually_edited());
    }

    #[test]
    fn test_commit_rejects_two_points() {
        let (mut store, events) = recording_store();
        let existing = store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0)).unwrap();
        events.lock().unwrap().clear();

        assert!(store
            .commit_drawn_polygon(&[Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)])
            .is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected_area_id(), Some(existing.as_str()));
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_manual_ids_are_unique() {
        let mut store = AreaStore::default();
        let a = store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0)).unwrap();
        let b = store.commit_drawn_polygon(&square(Vec2::ZERO, 2.0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_select_unknown_id_is_noop() {
        let mut store = AreaStore::default();
        let id = store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0)).unwrap();
        assert!(!store.select("missing"));
        assert_eq!(store.selected_area_id(), Some(id.as_str()));
    }

    #[test]
    fn test_deselect() {
        let (mut store, events) = recording_store();
        store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0));
        store.deselect();
        assert!(store.selected_area_id().is_none());
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&AreaStoreEvent::SelectionChanged { selected: None })
        );
    }

    #[test]
    fn test_insert_detections_assigns_numeric_ids() {
        let mut store = AreaStore::default();
        let ids = store.insert_detections(vec![
            DetectedArea::new(square(Vec2::ZERO, 10.0), 0.9),
            DetectedArea::new(square(Vec2::new(20.0, 0.0), 10.0), 0.7),
        ]);
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);

        // A second batch continues the sequence
        let more = store.insert_detections(vec![DetectedArea::new(square(Vec2::ZERO, 3.0), 0.6)]);
        assert_eq!(more, vec!["3".to_string()]);
        assert!(!store.get("1").unwrap().manually_edited());
    }

    #[test]
    fn test_insert_batch_skips_incomplete_and_duplicates() {
        let (mut store, events) = recording_store();
        let inserted = store.insert_batch(vec![
            AsphaltArea::detected("a", square(Vec2::ZERO, 1.0), 0.5),
            AsphaltArea::detected("b", vec![Vec2::ZERO, Vec2::ONE], 0.5),
            AsphaltArea::detected("a", square(Vec2::ONE, 1.0), 0.5),
        ]);
        assert_eq!(inserted, vec!["a".to_string()]);
        assert_eq!(store.len(), 1);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[AreaStoreEvent::Inserted {
                ids: vec!["a".to_string()]
            }]
        );
    }

    #[test]
    fn test_find_containing_prefers_store_order() {
        let mut store = AreaStore::default();
        store.insert_batch(vec![
            AsphaltArea::detected("big", square(Vec2::ZERO, 100.0), 0.9),
            AsphaltArea::detected("small", square(Vec2::new(10.0, 10.0), 5.0), 0.9),
        ]);
        // The point is inside both; the first inserted wins
        let hit = store.find_containing(Vec2::new(12.0, 12.0)).unwrap();
        assert_eq!(hit.id(), "big");
        assert!(store.find_containing(Vec2::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_move_vertex_recomputes_and_flags() {
        let (mut store, events) = recording_store();
        store.insert_batch(vec![AsphaltArea::detected(
            "1",
            square(Vec2::ZERO, 10.0),
            0.9,
        )]);
        assert_eq!(store.get("1").unwrap().area(), 100.0);
        assert!(!store.get("1").unwrap().manually_edited());

        // Drag the top-right corner so the shape becomes a trapezoid
        assert!(store.move_vertex("1", 2, Vec2::new(20.0, 10.0)));
        let area = store.get("1").unwrap();
        assert_eq!(area.area(), 150.0);
        assert_eq!(area.length(), 20.0);
        assert!(area.manually_edited());
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&AreaStoreEvent::Updated { id: "1".to_string() })
        );
    }

    #[test]
    fn test_move_vertex_invalid_reference() {
        let mut store = AreaStore::default();
        store.insert_batch(vec![AsphaltArea::detected(
            "1",
            square(Vec2::ZERO, 10.0),
            0.9,
        )]);
        assert!(!store.move_vertex("1", 9, Vec2::ZERO));
        assert!(!store.move_vertex("nope", 0, Vec2::ZERO));
        assert_eq!(store.get("1").unwrap().area(), 100.0);
    }

    #[test]
    fn test_set_pci_score() {
        let mut store = AreaStore::default();
        let id = store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0)).unwrap();
        assert!(store.set_pci_score(&id, 82.0));
        assert_eq!(store.get(&id).unwrap().pci_score(), Some(82.0));
        assert!(!store.set_pci_score("missing", 50.0));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = AreaStore::default();
        let events = Arc::new(Mutex::new(0usize));
        let sink = events.clone();
        let sub = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.commit_drawn_polygon(&square(Vec2::ZERO, 1.0));
        let seen = *events.lock().unwrap();
        assert!(seen > 0);

        store.unsubscribe(sub);
        store.commit_drawn_polygon(&square(Vec2::ZERO, 2.0));
        assert_eq!(*events.lock().unwrap(), seen);
    }

    #[test]
    fn test_total_area() {
        let mut store = AreaStore::default();
        store.commit_drawn_polygon(&square(Vec2::ZERO, 10.0));
        store.commit_drawn_polygon(&square(Vec2::ZERO, 2.0));
        assert_eq!(store.total_area(), 104.0);
    }
}
