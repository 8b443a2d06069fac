//! Runs the area detector in the background and merges finished batches into the store.
//!
//! Each request spawns a [`DetectionTask`] entity on the async compute pool. Tasks are
//! polled every frame; overlapping runs are allowed and each batch is inserted whenever it
//! resolves. A failed or timed-out run leaves the store untouched.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::measure::{
    AreaDetector, AreaStore, DetectedArea, DetectionError, HttpDetector, StubDetector,
};

/// Message to start a detection run with the configured threshold
#[derive(Message)]
pub struct RunDetectionRequest;

/// The detector used for new runs
#[derive(Resource, Clone)]
pub struct ActiveDetector(pub Arc<dyn AreaDetector>);

impl Default for ActiveDetector {
    fn default() -> Self {
        Self(Arc::new(StubDetector::default()))
    }
}

/// UI-facing detection status
#[derive(Resource, Default)]
pub struct DetectionState {
    /// Number of runs still in flight
    pub in_flight: usize,
    /// Error from the most recent failed run
    pub last_error: Option<String>,
    /// Whether to show the error dialog
    pub show_error: bool,
    /// Number of areas added by the most recent successful run
    pub last_inserted: Option<usize>,
}

impl DetectionState {
    pub fn is_detecting(&self) -> bool {
        self.in_flight > 0
    }

    /// Toolbar note for the most recent successful run, hidden while runs are in flight
    pub fn summary(&self) -> Option<String> {
        if self.is_detecting() {
            return None;
        }
        match self.last_inserted? {
            1 => Some("Added 1 area".to_string()),
            n => Some(format!("Added {} areas", n)),
        }
    }
}

/// Background detection run
#[derive(Component)]
pub struct DetectionTask {
    task: Task<Result<Vec<DetectedArea>, DetectionError>>,
    /// App time when the run started
    started: Duration,
}

/// Choose the detector from config: a model server when an endpoint is set, else the stub.
pub fn detector_from_config(config: &AppConfig) -> Arc<dyn AreaDetector> {
    match config.data.detector.endpoint.as_deref() {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            let timeout = Duration::from_secs(config.data.detector.timeout_secs);
            Arc::new(HttpDetector::new(endpoint.trim(), timeout))
        }
        _ => Arc::new(StubDetector::default()),
    }
}

/// Keep the active detector in sync with the configuration
pub fn configure_detector(config: Res<AppConfig>, mut active: ResMut<ActiveDetector>) {
    if !config.is_changed() {
        return;
    }
    let detector = detector_from_config(&config);
    if detector.name() != active.0.name() {
        info!("Using {} detector", detector.name());
    }
    active.0 = detector;
}

pub fn start_detection(
    mut commands: Commands,
    mut events: MessageReader<RunDetectionRequest>,
    detector: Res<ActiveDetector>,
    config: Res<AppConfig>,
    time: Res<Time>,
    mut state: ResMut<DetectionState>,
) {
    let threshold = config.data.detector.confidence_threshold;
    for _ in events.read() {
        info!(
            "Starting {} detection (threshold {:.2})",
            detector.0.name(),
            threshold
        );

        let task = AsyncComputeTaskPool::get().spawn(detector.0.detect(threshold));
        commands.spawn(DetectionTask {
            task,
            started: time.elapsed(),
        });
        state.in_flight += 1;
    }
}

/// Merge a finished run into the store, or record why it failed
pub fn apply_detection_result(
    result: Result<Vec<DetectedArea>, DetectionError>,
    store: &mut AreaStore,
    state: &mut DetectionState,
) {
    state.in_flight = state.in_flight.saturating_sub(1);
    match result {
        Ok(candidates) => {
            let inserted = store.insert_detections(candidates);
            info!("Detection added {} areas", inserted.len());
            state.last_inserted = Some(inserted.len());
        }
        Err(e) => {
            warn!("{}", e);
            state.last_error = Some(e.to_string());
            state.show_error = true;
        }
    }
}

pub fn poll_detection_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut DetectionTask)>,
    mut store: ResMut<AreaStore>,
    mut state: ResMut<DetectionState>,
    config: Res<AppConfig>,
    time: Res<Time>,
) {
    let timeout = Duration::from_secs(config.data.detector.timeout_secs);

    for (entity, mut detection) in tasks.iter_mut() {
        if time.elapsed().saturating_sub(detection.started) >= timeout {
            // Stop waiting; the HTTP detector's own request timeout frees the worker
            commands.entity(entity).despawn();
            apply_detection_result(
                Err(DetectionError::TimedOut(timeout)),
                &mut store,
                &mut state,
            );
            continue;
        }

        if let Some(result) = future::block_on(future::poll_once(&mut detection.task)) {
            commands.entity(entity).despawn();
            apply_detection_result(result, &mut store, &mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn triangle() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 3.0)]
    }

    #[test]
    fn test_successful_run_inserts_batch() {
        let mut store = AreaStore::default();
        let mut state = DetectionState {
            in_flight: 1,
            ..default()
        };
        apply_detection_result(
            Ok(vec![
                DetectedArea::new(triangle(), 0.9),
                DetectedArea::new(triangle(), 0.8),
            ]),
            &mut store,
            &mut state,
        );
        assert_eq!(store.len(), 2);
        assert_eq!(state.last_inserted, Some(2));
        assert!(!state.is_detecting());
        assert!(state.last_error.is_none());
        assert_eq!(state.summary().as_deref(), Some("Added 2 areas"));
    }

    #[test]
    fn test_summary_hidden_while_detecting() {
        let mut state = DetectionState::default();
        assert_eq!(state.summary(), None);

        state.last_inserted = Some(1);
        assert_eq!(state.summary().as_deref(), Some("Added 1 area"));

        state.in_flight = 1;
        assert_eq!(state.summary(), None);
    }

    #[test]
    fn test_failed_run_leaves_store_untouched() {
        let mut store = AreaStore::default();
        store.commit_drawn_polygon(&triangle());
        let mut state = DetectionState {
            in_flight: 2,
            ..default()
        };

        apply_detection_result(
            Err(DetectionError::Failed("model offline".to_string())),
            &mut store,
            &mut state,
        );
        assert_eq!(store.len(), 1);
        assert!(state.show_error);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Detection failed: model offline")
        );
        // The other run is still in flight
        assert!(state.is_detecting());
    }

    #[test]
    fn test_overlapping_runs_both_append() {
        let mut store = AreaStore::default();
        let mut state = DetectionState {
            in_flight: 2,
            ..default()
        };
        let stub = StubDetector::default();
        for _ in 0..2 {
            let batch = future::block_on(stub.detect(0.0));
            apply_detection_result(batch, &mut store, &mut state);
        }
        assert_eq!(store.len(), 6);
        let ids: Vec<&str> = store.areas().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_detector_from_config() {
        let mut config = AppConfig::default();
        assert_eq!(detector_from_config(&config).name(), "stub");

        config.data.detector.endpoint = Some("   ".to_string());
        assert_eq!(detector_from_config(&config).name(), "stub");

        config.data.detector.endpoint = Some("http://localhost:9000/detect".to_string());
        assert_eq!(detector_from_config(&config).name(), "http");
    }

    #[test]
    fn test_stalled_run_is_abandoned_after_timeout() {
        use bevy::tasks::TaskPool;

        let mut app = App::new();
        let mut config = AppConfig::default();
        config.data.detector.timeout_secs = 1;
        app.insert_resource(config)
            .insert_resource(Time::<()>::default())
            .init_resource::<AreaStore>()
            .insert_resource(DetectionState {
                in_flight: 1,
                ..default()
            })
            .add_systems(Update, poll_detection_tasks);

        let task = AsyncComputeTaskPool::get_or_init(TaskPool::default)
            .spawn(future::pending::<Result<Vec<DetectedArea>, DetectionError>>());
        app.world_mut().spawn(DetectionTask {
            task,
            started: Duration::ZERO,
        });

        let task_count = |app: &mut App| {
            app.world_mut()
                .query::<&DetectionTask>()
                .iter(app.world())
                .count()
        };

        app.update();
        assert_eq!(task_count(&mut app), 1);
        assert!(app.world().resource::<DetectionState>().is_detecting());

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(2));
        app.update();

        assert_eq!(task_count(&mut app), 0);
        let state = app.world().resource::<DetectionState>();
        assert!(!state.is_detecting());
        assert!(state.show_error);
        assert!(
            state
                .last_error
                .as_deref()
                .is_some_and(|e| e.contains("timed out"))
        );
        assert!(app.world().resource::<AreaStore>().is_empty());
    }
}
