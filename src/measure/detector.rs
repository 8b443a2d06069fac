//! Detector adapter: the async boundary that proposes paved-area polygons.
//!
//! A detector returns a whole batch or an error; it never touches the [`AreaStore`]
//! itself. The caller inserts a successful batch with
//! [`AreaStore::insert_detections`] and leaves the store untouched on failure.
//!
//! [`AreaStore`]: super::store::AreaStore
//! [`AreaStore::insert_detections`]: super::store::AreaStore::insert_detections

use bevy::math::Vec2;
use futures_lite::future::Boxed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A candidate polygon proposed by a detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedArea {
    pub coordinates: Vec<Vec2>,
    pub confidence: f32,
}

impl DetectedArea {
    pub fn new(coordinates: Vec<Vec2>, confidence: f32) -> Self {
        Self {
            coordinates,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// The model server could not be reached.
    Transport(String),
    /// The model server answered with a non-success status.
    Status { code: u16, message: String },
    /// The response body was not a valid detection batch.
    InvalidResponse(String),
    /// No result arrived within the caller's deadline.
    TimedOut(Duration),
    /// The detector itself reported a failure.
    Failed(String),
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionError::Transport(e) => write!(f, "Could not reach detector: {}", e),
            DetectionError::Status { code, message } => {
                write!(f, "Detector returned HTTP {}: {}", code, message)
            }
            DetectionError::InvalidResponse(e) => write!(f, "Invalid detector response: {}", e),
            DetectionError::TimedOut(after) => {
                write!(f, "Detection timed out after {}s", after.as_secs())
            }
            DetectionError::Failed(e) => write!(f, "Detection failed: {}", e),
        }
    }
}

impl std::error::Error for DetectionError {}

/// Anything that can propose a batch of paved areas.
///
/// Implementations must only return candidates whose confidence is at least
/// `confidence_threshold`, and must resolve to either the full batch or an error.
pub trait AreaDetector: Send + Sync {
    fn detect(&self, confidence_threshold: f32) -> Boxed<Result<Vec<DetectedArea>, DetectionError>>;

    fn name(&self) -> &'static str;
}

/// Canned detector used until a real model is wired in.
#[derive(Debug, Clone, Default)]
pub struct StubDetector {
    failure: Option<String>,
}

impl StubDetector {
    /// A stub that always fails with `message`.
    #[cfg(test)]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }

    fn canned() -> Vec<DetectedArea> {
        vec![
            // Main parking lot
            DetectedArea::new(
                vec![
                    Vec2::new(-320.0, -180.0),
                    Vec2::new(80.0, -180.0),
                    Vec2::new(80.0, 60.0),
                    Vec2::new(-320.0, 60.0),
                ],
                0.92,
            ),
            // Driveway
            DetectedArea::new(
                vec![
                    Vec2::new(140.0, -160.0),
                    Vec2::new(220.0, -160.0),
                    Vec2::new(260.0, 180.0),
                    Vec2::new(180.0, 180.0),
                ],
                0.85,
            ),
            // Access road
            DetectedArea::new(
                vec![
                    Vec2::new(-320.0, 120.0),
                    Vec2::new(100.0, 110.0),
                    Vec2::new(120.0, 170.0),
                    Vec2::new(-40.0, 240.0),
                    Vec2::new(-320.0, 200.0),
                ],
                0.67,
            ),
        ]
    }
}

impl AreaDetector for StubDetector {
    fn detect(&self, confidence_threshold: f32) -> Boxed<Result<Vec<DetectedArea>, DetectionError>> {
        let failure = self.failure.clone();
        Box::pin(async move {
            if let Some(message) = failure {
                return Err(DetectionError::Failed(message));
            }
            Ok(StubDetector::canned()
                .into_iter()
                .filter(|a| a.confidence >= confidence_threshold)
                .collect())
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug, Serialize)]
struct DetectRequest {
    confidence_threshold: f32,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    areas: Vec<ResponseArea>,
}

#[derive(Debug, Deserialize)]
struct ResponseArea {
    coordinates: Vec<[f32; 2]>,
    confidence: f32,
}

/// Detector backed by a model server speaking JSON over HTTP.
///
/// Request: `POST {"confidence_threshold": t}`.
/// Response: `{"areas": [{"coordinates": [[x, y], ...], "confidence": c}, ...]}`.
///
/// Each request carries an overall `timeout`, so an unresponsive server frees its worker
/// thread instead of blocking it indefinitely.
#[derive(Debug, Clone)]
pub struct HttpDetector {
    endpoint: String,
    timeout: Duration,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

/// Decode a model-server response body into candidates above `threshold`.
fn parse_response(body: &str, threshold: f32) -> Result<Vec<DetectedArea>, DetectionError> {
    let response: DetectResponse = serde_json::from_str(body)
        .map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;

    Ok(response
        .areas
        .into_iter()
        .filter(|a| a.confidence >= threshold)
        .map(|a| {
            DetectedArea::new(
                a.coordinates.into_iter().map(Vec2::from).collect(),
                a.confidence,
            )
        })
        .collect())
}

fn is_timeout(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    )
}

fn transport_timed_out(transport: &ureq::Transport) -> bool {
    use std::error::Error;
    transport.kind() == ureq::ErrorKind::Io
        && transport
            .source()
            .and_then(|e| e.downcast_ref::<std::io::Error>())
            .is_some_and(is_timeout)
}

fn request_detections(
    endpoint: &str,
    threshold: f32,
    timeout: Duration,
) -> Result<Vec<DetectedArea>, DetectionError> {
    let response = ureq::post(endpoint)
        .timeout(timeout)
        .set("User-Agent", "pavemark-detector")
        .send_json(DetectRequest {
            confidence_threshold: threshold,
        });

    match response {
        Ok(resp) => {
            let body = resp.into_string().map_err(|e| {
                if is_timeout(&e) {
                    DetectionError::TimedOut(timeout)
                } else {
                    DetectionError::InvalidResponse(e.to_string())
                }
            })?;
            parse_response(&body, threshold)
        }
        Err(ureq::Error::Status(code, resp)) => Err(DetectionError::Status {
            code,
            message: resp.status_text().to_string(),
        }),
        Err(ureq::Error::Transport(t)) if transport_timed_out(&t) => {
            Err(DetectionError::TimedOut(timeout))
        }
        Err(e) => Err(DetectionError::Transport(e.to_string())),
    }
}

impl AreaDetector for HttpDetector {
    fn detect(&self, confidence_threshold: f32) -> Boxed<Result<Vec<DetectedArea>, DetectionError>> {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        Box::pin(async move { request_detections(&endpoint, confidence_threshold, timeout) })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future;

    #[test]
    fn test_stub_returns_all_at_zero_threshold() {
        let areas = future::block_on(StubDetector::default().detect(0.0)).unwrap();
        assert_eq!(areas.len(), 3);
        assert!(areas.iter().all(|a| a.coordinates.len() >= 3));
    }

    #[test]
    fn test_stub_filters_by_threshold() {
        let areas = future::block_on(StubDetector::default().detect(0.8)).unwrap();
        assert_eq!(areas.len(), 2);
        assert!(areas.iter().all(|a| a.confidence >= 0.8));

        let none = future::block_on(StubDetector::default().detect(0.99)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_failing_stub() {
        let result = future::block_on(StubDetector::failing("model offline").detect(0.5));
        assert_eq!(
            result,
            Err(DetectionError::Failed("model offline".to_string()))
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"areas": [
            {"coordinates": [[0, 0], [10, 0], [10, 10]], "confidence": 0.9},
            {"coordinates": [[0, 0], [5, 0], [5, 5]], "confidence": 0.3}
        ]}"#;
        let areas = parse_response(body, 0.5).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].coordinates[1], Vec2::new(10.0, 0.0));
        assert_eq!(areas[0].confidence, 0.9);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_response("{}", 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_response() {
        assert!(matches!(
            parse_response("not json", 0.5),
            Err(DetectionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = DetectionError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Detection timed out after 30s");
        let err = DetectionError::Status {
            code: 503,
            message: "Service Unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_unresponsive_server_times_out() {
        // Accepts connections (via the backlog) but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/detect", listener.local_addr().unwrap());
        let timeout = Duration::from_millis(200);

        let started = std::time::Instant::now();
        let result = future::block_on(HttpDetector::new(endpoint, timeout).detect(0.5));

        assert!(matches!(result, Err(DetectionError::TimedOut(t)) if t == timeout));
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(listener);
    }
}
