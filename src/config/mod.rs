use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_DETECTION_TIMEOUT_SECS};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Settings for the area detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Model server URL. When unset the built-in stub detector is used.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Minimum confidence for detected areas (0.0 - 1.0)
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Seconds before an in-flight detection is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_timeout_secs() -> u64 {
    DEFAULT_DETECTION_TIMEOUT_SECS
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            timeout_secs: DEFAULT_DETECTION_TIMEOUT_SECS,
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfigData {
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Directory of the last GeoJSON export (starting point for the save dialog)
    #[serde(default)]
    pub last_export_dir: Option<PathBuf>,

    /// Last background photo opened (starting point for the open dialog)
    #[serde(default)]
    pub last_photo_path: Option<PathBuf>,
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to change the detector confidence threshold
#[derive(Message)]
pub struct SetConfidenceThresholdRequest {
    pub threshold: f32,
}

/// Message to remember where the last export went
#[derive(Message)]
pub struct UpdateLastExportDirRequest {
    pub path: PathBuf,
}

/// Message to remember the last background photo
#[derive(Message)]
pub struct UpdateLastPhotoPathRequest {
    pub path: PathBuf,
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AppConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Parse config file contents, falling back to defaults on error
fn parse_config(json: &str) -> LoadConfigResult {
    match serde_json::from_str::<AppConfigData>(json) {
        Ok(mut data) => {
            data.detector.confidence_threshold = data.detector.confidence_threshold.clamp(0.0, 1.0);
            LoadConfigResult {
                data,
                reset_reason: None,
            }
        }
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            LoadConfigResult {
                data: AppConfigData::default(),
                reset_reason: Some(format!("Configuration file was corrupted: {}", e)),
            }
        }
    }
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: AppConfigData::default(),
            reset_reason: None,
        };
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => {
            let result = parse_config(&json);
            if result.reset_reason.is_none() {
                info!("Loaded config from {:?}", config_path);
            }
            result
        }
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            LoadConfigResult {
                data: AppConfigData::default(),
                reset_reason: Some(format!("Could not read configuration file: {}", e)),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn set_confidence_threshold_system(
    mut events: MessageReader<SetConfidenceThresholdRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.detector.confidence_threshold = event.threshold.clamp(0.0, 1.0);
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

fn update_last_export_dir_system(
    mut events: MessageReader<UpdateLastExportDirRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_export_dir = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

fn update_last_photo_path_system(
    mut events: MessageReader<UpdateLastPhotoPathRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        config.data.last_photo_path = Some(event.path.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetConfidenceThresholdRequest>()
            .add_message::<UpdateLastExportDirRequest>()
            .add_message::<UpdateLastPhotoPathRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    set_confidence_threshold_system
                        .run_if(on_message::<SetConfidenceThresholdRequest>),
                    update_last_export_dir_system.run_if(on_message::<UpdateLastExportDirRequest>),
                    update_last_photo_path_system.run_if(on_message::<UpdateLastPhotoPathRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}
