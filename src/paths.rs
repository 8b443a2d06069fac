//! Where Pavemark keeps its files.
//!
//! - `config.json`: detector endpoint, confidence threshold, last photo and export folder
//! - `logs/pavemark.log`: the application log, one separator per session
//! - the export folder offered before the user has picked one
//!
//! In development mode everything lives in the working directory. Installed builds use
//! the user's config and data directories with a `pavemark` subfolder.

use std::path::PathBuf;

/// Returns true when running in development mode (cargo run).
///
/// Detection methods:
/// - `CARGO` env var is set (cargo run sets this)
/// - Debug assertions enabled (debug builds)
pub fn is_dev_mode() -> bool {
    std::env::var("CARGO").is_ok() || cfg!(debug_assertions)
}

/// Directory holding `config.json`. Outside Linux this is the data directory.
pub fn config_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join("pavemark"))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

/// Directory holding the `logs/` folder.
pub fn data_dir() -> Option<PathBuf> {
    if is_dev_mode() {
        return Some(PathBuf::from("."));
    }

    dirs::data_dir().map(|p| p.join("pavemark"))
}

/// Path to the config file.
pub fn config_file() -> PathBuf {
    config_dir()
        .map(|p| p.join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Path to the logs directory.
pub fn logs_dir() -> PathBuf {
    data_dir()
        .map(|p| p.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Default location offered when exporting GeoJSON for the first time.
pub fn default_export_dir() -> PathBuf {
    if is_dev_mode() {
        return PathBuf::from(".");
    }
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Create the config and log directories before logging starts.
pub fn ensure_directories() -> std::io::Result<()> {
    if is_dev_mode() {
        std::fs::create_dir_all(logs_dir())?;
        return Ok(());
    }

    if let Some(config) = config_dir() {
        std::fs::create_dir_all(&config)?;
    }
    if let Some(data) = data_dir() {
        std::fs::create_dir_all(&data)?;
        std::fs::create_dir_all(data.join("logs"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_not_none() {
        // In test mode (debug), should return Some
        assert!(config_dir().is_some());
    }

    #[test]
    fn test_config_file_has_json_extension() {
        let path = config_file();
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn test_dev_mode_returns_local_paths() {
        // In tests, is_dev_mode() should be true due to debug_assertions
        assert!(is_dev_mode());
        assert_eq!(config_dir(), Some(PathBuf::from(".")));
        assert_eq!(logs_dir(), PathBuf::from("./logs"));
        assert_eq!(default_export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_logs_live_under_data_dir() {
        if let Some(data) = data_dir() {
            assert_eq!(logs_dir(), data.join("logs"));
        }
        assert_eq!(config_file().file_name(), Some("config.json".as_ref()));
    }
}
