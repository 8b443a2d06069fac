//! GeoJSON export: the save dialog runs on the compute pool, the write on the IO pool.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, IoTaskPool, Task};
use futures_lite::future;
use std::path::PathBuf;

use crate::config::{AppConfig, UpdateLastExportDirRequest};
use crate::measure::{geojson_string, write_geojson, AreaStore, ExportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Selected,
    All,
}

/// Message to export areas as GeoJSON
#[derive(Message)]
pub struct ExportGeoJsonRequest {
    pub scope: ExportScope,
}

#[derive(Resource, Default)]
pub struct ExportState {
    /// Save dialog waiting for the user
    pub pending_dialog: Option<Task<Option<PathBuf>>>,
    /// GeoJSON document to write once a destination is picked
    pending_contents: Option<String>,
    /// File write in progress
    pub pending_write: Option<Task<Result<PathBuf, String>>>,
    /// Success message for the result dialog
    pub last_message: Option<String>,
    pub error: Option<String>,
}

impl ExportState {
    pub fn is_busy(&self) -> bool {
        self.pending_dialog.is_some() || self.pending_write.is_some()
    }
}

/// Serialize the areas covered by `scope`
pub fn export_contents(store: &AreaStore, scope: ExportScope) -> Result<String, ExportError> {
    match scope {
        ExportScope::Selected => {
            let selected: Vec<_> = store.selected().into_iter().collect();
            geojson_string(&selected)
        }
        ExportScope::All => {
            let all: Vec<_> = store.areas().iter().collect();
            geojson_string(&all)
        }
    }
}

/// Suggested file name for the save dialog
pub fn export_file_name(store: &AreaStore, scope: ExportScope) -> String {
    match (scope, store.selected_area_id()) {
        (ExportScope::Selected, Some(id)) => format!("area-{}.geojson", id),
        _ => "areas.geojson".to_string(),
    }
}

pub fn start_export(
    mut events: MessageReader<ExportGeoJsonRequest>,
    store: Res<AreaStore>,
    config: Res<AppConfig>,
    mut state: ResMut<ExportState>,
) {
    for event in events.read() {
        if state.is_busy() {
            warn!("Export already in progress");
            continue;
        }

        let contents = match export_contents(&store, event.scope) {
            Ok(contents) => contents,
            Err(e) => {
                state.error = Some(e.to_string());
                continue;
            }
        };

        let file_name = export_file_name(&store, event.scope);
        let directory = config
            .data
            .last_export_dir
            .clone()
            .filter(|d| d.is_dir())
            .unwrap_or_else(crate::paths::default_export_dir);

        state.pending_contents = Some(contents);
        let task_pool = AsyncComputeTaskPool::get();
        state.pending_dialog = Some(task_pool.spawn(async move {
            rfd::AsyncFileDialog::new()
                .set_title("Export GeoJSON")
                .add_filter("GeoJSON", &["geojson", "json"])
                .set_directory(&directory)
                .set_file_name(file_name)
                .save_file()
                .await
                .map(|h| h.path().to_path_buf())
        }));
    }
}

/// Once a destination is picked, hand the write to the IO pool
pub fn poll_export_dialog(mut state: ResMut<ExportState>) {
    let Some(task) = state.pending_dialog.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    state.pending_dialog = None;
    let contents = state.pending_contents.take();

    let (Some(path), Some(contents)) = (result, contents) else {
        debug!("Export cancelled");
        return;
    };

    let task_pool = IoTaskPool::get();
    state.pending_write = Some(task_pool.spawn(async move {
        write_geojson(&path, &contents).map_err(|e| e.to_string())?;
        Ok(path)
    }));
}

pub fn poll_export_write(
    mut state: ResMut<ExportState>,
    mut dir_events: MessageWriter<UpdateLastExportDirRequest>,
) {
    let Some(task) = state.pending_write.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    state.pending_write = None;

    match result {
        Ok(path) => {
            info!("Exported areas to {:?}", path);
            if let Some(dir) = path.parent() {
                dir_events.write(UpdateLastExportDirRequest {
                    path: dir.to_path_buf(),
                });
            }
            state.last_message = Some(format!("Exported to {}", path.display()));
        }
        Err(e) => {
            error!("Export failed: {}", e);
            state.error = Some(e);
        }
    }
}
