//! Background aerial photo shown beneath the measured areas.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, UpdateLastPhotoPathRequest};

/// Image extensions the asset loader is built with
pub const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "gif"];

const PHOTO_Z: f32 = -10.0;

/// Message to pick a new background photo
#[derive(Message)]
pub struct OpenPhotoRequest;

/// Marker for the photo sprite
#[derive(Component)]
pub struct BackgroundPhoto {
    pub path: PathBuf,
}

#[derive(Resource, Default)]
pub struct PhotoState {
    pub pending: Option<Task<Option<PathBuf>>>,
    pub error: Option<String>,
}

pub fn is_supported_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| PHOTO_EXTENSIONS.contains(&e.as_str()))
}

pub fn open_photo_dialog(
    mut events: MessageReader<OpenPhotoRequest>,
    config: Res<AppConfig>,
    mut state: ResMut<PhotoState>,
) {
    for _ in events.read() {
        if state.pending.is_some() {
            continue;
        }

        let directory = config
            .data
            .last_photo_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|d| d.is_dir())
            .map(Path::to_path_buf);

        let task_pool = AsyncComputeTaskPool::get();
        state.pending = Some(task_pool.spawn(async move {
            let mut dialog = rfd::AsyncFileDialog::new()
                .set_title("Open Aerial Photo")
                .add_filter("Images", PHOTO_EXTENSIONS);
            if let Some(dir) = directory {
                dialog = dialog.set_directory(dir);
            }
            dialog.pick_file().await.map(|h| h.path().to_path_buf())
        }));
    }
}

pub fn poll_photo_dialog(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut state: ResMut<PhotoState>,
    existing: Query<Entity, With<BackgroundPhoto>>,
    mut photo_events: MessageWriter<UpdateLastPhotoPathRequest>,
) {
    let Some(task) = state.pending.as_mut() else {
        return;
    };
    let Some(result) = future::block_on(future::poll_once(task)) else {
        return;
    };
    state.pending = None;

    let Some(path) = result else {
        return;
    };
    if !is_supported_photo(&path) {
        state.error = Some(format!("Unsupported image format: {}", path.display()));
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    spawn_photo(&mut commands, &asset_server, path.clone());
    photo_events.write(UpdateLastPhotoPathRequest { path });
}

fn spawn_photo(commands: &mut Commands, asset_server: &AssetServer, path: PathBuf) {
    info!("Loading background photo {:?}", path);
    let image: Handle<Image> = asset_server.load(path.clone());
    commands.spawn((
        Sprite { image, ..default() },
        Transform::from_translation(Vec3::new(0.0, 0.0, PHOTO_Z)),
        BackgroundPhoto { path },
    ));
}

/// Reopen the last photo at startup if it still exists
pub fn restore_last_photo(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<AppConfig>,
) {
    if let Some(path) = config.data.last_photo_path.as_ref()
        && path.is_file()
        && is_supported_photo(path)
    {
        spawn_photo(&mut commands, &asset_server, path.clone());
    }
}

/// Drop the sprite and report when the image fails to load
pub fn detect_failed_photo(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    photos: Query<(Entity, &Sprite, &BackgroundPhoto)>,
    mut state: ResMut<PhotoState>,
) {
    for (entity, sprite, photo) in photos.iter() {
        if let LoadState::Failed(e) = asset_server.load_state(&sprite.image) {
            warn!("Photo failed to load: {:?} ({})", photo.path, e);
            state.error = Some(format!("Could not load {}", photo.path.display()));
            commands.entity(entity).despawn();
        }
    }
}
