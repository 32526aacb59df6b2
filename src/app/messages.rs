use log::error;

use crate::error::ApiError;
use crate::models::GalleryItem;

use super::state::LoadedImage;
use super::GalleryApp;

pub enum AppMessage {
    ItemsLoaded {
        generation: u64,
        result: Result<Vec<GalleryItem>, ApiError>,
    },
    ItemCreated(Result<GalleryItem, ApiError>),
    ItemDeleted {
        item_id: String,
        result: Result<(), ApiError>,
    },
    ImageUploaded(Result<String, ApiError>),
    ImageUploadCancelled,
    ImageLoaded {
        url: String,
        result: Result<LoadedImage, String>,
    },
}

pub(super) fn process_messages(app: &mut GalleryApp) {
    while let Ok(message) = app.rx.try_recv() {
        match message {
            AppMessage::ItemsLoaded { generation, result } => {
                // A newer fetch supersedes this one; drop the stale result.
                if generation != app.fetch_generation {
                    continue;
                }
                app.items_loading = false;
                match result {
                    Ok(mut items) => {
                        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                        app.engagement.seed(&items);
                        app.items = items;
                        app.items_error = None;
                    }
                    Err(err) => {
                        error!("failed to load gallery: {err}");
                        app.items_error = Some(err.to_string());
                    }
                }
            }
            AppMessage::ItemCreated(result) => {
                app.create.submitting = false;
                match result {
                    Ok(item) => {
                        app.create.reset();
                        app.info_banner = Some("Post created".into());
                        log::info!("created gallery item {}", item.id);
                        // The feed must not show stale data after a create.
                        app.spawn_load_items();
                    }
                    Err(err) => {
                        error!("failed to create gallery item: {err}");
                        app.create.error = Some(err.to_string());
                    }
                }
            }
            AppMessage::ItemDeleted { item_id, result } => {
                app.feed.deleting = None;
                match result {
                    Ok(()) => {
                        app.info_banner = Some("Post deleted".into());
                        app.spawn_load_items();
                    }
                    Err(err) => {
                        error!("failed to delete item {item_id}: {err}");
                        app.info_banner = Some(format!("Failed to delete item: {err}"));
                    }
                }
            }
            AppMessage::ImageUploaded(result) => {
                app.create.uploading = false;
                match result {
                    Ok(url) => {
                        app.create.image_url = url;
                        app.create.upload_error = None;
                        app.create.image_error = None;
                    }
                    Err(err) => {
                        error!("image upload failed: {err}");
                        app.create.upload_error = Some(err.to_string());
                    }
                }
            }
            AppMessage::ImageUploadCancelled => {
                app.create.uploading = false;
            }
            AppMessage::ImageLoaded { url, result } => {
                app.image_loading.remove(&url);
                match result {
                    Ok(img) => {
                        app.image_pending.insert(url, img);
                    }
                    Err(err) => {
                        error!("failed to load image {url}: {err}");
                        app.image_errors.insert(url, err);
                    }
                }
                app.on_download_complete();
            }
        }
    }
}
