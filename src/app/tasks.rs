//! Background I/O. Every operation runs on its own thread and reports back to
//! the UI through the app's message channel; nothing here blocks a frame.

use std::sync::mpsc::Sender;
use std::thread;

use log::error;

use crate::api::{self, ApiClient};
use crate::models::CreateGalleryInput;
use crate::upload;

use super::messages::AppMessage;
use super::state::LoadedImage;

pub fn load_items(client: ApiClient, tx: Sender<AppMessage>, generation: u64) {
    thread::spawn(move || {
        let result = client.list_items();
        if tx.send(AppMessage::ItemsLoaded { generation, result }).is_err() {
            error!("failed to send ItemsLoaded message");
        }
    });
}

pub fn create_item(client: ApiClient, tx: Sender<AppMessage>, input: CreateGalleryInput) {
    thread::spawn(move || {
        let result = client.create_item(&input);
        if tx.send(AppMessage::ItemCreated(result)).is_err() {
            error!("failed to send ItemCreated message");
        }
    });
}

pub fn delete_item(client: ApiClient, tx: Sender<AppMessage>, item_id: String) {
    thread::spawn(move || {
        let result = client.delete_item(&item_id);
        let message = AppMessage::ItemDeleted { item_id, result };
        if tx.send(message).is_err() {
            error!("failed to send ItemDeleted message");
        }
    });
}

/// Opens the native file picker, then runs the two-phase upload on the picked
/// file. Cancelling the picker reports back so the form can clear its
/// uploading flag.
pub fn pick_and_upload_image(client: ApiClient, tx: Sender<AppMessage>) {
    thread::spawn(move || {
        let picked = rfd::FileDialog::new()
            .add_filter("images", &["png", "jpg", "jpeg", "gif", "webp"])
            .pick_file();
        let message = match picked {
            Some(path) => {
                let mime = upload::mime_for_path(&path);
                let result = std::fs::read(&path)
                    .map_err(|err| {
                        crate::error::ApiError::malformed(format!(
                            "could not read {}: {err}",
                            path.display()
                        ))
                    })
                    .and_then(|bytes| upload::upload_image(&client, bytes, mime));
                AppMessage::ImageUploaded(result)
            }
            None => AppMessage::ImageUploadCancelled,
        };
        if tx.send(message).is_err() {
            error!("failed to send ImageUploaded message");
        }
    });
}

pub fn download_image(tx: Sender<AppMessage>, url: String) {
    thread::spawn(move || {
        let result = (|| {
            let client = api::shared_client().map_err(|e| format!("HTTP client error: {e}"))?;
            let resp = client
                .get(&url)
                .send()
                .map_err(|e| format!("request error: {e}"))?;
            let bytes = resp.bytes().map_err(|e| format!("download error: {e}"))?;
            let dyn_img = image::load_from_memory(&bytes)
                .map_err(|e| format!("image decode error: {e}"))?;
            let rgba = dyn_img.to_rgba8();
            let size = [dyn_img.width() as usize, dyn_img.height() as usize];
            Ok(LoadedImage {
                size,
                pixels: rgba.as_flat_samples().as_slice().to_vec(),
            })
        })();

        let message = AppMessage::ImageLoaded { url, result };
        if tx.send(message).is_err() {
            error!("failed to send ImageLoaded message");
        }
    });
}
