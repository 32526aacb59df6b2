use eframe::egui::{self, Color32, RichText};

use super::super::GalleryApp;

pub const DESCRIPTION_MIN: usize = 5;
pub const DESCRIPTION_MAX: usize = 500;

impl GalleryApp {
    pub(crate) fn render_create(&mut self, ui: &mut egui::Ui) {
        ui.heading("Add New Gallery Item");
        ui.add_space(8.0);

        ui.label("Description");
        ui.add(
            egui::TextEdit::multiline(&mut self.create.description)
                .desired_rows(4)
                .desired_width(f32::INFINITY)
                .hint_text("Enter gallery item description"),
        );
        if let Some(err) = &self.create.description_error {
            ui.colored_label(Color32::LIGHT_RED, err);
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Gallery Image").strong());
        ui.horizontal(|ui| {
            if self.create.uploading {
                ui.add(egui::Spinner::new());
                ui.label("Uploading image...");
            } else if ui.button("Choose image…").clicked() {
                self.spawn_pick_and_upload();
            }
        });
        if let Some(err) = &self.create.upload_error {
            ui.colored_label(Color32::LIGHT_RED, err);
        }
        if let Some(err) = &self.create.image_error {
            ui.colored_label(Color32::LIGHT_RED, err);
        }
        if !self.create.image_url.is_empty() && !self.create.uploading {
            ui.colored_label(Color32::LIGHT_GREEN, "✓ Image uploaded successfully");
            let url = self.create.image_url.clone();
            self.render_remote_image(ui, &url, 320.0);
        }

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if self.create.submitting {
                ui.add(egui::Spinner::new());
                ui.label("Uploading...");
            } else if ui.button("Upload Gallery Item").clicked() {
                self.spawn_create_item();
            }
        });
        if let Some(err) = &self.create.error {
            ui.colored_label(Color32::LIGHT_RED, err);
        }
    }

    /// Runs the submit-time validation, recording per-field messages.
    /// Failures never build a request.
    pub(in crate::app) fn validate_create_form(&mut self) -> bool {
        self.create.description_error = validate_description(&self.create.description).err();
        self.create.image_error = validate_image_url(&self.create.image_url).err();
        self.create.description_error.is_none() && self.create.image_error.is_none()
    }
}

pub fn validate_description(description: &str) -> Result<(), String> {
    let trimmed = description.trim();
    let len = trimmed.chars().count();
    if len < DESCRIPTION_MIN {
        return Err(format!(
            "Description must be at least {DESCRIPTION_MIN} characters"
        ));
    }
    if len > DESCRIPTION_MAX {
        return Err(format!(
            "Description cannot exceed {DESCRIPTION_MAX} characters"
        ));
    }
    Ok(())
}

/// The image value is the public URL handed back by the upload helper, so a
/// non-URL here means no upload has completed.
pub fn validate_image_url(image_url: &str) -> Result<(), String> {
    if image_url.is_empty() {
        return Err("Image is required".to_string());
    }
    reqwest::Url::parse(image_url)
        .map(|_| ())
        .map_err(|_| "Invalid image URL".to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn description_boundaries() {
        assert!(validate_description("abcd").is_err());
        assert!(validate_description("abcde").is_ok());
        assert!(validate_description("  abcde  ").is_ok());
        assert!(validate_description(&"x".repeat(500)).is_ok());
        assert!(validate_description(&"x".repeat(501)).is_err());
    }

    #[test]
    fn whitespace_padding_does_not_satisfy_minimum() {
        assert!(validate_description("   ab   ").is_err());
    }

    #[test]
    fn image_url_must_be_syntactically_valid() {
        assert_eq!(
            validate_image_url("").unwrap_err(),
            "Image is required".to_string()
        );
        assert_eq!(
            validate_image_url("not-a-url").unwrap_err(),
            "Invalid image URL".to_string()
        );
        assert!(validate_image_url("https://x/y.png").is_ok());
    }
}
