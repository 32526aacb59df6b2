use eframe::egui::{self, Context, RichText};

use super::super::state::ViewState;
use super::super::GalleryApp;

impl GalleryApp {
    pub(crate) fn render_top_panel(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("nav_shell").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("Photowall").strong().size(18.0));
                ui.separator();

                if ui
                    .selectable_label(self.view == ViewState::Feed, "Gallery")
                    .clicked()
                {
                    self.view = ViewState::Feed;
                }

                // Creating a post requires a live session
                let create_clicked = ui
                    .selectable_label(self.view == ViewState::Create, "Create Post")
                    .clicked();
                if create_clicked {
                    if self.current_user().is_some() {
                        self.view = ViewState::Create;
                    } else {
                        self.info_banner = Some("Please sign in to create a post.".into());
                    }
                }

                if ui.button("Refresh").clicked() {
                    self.spawn_load_items();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.current_user() {
                        Some(user) => {
                            ui.label(user.display_name().to_string());
                        }
                        None => {
                            ui.label(RichText::new("Not signed in").weak());
                        }
                    }
                });
            });

            if let Some(message) = self.info_banner.clone() {
                let mut dismiss = false;
                egui::Frame::group(ui.style())
                    .fill(ui.visuals().extreme_bg_color)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(message.as_str());
                            if ui.button("Dismiss").clicked() {
                                dismiss = true;
                            }
                        });
                    });
                if dismiss {
                    self.info_banner = None;
                }
            }
        });
    }
}
