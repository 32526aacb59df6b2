use eframe::egui::{self, Align2, Context};

use super::super::GalleryApp;

impl GalleryApp {
    /// Deleting a post is irreversible server-side, so it always goes through
    /// an explicit confirmation.
    pub(crate) fn render_delete_confirm(&mut self, ctx: &Context) {
        let Some(item_id) = self.feed.confirm_delete.clone() else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;

        egui::Window::new("Delete post")
            .resizable(false)
            .collapsible(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Are you sure you want to delete this gallery item?");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let deletable = self.feed.deleting.is_none();
                    if ui
                        .add_enabled(deletable, egui::Button::new("Delete"))
                        .clicked()
                    {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            self.feed.confirm_delete = None;
            self.spawn_delete_item(item_id);
        } else if cancelled {
            self.feed.confirm_delete = None;
        }
    }
}
