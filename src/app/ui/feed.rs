use eframe::egui::{self, Color32, RichText};

use crate::models::GalleryItem;

use super::super::{format_timestamp, GalleryApp};

/// Interactions collected while rendering; applied after the item loop so the
/// cards never hold a borrow across a mutation.
enum FeedAction {
    ToggleLike(String),
    ToggleComments(String),
    AddComment(String),
    RemoveComment { item_id: String, comment_id: String },
    RequestDelete(String),
}

impl GalleryApp {
    pub(crate) fn render_feed(&mut self, ui: &mut egui::Ui) {
        if self.items_loading && self.items.is_empty() {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading...");
            });
        }
        if let Some(err) = self.items_error.clone() {
            ui.colored_label(Color32::LIGHT_RED, err);
            if ui.button("Retry").clicked() {
                self.spawn_load_items();
            }
            ui.separator();
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            if self.items.is_empty() && !self.items_loading {
                ui.label("No gallery items yet.");
            }

            let items = std::mem::take(&mut self.items);
            let mut actions = Vec::new();
            for item in &items {
                self.render_item_card(ui, item, &mut actions);
                ui.add_space(8.0);
            }
            self.items = items;

            for action in actions {
                self.apply_feed_action(action);
            }
        });
    }

    fn render_item_card(
        &mut self,
        ui: &mut egui::Ui,
        item: &GalleryItem,
        actions: &mut Vec<FeedAction>,
    ) {
        let record = self.engagement.record(&item.id);
        let comment_count = self.engagement.comment_count(&item.id);
        let comments_open = self.feed.comments_open.contains(&item.id);

        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .inner_margin(egui::vec2(12.0, 10.0))
            .show(ui, |ui| {
                let author = item.created_by.clone().unwrap_or_default();
                ui.horizontal(|ui| {
                    if let Some(avatar) = author.image_url.as_deref() {
                        self.render_remote_image(ui, avatar, 32.0);
                    }
                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(author.name.as_deref().unwrap_or("Unknown")).strong(),
                        );
                        if let Some(email) = author.email.as_deref() {
                            ui.label(RichText::new(email).weak().size(11.0));
                        }
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(format_timestamp(&item.created_at)).weak());
                    });
                });

                ui.add_space(4.0);
                ui.label(RichText::new(&item.description).size(15.0));
                ui.add_space(4.0);

                if let Some(image_url) = item.images.first() {
                    self.render_remote_image(ui, image_url, 420.0);
                }

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let like_text = format!("♥ {}", record.count);
                    if ui.selectable_label(record.liked, like_text).clicked() {
                        actions.push(FeedAction::ToggleLike(item.id.clone()));
                    }

                    let comment_text = format!("💬 {comment_count}");
                    if ui.selectable_label(comments_open, comment_text).clicked() {
                        actions.push(FeedAction::ToggleComments(item.id.clone()));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let delete_enabled = self.feed.deleting.is_none();
                        if ui
                            .add_enabled(delete_enabled, egui::Button::new("🗑 Delete"))
                            .clicked()
                        {
                            actions.push(FeedAction::RequestDelete(item.id.clone()));
                        }
                        ui.label(
                            RichText::new(format!(
                                "Posted by {}",
                                author.name.as_deref().unwrap_or("Unknown")
                            ))
                            .weak(),
                        );
                    });
                });

                if comments_open {
                    ui.separator();
                    self.render_comments(ui, item, actions);
                }
            });
    }

    fn render_comments(
        &mut self,
        ui: &mut egui::Ui,
        item: &GalleryItem,
        actions: &mut Vec<FeedAction>,
    ) {
        let current_user = self.current_user().cloned();
        let comments = self.engagement.comments(&item.id).to_vec();

        if comments.is_empty() {
            ui.label(RichText::new("No comments yet — be the first!").weak());
        }
        for comment in &comments {
            ui.horizontal(|ui| {
                if let Some(avatar) = comment.author_image.as_deref() {
                    self.render_remote_image(ui, avatar, 24.0);
                }
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&comment.author_name).strong().size(12.0));
                        ui.label(
                            RichText::new(format_timestamp(&comment.created_at))
                                .weak()
                                .size(10.0),
                        );
                    });
                    ui.label(&comment.text);
                });
                // Only the comment's own author gets the delete affordance
                if current_user
                    .as_ref()
                    .is_some_and(|user| crate::engagement::owns_comment(user, comment))
                {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖").clicked() {
                            actions.push(FeedAction::RemoveComment {
                                item_id: item.id.clone(),
                                comment_id: comment.id.clone(),
                            });
                        }
                    });
                }
            });
            ui.add_space(2.0);
        }

        ui.horizontal(|ui| {
            let draft = self
                .feed
                .comment_drafts
                .entry(item.id.clone())
                .or_default();
            ui.add(
                egui::TextEdit::singleline(draft)
                    .hint_text("Write a comment...")
                    .desired_width(280.0),
            );
            let can_send = !draft.trim().is_empty();
            if ui
                .add_enabled(can_send, egui::Button::new("Comment"))
                .clicked()
            {
                actions.push(FeedAction::AddComment(item.id.clone()));
            }
        });
    }

    fn apply_feed_action(&mut self, action: FeedAction) {
        match action {
            FeedAction::ToggleLike(item_id) => {
                self.engagement.toggle_like(&item_id);
            }
            FeedAction::ToggleComments(item_id) => {
                if !self.feed.comments_open.remove(&item_id) {
                    self.feed.comments_open.insert(item_id);
                }
            }
            FeedAction::AddComment(item_id) => {
                let Some(user) = self.current_user().cloned() else {
                    self.info_banner = Some("Please sign in to comment.".into());
                    return;
                };
                let draft = self
                    .feed
                    .comment_drafts
                    .get(&item_id)
                    .cloned()
                    .unwrap_or_default();
                if self.engagement.add_comment(&item_id, &draft, &user).is_some() {
                    self.feed.comment_drafts.remove(&item_id);
                    self.feed.comments_open.insert(item_id);
                }
            }
            FeedAction::RemoveComment {
                item_id,
                comment_id,
            } => {
                self.engagement.remove_comment(&item_id, &comment_id);
            }
            FeedAction::RequestDelete(item_id) => {
                self.feed.confirm_delete = Some(item_id);
            }
        }
    }

    /// Async image pipeline: spinner while the download task runs, texture
    /// once decoded, error label on failure. Textures are cached by URL.
    pub(crate) fn render_remote_image(&mut self, ui: &mut egui::Ui, url: &str, max_width: f32) {
        if let Some(texture) = self.image_textures.get(url) {
            let size = texture.size_vec2();
            let scale = if size.x > max_width {
                max_width / size.x
            } else {
                1.0
            };
            ui.add(egui::Image::from_texture(texture).fit_to_exact_size(size * scale));
        } else if let Some(pending) = self.image_pending.remove(url) {
            let color = egui::ColorImage::from_rgba_unmultiplied(pending.size, &pending.pixels);
            let tex = ui
                .ctx()
                .load_texture(url, color, egui::TextureOptions::default());
            self.image_textures.insert(url.to_string(), tex.clone());
            let size = tex.size_vec2();
            let scale = if size.x > max_width {
                max_width / size.x
            } else {
                1.0
            };
            ui.add(egui::Image::from_texture(&tex).fit_to_exact_size(size * scale));
        } else if let Some(err) = self.image_errors.get(url) {
            ui.colored_label(Color32::LIGHT_RED, format!("Image error: {err}"));
        } else {
            ui.spinner();
            if !self.image_loading.contains(url) {
                self.spawn_download_image(url);
            }
        }
    }
}
