use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use eframe::egui::{self, Context, TextureHandle};
use log::error;

use crate::api::ApiClient;
use crate::auth::{EnvSessionProvider, Session, SessionProvider};
use crate::config::Config;
use crate::engagement::{EngagementStore, FileKvStore, KvStore, MemoryKvStore};
use crate::models::{CreateGalleryInput, GalleryItem};

mod messages;
mod state;
mod tasks;
mod ui;

use messages::AppMessage;
use state::{CreateItemState, FeedState, LoadedImage, ViewState};

// Cap on concurrent image downloads so a long feed does not flood the host
const MAX_CONCURRENT_DOWNLOADS: usize = 4;

pub struct GalleryApp {
    api: ApiClient,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,

    items: Vec<GalleryItem>,
    items_loading: bool,
    items_error: Option<String>,
    /// Bumped on every list fetch; responses carrying an older generation are
    /// discarded so a superseded fetch can never clobber a newer one.
    fetch_generation: u64,

    view: ViewState,
    feed: FeedState,
    create: CreateItemState,
    engagement: EngagementStore,
    session: Option<Session>,
    info_banner: Option<String>,

    image_textures: HashMap<String, TextureHandle>,
    image_loading: HashSet<String>,
    image_pending: HashMap<String, LoadedImage>,
    image_errors: HashMap<String, String>,
    download_queue: VecDeque<String>,
    active_downloads: usize,
}

impl GalleryApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let config = Config::from_env();
        let sessions: Arc<dyn SessionProvider> =
            Arc::new(EnvSessionProvider::new(config.auth_publishable_key.clone()));
        let store: Box<dyn KvStore> = match FileKvStore::in_home_dir() {
            Ok(store) => Box::new(store),
            Err(err) => {
                error!("falling back to in-memory engagement store: {err}");
                Box::new(MemoryKvStore::default())
            }
        };
        let mut app = Self::with_parts(config, sessions, store);
        app.spawn_load_items();
        app
    }

    pub fn with_parts(
        config: Config,
        sessions: Arc<dyn SessionProvider>,
        store: Box<dyn KvStore>,
    ) -> Self {
        let api = ApiClient::new(config.api_url.clone(), sessions.clone(), config.token_wait)
            .unwrap_or_else(|err| {
                error!("failed to initialise API client: {err}");
                ApiClient::new(
                    crate::config::DEFAULT_API_URL,
                    sessions.clone(),
                    config.token_wait,
                )
                .expect("fallback API client")
            });
        let engagement = EngagementStore::new(store);
        let session = sessions.session();
        let (tx, rx) = mpsc::channel();

        Self {
            api,
            tx,
            rx,
            items: Vec::new(),
            items_loading: false,
            items_error: None,
            fetch_generation: 0,
            view: ViewState::Feed,
            feed: FeedState::default(),
            create: CreateItemState::default(),
            engagement,
            session,
            info_banner: None,
            image_textures: HashMap::new(),
            image_loading: HashSet::new(),
            image_pending: HashMap::new(),
            image_errors: HashMap::new(),
            download_queue: VecDeque::new(),
            active_downloads: 0,
        }
    }

    fn current_user(&self) -> Option<&crate::auth::UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    fn spawn_load_items(&mut self) {
        self.fetch_generation += 1;
        self.items_loading = true;
        self.items_error = None;
        tasks::load_items(self.api.clone(), self.tx.clone(), self.fetch_generation);
    }

    fn spawn_create_item(&mut self) {
        if let Some(input) = self.prepare_create_input() {
            tasks::create_item(self.api.clone(), self.tx.clone(), input);
        }
    }

    /// Gate for a create submission: needs a live session, a valid form, and
    /// no submission already in flight. Flips the in-flight flag and builds
    /// the payload only when all three hold, so one submission yields exactly
    /// one create request.
    fn prepare_create_input(&mut self) -> Option<CreateGalleryInput> {
        if self.create.submitting {
            return None;
        }
        let Some(user) = self.current_user().cloned() else {
            self.create.error = Some("Sign in to create a post".into());
            return None;
        };
        if !self.validate_create_form() {
            return None;
        }
        let input =
            CreateGalleryInput::new(&self.create.description, &self.create.image_url, &user);
        self.create.submitting = true;
        self.create.error = None;
        Some(input)
    }

    fn spawn_delete_item(&mut self, item_id: String) {
        if self.feed.deleting.is_some() {
            return;
        }
        self.feed.deleting = Some(item_id.clone());
        tasks::delete_item(self.api.clone(), self.tx.clone(), item_id);
    }

    fn spawn_pick_and_upload(&mut self) {
        if self.create.uploading {
            return;
        }
        self.create.uploading = true;
        self.create.upload_error = None;
        tasks::pick_and_upload_image(self.api.clone(), self.tx.clone());
    }

    fn process_messages(&mut self) {
        messages::process_messages(self);
    }

    fn spawn_download_image(&mut self, url: &str) {
        self.image_loading.insert(url.to_string());
        self.download_queue.push_back(url.to_string());
        self.process_download_queue();
    }

    fn process_download_queue(&mut self) {
        while self.active_downloads < MAX_CONCURRENT_DOWNLOADS {
            if let Some(url) = self.download_queue.pop_front() {
                self.active_downloads += 1;
                tasks::download_image(self.tx.clone(), url);
            } else {
                break;
            }
        }
    }

    fn on_download_complete(&mut self) {
        if self.active_downloads > 0 {
            self.active_downloads -= 1;
        }
        self.process_download_queue();
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        self.render_top_panel(ctx);

        match self.view {
            ViewState::Feed => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.render_feed(ui);
                });
            }
            ViewState::Create => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.render_create(ui);
                });
            }
        }

        self.render_delete_confirm(ctx);
    }
}

fn format_timestamp(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%d/%m/%Y, %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|_| ts.to_string())
}
