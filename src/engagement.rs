//! Client-local likes and comments, layered over server-fetched gallery
//! items. Records are seeded from the server's `likesCount` the first time an
//! item id is seen and never reconciled back; this is a local shadow of the
//! "true" like state, lost if the backing store is cleared.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use log::{error, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::auth::UserProfile;
use crate::models::{Comment, EngagementRecord, GalleryItem};

pub const LIKES_KEY: &str = "gallery_post_likes_v1";
pub const COMMENTS_KEY: &str = "gallery_post_comments_v1";

/// Durable key-value capability backing the store. Injected so the store
/// logic never hard-codes a storage medium; production uses files on disk,
/// tests an in-memory map.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// One JSON file per key under a data directory.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Result<Self, String> {
        fs::create_dir_all(&dir)
            .map_err(|err| format!("failed to create data directory {}: {err}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Default location under the user's home directory.
    pub fn in_home_dir() -> Result<Self, String> {
        let dir = if let Some(home) = dirs::home_dir() {
            home.join(".photowall")
        } else {
            PathBuf::from(".photowall")
        };
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = fs::write(self.path_for(key), value) {
            error!("failed to persist {key}: {err}");
        }
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

pub struct EngagementStore {
    store: Box<dyn KvStore>,
    likes: HashMap<String, EngagementRecord>,
    comments: HashMap<String, Vec<Comment>>,
}

impl EngagementStore {
    /// Loads both maps from the backing store. Corrupt entries are dropped
    /// with a warning rather than failing startup.
    pub fn new(store: Box<dyn KvStore>) -> Self {
        let likes = load_map(store.as_ref(), LIKES_KEY);
        let comments = load_map(store.as_ref(), COMMENTS_KEY);
        Self {
            store,
            likes,
            comments,
        }
    }

    pub fn record(&self, item_id: &str) -> EngagementRecord {
        self.likes.get(item_id).copied().unwrap_or(EngagementRecord {
            liked: false,
            count: 0,
        })
    }

    pub fn comments(&self, item_id: &str) -> &[Comment] {
        self.comments.get(item_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn comment_count(&self, item_id: &str) -> usize {
        self.comments.get(item_id).map_or(0, Vec::len)
    }

    /// Initializes engagement state for items seen for the first time.
    /// Existing records are never overwritten, so calling this after every
    /// fetch is safe.
    pub fn seed(&mut self, items: &[GalleryItem]) {
        let mut likes_changed = false;
        let mut comments_changed = false;
        for item in items {
            if !self.likes.contains_key(&item.id) {
                self.likes.insert(
                    item.id.clone(),
                    EngagementRecord {
                        liked: false,
                        count: item.likes_count,
                    },
                );
                likes_changed = true;
            }
            if !self.comments.contains_key(&item.id) {
                self.comments.insert(item.id.clone(), Vec::new());
                comments_changed = true;
            }
        }
        if likes_changed {
            self.persist_likes();
        }
        if comments_changed {
            self.persist_comments();
        }
    }

    /// Flips the like state, adjusting the count by one with a floor of zero.
    pub fn toggle_like(&mut self, item_id: &str) -> EngagementRecord {
        let entry = self
            .likes
            .entry(item_id.to_string())
            .or_insert(EngagementRecord {
                liked: false,
                count: 0,
            });
        entry.liked = !entry.liked;
        entry.count = if entry.liked {
            entry.count.saturating_add(1)
        } else {
            entry.count.saturating_sub(1)
        };
        let record = *entry;
        self.persist_likes();
        record
    }

    /// Appends a comment authored by the acting user. Whitespace-only text is
    /// rejected without touching the store.
    pub fn add_comment(
        &mut self,
        item_id: &str,
        text: &str,
        user: &UserProfile,
    ) -> Option<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let comment = Comment {
            id: generate_comment_id(),
            text: text.to_string(),
            author_name: comment_author_name(user),
            author_image: user.image_url.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.comments
            .entry(item_id.to_string())
            .or_default()
            .push(comment.clone());
        self.persist_comments();
        Some(comment)
    }

    /// Removes the targeted comment; absent ids are a no-op.
    pub fn remove_comment(&mut self, item_id: &str, comment_id: &str) {
        let Some(list) = self.comments.get_mut(item_id) else {
            return;
        };
        let before = list.len();
        list.retain(|comment| comment.id != comment_id);
        if list.len() != before {
            self.persist_comments();
        }
    }

    fn persist_likes(&mut self) {
        persist_map(self.store.as_mut(), LIKES_KEY, &self.likes);
    }

    fn persist_comments(&mut self) {
        persist_map(self.store.as_mut(), COMMENTS_KEY, &self.comments);
    }
}

fn load_map<T: serde::de::DeserializeOwned>(store: &dyn KvStore, key: &str) -> HashMap<String, T> {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("could not load {key}, starting empty: {err}");
            HashMap::new()
        }),
        None => HashMap::new(),
    }
}

fn persist_map<T: serde::Serialize>(store: &mut dyn KvStore, key: &str, map: &HashMap<String, T>) {
    match serde_json::to_string(map) {
        Ok(raw) => store.set(key, &raw),
        Err(err) => error!("failed to serialize {key}: {err}"),
    }
}

/// Display name a comment is attributed to.
pub fn comment_author_name(user: &UserProfile) -> String {
    user.name.clone().unwrap_or_else(|| "You".to_string())
}

/// Whether the acting user may delete a comment. Ownership matches on the raw
/// display name, not the "You" attribution fallback, so a nameless user never
/// owns the anonymously-attributed comments. Name-string equality does collide
/// for two users sharing a display name; a stable user id would be the robust
/// key, but comments carry none.
pub fn owns_comment(user: &UserProfile, comment: &Comment) -> bool {
    user.name.as_deref() == Some(comment.author_name.as_str())
}

/// Millisecond timestamp plus a short random token. Not globally unique, but
/// unique enough within one session's local store.
fn generate_comment_id() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("{}_{token}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(id: &str, likes: u32) -> GalleryItem {
        GalleryItem {
            id: id.to_string(),
            description: String::new(),
            images: Vec::new(),
            created_by: None,
            created_at: String::new(),
            likes_count: likes,
        }
    }

    fn user(name: Option<&str>) -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: name.map(str::to_string),
            email: None,
            image_url: Some("https://cdn/me.png".into()),
        }
    }

    fn store() -> EngagementStore {
        EngagementStore::new(Box::new(MemoryKvStore::default()))
    }

    #[test]
    fn comment_ownership_requires_a_real_display_name() {
        let mut store = store();
        let named = user(Some("Ada"));
        let anonymous = user(None);

        let own = store.add_comment("a", "mine", &named).unwrap();
        assert!(owns_comment(&named, &own));
        assert!(!owns_comment(&anonymous, &own));

        // "You"-attributed comments belong to nobody
        let unattributed = store.add_comment("a", "drive-by", &anonymous).unwrap();
        assert_eq!(unattributed.author_name, "You");
        assert!(!owns_comment(&anonymous, &unattributed));
    }

    #[test]
    fn seed_initializes_from_server_counts() {
        let mut store = store();
        store.seed(&[item("a", 7), item("b", 0)]);
        assert_eq!(
            store.record("a"),
            EngagementRecord {
                liked: false,
                count: 7
            }
        );
        assert_eq!(store.comments("a"), &[]);
    }

    #[test]
    fn seed_never_resets_modified_records() {
        let mut store = store();
        store.seed(&[item("a", 7)]);
        store.toggle_like("a");
        store.add_comment("a", "hi", &user(Some("Ada")));
        store.seed(&[item("a", 7)]);
        assert_eq!(
            store.record("a"),
            EngagementRecord {
                liked: true,
                count: 8
            }
        );
        assert_eq!(store.comment_count("a"), 1);
    }

    #[test]
    fn double_toggle_returns_to_original_state() {
        let mut store = store();
        store.seed(&[item("a", 3)]);
        let original = store.record("a");
        store.toggle_like("a");
        store.toggle_like("a");
        assert_eq!(store.record("a"), original);
    }

    #[test]
    fn count_never_goes_negative() {
        let mut store = store();
        store.seed(&[item("a", 0)]);
        // liked=true count=1, then un-like back to 0, then the odd sequence
        for _ in 0..5 {
            store.toggle_like("a");
        }
        assert!(store.record("a").count <= 1);
        store.toggle_like("a");
        assert_eq!(store.record("a").count, 0);
    }

    #[test]
    fn toggle_on_unseeded_id_starts_from_zero() {
        let mut store = store();
        let record = store.toggle_like("ghost");
        assert_eq!(
            record,
            EngagementRecord {
                liked: true,
                count: 1
            }
        );
    }

    #[test]
    fn whitespace_comments_are_rejected() {
        let mut store = store();
        store.seed(&[item("a", 0)]);
        assert!(store.add_comment("a", "", &user(Some("Ada"))).is_none());
        assert!(store.add_comment("a", "   ", &user(Some("Ada"))).is_none());
        assert_eq!(store.comment_count("a"), 0);
    }

    #[test]
    fn add_comment_attributes_acting_user() {
        let mut store = store();
        store.seed(&[item("a", 0)]);
        let comment = store
            .add_comment("a", "  lovely shot  ", &user(Some("Ada")))
            .unwrap();
        assert_eq!(comment.text, "lovely shot");
        assert_eq!(comment.author_name, "Ada");
        assert_eq!(comment.author_image.as_deref(), Some("https://cdn/me.png"));
        assert_eq!(store.comment_count("a"), 1);
    }

    #[test]
    fn anonymous_commenter_falls_back_to_you() {
        let mut store = store();
        let comment = store.add_comment("a", "hi", &user(None)).unwrap();
        assert_eq!(comment.author_name, "You");
    }

    #[test]
    fn remove_comment_targets_only_the_given_id() {
        let mut store = store();
        let first = store.add_comment("a", "one", &user(Some("Ada"))).unwrap();
        let second = store.add_comment("a", "two", &user(Some("Ada"))).unwrap();
        let other = store.add_comment("b", "elsewhere", &user(Some("Ada"))).unwrap();

        store.remove_comment("a", &first.id);
        assert_eq!(store.comments("a").len(), 1);
        assert_eq!(store.comments("a")[0].id, second.id);
        assert_eq!(store.comments("b")[0].id, other.id);

        // Nonexistent id is a no-op
        store.remove_comment("a", "missing");
        assert_eq!(store.comments("a").len(), 1);
        store.remove_comment("nope", "missing");
    }

    #[test]
    fn comment_ids_have_timestamp_and_token() {
        let id = generate_comment_id();
        let (millis, token) = id.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(token.len(), 6);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn state_survives_reload_from_backing_store() {
        let mut kv = MemoryKvStore::default();
        {
            let mut store = EngagementStore::new(Box::new(MemoryKvStore {
                entries: HashMap::new(),
            }));
            store.seed(&[item("a", 2)]);
            store.toggle_like("a");
            store.add_comment("a", "hello", &user(Some("Ada")));
            // copy the persisted entries into the outer store
            kv.entries.insert(
                LIKES_KEY.to_string(),
                store.store.get(LIKES_KEY).unwrap(),
            );
            kv.entries.insert(
                COMMENTS_KEY.to_string(),
                store.store.get(COMMENTS_KEY).unwrap(),
            );
        }
        let reloaded = EngagementStore::new(Box::new(kv));
        assert_eq!(
            reloaded.record("a"),
            EngagementRecord {
                liked: true,
                count: 3
            }
        );
        assert_eq!(reloaded.comment_count("a"), 1);
    }

    #[test]
    fn corrupt_persisted_state_starts_empty() {
        let mut kv = MemoryKvStore::default();
        kv.entries
            .insert(LIKES_KEY.to_string(), "not json".to_string());
        let store = EngagementStore::new(Box::new(kv));
        assert_eq!(
            store.record("a"),
            EngagementRecord {
                liked: false,
                count: 0
            }
        );
    }
}
