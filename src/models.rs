use serde::{Deserialize, Serialize};

use crate::auth::UserProfile;

/// Author metadata embedded in a gallery item, as the backend serializes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_by: Option<Author>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub likes_count: u32,
}

/// The list endpoint answers either a bare array or an `{ "items": [...] }`
/// envelope depending on backend version.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GalleryListResponse {
    Items(Vec<GalleryItem>),
    Envelope {
        #[serde(default)]
        items: Vec<GalleryItem>,
    },
}

impl GalleryListResponse {
    pub fn into_items(self) -> Vec<GalleryItem> {
        match self {
            GalleryListResponse::Items(items) => items,
            GalleryListResponse::Envelope { items } => items,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryInput {
    pub description: String,
    pub images: Vec<String>,
    pub created_by: Author,
}

impl CreateGalleryInput {
    /// Builds the create payload the way the backend expects it, embedding
    /// the acting user as the author.
    pub fn new(description: &str, image_url: &str, user: &UserProfile) -> Self {
        let images = if image_url.is_empty() {
            Vec::new()
        } else {
            vec![image_url.to_string()]
        };
        Self {
            description: description.trim().to_string(),
            images,
            created_by: Author {
                id: Some(user.id.clone()),
                name: Some(user.display_name().to_string()),
                email: user.email.clone(),
                image_url: user.image_url.clone(),
            },
        }
    }
}

/// Signed-upload descriptor returned by `POST /api/gallery/images`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub url: String,
    pub public_url: String,
}

/// Client-local like state for one gallery item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub liked: bool,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author_name: String,
    #[serde(default)]
    pub author_image: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_response_decodes_bare_array() {
        let body = r#"[{"_id":"a1","description":"sunset","images":["https://x/y.png"],
            "createdAt":"2024-05-01T10:00:00Z","likesCount":3}]"#;
        let parsed: GalleryListResponse = serde_json::from_str(body).unwrap();
        let items = parsed.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a1");
        assert_eq!(items[0].likes_count, 3);
    }

    #[test]
    fn list_response_decodes_items_envelope() {
        let body = r#"{"items":[{"_id":"a2","description":"dunes"}]}"#;
        let parsed: GalleryListResponse = serde_json::from_str(body).unwrap();
        let items = parsed.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a2");
        assert_eq!(items[0].likes_count, 0);
        assert!(items[0].images.is_empty());
    }

    #[test]
    fn create_input_embeds_acting_user() {
        let user = UserProfile {
            id: "u1".into(),
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            image_url: Some("https://cdn/avatar.png".into()),
        };
        let input = CreateGalleryInput::new("  a fine shot  ", "https://p/img.png", &user);
        assert_eq!(input.description, "a fine shot");
        assert_eq!(input.images, vec!["https://p/img.png".to_string()]);
        assert_eq!(input.created_by.id.as_deref(), Some("u1"));
        assert_eq!(input.created_by.name.as_deref(), Some("Ada"));
        assert_eq!(input.created_by.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn create_input_serializes_camel_case() {
        let user = UserProfile {
            id: "u1".into(),
            name: None,
            email: None,
            image_url: None,
        };
        let input = CreateGalleryInput::new("five!", "https://p/i.png", &user);
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("createdBy").is_some());
        assert_eq!(json["createdBy"]["name"], "Anonymous");
    }
}
