use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Url;

use crate::auth::{wait_for_session, Session, SessionProvider};
use crate::config::TokenWaitConfig;
use crate::error::ApiError;
use crate::models::{CreateGalleryInput, GalleryItem, GalleryListResponse};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    sessions: Arc<dyn SessionProvider>,
    token_wait: TokenWaitConfig,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionProvider>,
        token_wait: TokenWaitConfig,
    ) -> Result<Self, ApiError> {
        let base = sanitize_base_url(base_url.into())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base_url: base,
            client,
            sessions,
            token_wait,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), ApiError> {
        self.base_url = sanitize_base_url(base_url.into())?;
        Ok(())
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Resolves the bearer token, waiting (bounded) for the identity session.
    fn session(&self) -> Result<Session, ApiError> {
        wait_for_session(self.sessions.as_ref(), self.token_wait)
    }

    pub fn list_items(&self) -> Result<Vec<GalleryItem>, ApiError> {
        let url = self.url("/gallery")?;
        let token = self.session()?.token;
        let response = self.client.get(url).bearer_auth(token).send()?;
        let body = read_success_body(response)?;
        let parsed: GalleryListResponse = serde_json::from_str(&body)
            .map_err(|err| ApiError::malformed(format!("unexpected gallery list body: {err}")))?;
        Ok(parsed.into_items())
    }

    pub fn create_item(&self, input: &CreateGalleryInput) -> Result<GalleryItem, ApiError> {
        let url = self.url("/gallery")?;
        let token = self.session()?.token;
        let response = self.client.post(url).bearer_auth(token).json(input).send()?;
        let body = read_success_body(response)?;
        serde_json::from_str(&body)
            .map_err(|err| ApiError::malformed(format!("unexpected created item body: {err}")))
    }

    pub fn delete_item(&self, item_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/gallery/{item_id}"))?;
        let token = self.session()?.token;
        let response = self.client.delete(url).bearer_auth(token).send()?;
        read_success_body(response)?;
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
        url.set_path(path.trim_start_matches('/'));
        Ok(url)
    }
}

/// Consumes the response, turning non-2xx statuses into [`ApiError::Server`]
/// with the body text attached for the user-facing message.
pub(crate) fn read_success_body(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

/// Plain client for unauthenticated fetches (image downloads and the signed
/// storage PUT). Built once and cloned; `reqwest::blocking::Client` is
/// internally reference-counted.
pub fn shared_client() -> Result<Client, ApiError> {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client.clone());
    }
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(CLIENT.get_or_init(|| client).clone())
}

fn sanitize_base_url(mut base: String) -> Result<String, ApiError> {
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    // Remove trailing slash for consistency
    while base.ends_with('/') {
        base.pop();
    }
    // Validate once
    Url::parse(&base).map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sanitize_defaults_scheme_and_strips_trailing_slash() {
        assert_eq!(
            sanitize_base_url("localhost:8080/".into()).unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            sanitize_base_url("https://api.example.com///".into()).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn sanitize_rejects_garbage() {
        assert!(sanitize_base_url("http://".into()).is_err());
    }
}
