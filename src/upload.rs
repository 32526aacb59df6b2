//! Two-phase image upload: ask the backend for a signed storage URL, then PUT
//! the raw bytes straight to it. The backend answers with the public URL the
//! gallery item should reference.

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::api::{read_success_body, ApiClient};
use crate::error::ApiError;
use crate::models::UploadTicket;

pub fn upload_image(api: &ApiClient, bytes: Vec<u8>, mime: &str) -> Result<String, ApiError> {
    let ticket = request_upload_ticket(api, mime)?;
    put_to_signed_url(api, &ticket.url, bytes, mime)?;
    let public = absolutize_public_url(api.base_url(), &ticket.public_url);
    info!("uploaded image ({mime}) -> {public}");
    Ok(public)
}

fn request_upload_ticket(api: &ApiClient, mime: &str) -> Result<UploadTicket, ApiError> {
    let endpoint = format!("{}/api/gallery/images", api.base_url());
    let response = api
        .http()
        .post(endpoint)
        .json(&serde_json::json!({ "fileType": mime }))
        .send()?;
    let body = read_success_body(response)?;
    parse_upload_ticket(&body)
}

fn put_to_signed_url(
    api: &ApiClient,
    signed_url: &str,
    bytes: Vec<u8>,
    mime: &str,
) -> Result<(), ApiError> {
    let response = api
        .http()
        .put(signed_url)
        .header(reqwest::header::CONTENT_TYPE, mime)
        .body(bytes)
        .send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Server {
            status: status.as_u16(),
            body: format!("storage upload failed with status {}", status.as_u16()),
        });
    }
    Ok(())
}

/// Both fields are required; the backend occasionally answers 200 with a
/// partial body when the signer is misconfigured.
pub(crate) fn parse_upload_ticket(body: &str) -> Result<UploadTicket, ApiError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawTicket {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        public_url: Option<String>,
    }

    let raw: RawTicket = serde_json::from_str(body)
        .map_err(|_| ApiError::malformed("invalid server response format"))?;
    match (raw.url, raw.public_url) {
        (Some(url), Some(public_url)) if !url.is_empty() && !public_url.is_empty() => {
            Ok(UploadTicket { url, public_url })
        }
        _ => Err(ApiError::malformed("invalid server response format")),
    }
}

/// The signer may hand back a path relative to the API host; callers always
/// get an absolute URL.
pub(crate) fn absolutize_public_url(base_url: &str, public_url: &str) -> String {
    if public_url.starts_with("http://") || public_url.starts_with("https://") {
        public_url.to_string()
    } else if public_url.starts_with('/') {
        format!("{base_url}{public_url}")
    } else {
        format!("{base_url}/{public_url}")
    }
}

/// MIME type for the picked file, from its extension. The storage PUT and the
/// signer both key off this.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ticket_parses_when_both_fields_present() {
        let ticket =
            parse_upload_ticket(r#"{"url":"https://u","publicUrl":"https://p/img.png"}"#).unwrap();
        assert_eq!(ticket.url, "https://u");
        assert_eq!(ticket.public_url, "https://p/img.png");
    }

    #[test]
    fn ticket_rejects_missing_fields() {
        for body in [
            r#"{"url":"https://u"}"#,
            r#"{"publicUrl":"https://p"}"#,
            r#"{"url":"","publicUrl":"https://p"}"#,
            r#"{}"#,
            "not json",
        ] {
            let err = parse_upload_ticket(body).unwrap_err();
            assert_eq!(err.to_string(), "invalid server response format");
        }
    }

    #[test]
    fn absolute_public_url_passes_through() {
        assert_eq!(
            absolutize_public_url("http://localhost:8080", "https://p/img.png"),
            "https://p/img.png"
        );
    }

    #[test]
    fn relative_public_url_gets_base_prefix() {
        assert_eq!(
            absolutize_public_url("http://localhost:8080", "/img.png"),
            "http://localhost:8080/img.png"
        );
        assert_eq!(
            absolutize_public_url("http://localhost:8080", "img.png"),
            "http://localhost:8080/img.png"
        );
    }

    #[test]
    fn mime_inferred_from_extension() {
        assert_eq!(mime_for_path(&PathBuf::from("a/shot.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(&PathBuf::from("shot.png")), "image/png");
        assert_eq!(
            mime_for_path(&PathBuf::from("mystery")),
            "application/octet-stream"
        );
    }
}
