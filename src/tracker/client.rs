//! HTTP client for the tracker's JSON API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{
    ApiEnvelope, FormValue, IndexResponse, TorrentGroupResponse, TorrentQuery, TorrentResponse,
    UploadForm, UploadResponse,
};
use super::{TrackerApi, TrackerError};

/// Default `ajax.php` endpoint, overridable with `RED_API`.
pub const DEFAULT_API_URL: &str = "https://redacted.ch/ajax.php";

/// Client authenticated with an API key that has the "Torrents" capability.
pub struct RedactedClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl RedactedClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(crate::TOOLCHAIN_SIGNATURE)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        action: &'static str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        debug!("GET action={} {:?}", action, query);
        let response = self
            .client
            .get(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[("action", action)])
            .query(query)
            .send()
            .await?;

        // 4xx replies still carry a JSON envelope explaining the failure
        if response.status().is_server_error() {
            response.error_for_status_ref()?;
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        unwrap_envelope(action, envelope)
    }
}

/// Extract `response` from a `status == "success"` envelope.
pub fn unwrap_envelope<T>(action: &'static str, envelope: ApiEnvelope<T>) -> Result<T, TrackerError> {
    if envelope.status != "success" {
        return Err(TrackerError::Api {
            action,
            status: envelope.status,
            message: envelope.error.unwrap_or_default(),
        });
    }
    envelope
        .response
        .ok_or(TrackerError::EmptyResponse { action })
}

fn to_multipart(form: &UploadForm) -> Result<Form, TrackerError> {
    let mut multipart = Form::new();
    for (name, value) in &form.fields {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name.clone(), text.clone()),
            FormValue::File { file_name, bytes } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/x-bittorrent")?;
                multipart.part(name.clone(), part)
            }
        };
    }
    Ok(multipart)
}

#[async_trait]
impl TrackerApi for RedactedClient {
    async fn fetch_index(&self) -> Result<IndexResponse, TrackerError> {
        self.get("index", &[]).await
    }

    async fn fetch_torrent(&self, query: &TorrentQuery) -> Result<TorrentResponse, TrackerError> {
        let (key, value) = query.query_pair();
        self.get("torrent", &[(key, value)]).await
    }

    async fn fetch_torrent_group(
        &self,
        query: &TorrentQuery,
    ) -> Result<TorrentGroupResponse, TrackerError> {
        let (key, value) = query.query_pair();
        self.get("torrentgroup", &[(key, value)]).await
    }

    async fn submit_upload(&self, form: &UploadForm) -> Result<UploadResponse, TrackerError> {
        let multipart = to_multipart(form)?;
        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[("action", "upload")])
            .multipart(multipart)
            .send()
            .await?;

        if response.status().is_server_error() {
            response.error_for_status_ref()?;
        }

        let envelope: ApiEnvelope<UploadResponse> = response.json().await?;
        unwrap_envelope("upload", envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RedactedClient::new(DEFAULT_API_URL, "key");
        assert_eq!(client.api_url(), "https://redacted.ch/ajax.php");
    }

    #[test]
    fn test_unwrap_envelope_success() {
        let envelope = ApiEnvelope {
            status: "success".to_string(),
            response: Some(IndexResponse {
                username: "me".to_string(),
                passkey: "abc".to_string(),
            }),
            error: None,
        };
        let index = unwrap_envelope("index", envelope).unwrap();
        assert_eq!(index.passkey, "abc");
    }

    #[test]
    fn test_unwrap_envelope_failure() {
        let envelope: ApiEnvelope<IndexResponse> = ApiEnvelope {
            status: "failure".to_string(),
            response: None,
            error: Some("bad hash parameter".to_string()),
        };
        let err = unwrap_envelope("torrent", envelope).unwrap_err();
        assert_eq!(err.to_string(), "torrent: failure (bad hash parameter)");
    }

    #[test]
    fn test_unwrap_envelope_empty() {
        let envelope: ApiEnvelope<IndexResponse> = ApiEnvelope {
            status: "success".to_string(),
            response: None,
            error: None,
        };
        assert!(matches!(
            unwrap_envelope("index", envelope),
            Err(TrackerError::EmptyResponse { action: "index" })
        ));
    }

    #[test]
    fn test_to_multipart_accepts_files_and_text() {
        let mut form = UploadForm::default();
        form.text("groupid", "1");
        form.file("file_input", "x.torrent", b"d4:infode".to_vec());
        assert!(to_multipart(&form).is_ok());
    }
}
