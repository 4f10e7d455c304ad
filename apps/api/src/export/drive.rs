//! Google Drive v3 document store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DocumentStore, ExportError};
use crate::credentials::ManagedCredential;

const UPLOAD_URI: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,webViewLink";

/// Drive converts the uploaded text into this on the way in.
const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";

const BOUNDARY: &str = "jobflow_drive_upload_boundary";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFile {
    id: Option<String>,
    web_view_link: Option<String>,
}

#[derive(Clone)]
pub struct DriveDocumentStore {
    http: Client,
    upload_uri: String,
}

impl DriveDocumentStore {
    pub fn new(timeout: Duration) -> Result<Self, ExportError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            upload_uri: UPLOAD_URI.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for DriveDocumentStore {
    async fn upload(
        &self,
        credential: &mut ManagedCredential,
        file_name: &str,
        mime_type: &str,
        content: &str,
    ) -> Result<String, ExportError> {
        let bearer = credential.authorize().await?;
        let body = multipart_body(file_name, mime_type, content);

        let response = self
            .http
            .post(&self.upload_uri)
            .bearer_auth(bearer)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Upload {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let created: CreatedFile = response.json().await?;
        debug!("Drive file created: {:?}", created.id);
        created.web_view_link.ok_or(ExportError::MissingLink)
    }
}

/// metadata part + media part, per the Drive multipart upload protocol.
fn multipart_body(file_name: &str, mime_type: &str, content: &str) -> String {
    let metadata = json!({
        "name": file_name,
        "mimeType": GOOGLE_DOC_MIME,
    });
    format!(
        "--{BOUNDARY}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{BOUNDARY}\r\n\
         Content-Type: {mime_type}; charset=UTF-8\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}
