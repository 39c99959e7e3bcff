//! Media upload.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Error;
use crate::http::endpoints::UPLOADS;
use crate::http::{ApiClient, Multipart, OutboundRequest};

/// Kind of media the backend stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Public URL of the stored object.
    pub url: String,
    /// Storage key of the stored object.
    pub key: String,
    pub media_type: MediaType,
}

impl ApiClient {
    /// Upload a file as the `file` part of a multipart form.
    ///
    /// The content type of the request is left to the transport so the
    /// multipart boundary is correct; `mime` only labels the part.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(
        &self,
        filename: &str,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, Error> {
        let form = Multipart::new().file("file", filename, mime.map(str::to_string), bytes);
        self.send_json(OutboundRequest::post(UPLOADS).multipart(form))
            .await
    }
}
