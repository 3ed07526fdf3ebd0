use std::time::Duration;

use tracing::{info, warn};

/// Client for the upload service. Composes public URLs for stored media
/// and issues the best-effort delete call after a post's local row is gone.
#[derive(Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    /// `base_url` without a trailing slash, e.g. `http://localhost:3002`.
    /// The request timeout bounds the remote delete so a stuck upload
    /// server can never stall a post deletion indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL the stored file is served from.
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.base_url, filename)
    }

    /// Thumbnail naming convention shared with the upload service.
    pub fn thumbnail_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}-thumb.png", self.base_url, filename)
    }

    /// Asks the upload service to remove a stored file, forwarding the
    /// caller's token for its own authorization check. Best effort: by the
    /// time this runs the local post row is already committed gone, so a
    /// failure here only orphans the stored file. Logged, never surfaced.
    pub async fn delete_file(&self, post_id: i64, filename: &str, token: &str) {
        let url = format!("{}/delete/{}", self.base_url, filename);
        let result = self.http.delete(&url).bearer_auth(token).send().await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                info!(post_id, filename, "remote media file deleted");
            }
            Ok(resp) => {
                warn!(
                    post_id,
                    filename,
                    status = %resp.status(),
                    "remote media delete rejected, file orphaned"
                );
            }
            Err(e) => {
                warn!(
                    post_id,
                    filename,
                    error = %e,
                    "remote media delete failed, file orphaned"
                );
            }
        }
    }
}
