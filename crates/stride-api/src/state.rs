use std::sync::Arc;

use stride_db::Database;
use stride_types::token::TokenSigner;

use crate::error::ApiError;
use crate::uploads::UploadClient;

pub type AppState = Arc<AppStateInner>;

/// Core shared by the auth and media services: the relational store and
/// the token signer built from the configured secret at startup.
pub struct AppStateInner {
    pub db: Database,
    pub signer: TokenSigner,
}

impl AppStateInner {
    /// Runs a store closure on the blocking pool so SQLite work never sits
    /// on the async runtime's worker threads.
    pub async fn query<F, T>(self: &Arc<Self>, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || f(&state.db))
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}")))?
            .map_err(ApiError::Internal)
    }
}

/// State for the media service: the shared core plus the upload-server
/// client used for URL composition and remote media deletes.
#[derive(Clone)]
pub struct MediaState {
    pub app: AppState,
    pub uploads: UploadClient,
}
