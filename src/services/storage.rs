use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use url::Url;
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::file_extension;

/// Public path prefix under which stored uploads are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Local-disk store for uploaded entry files.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            tracing::error!(error = %e, path = %self.root.display(), "Cannot create upload directory");
            AppError::InternalServerError("Upload storage unavailable".to_string())
        })
    }

    /// Writes `data` under a freshly generated name and returns that name.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        let file_name = generated_file_name(original_name);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, data).await.map_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "Failed to write upload");
            AppError::InternalServerError("Failed to store uploaded file".to_string())
        })?;

        tracing::debug!(file = %file_name, size = data.len(), "Stored upload");
        Ok(file_name)
    }

    /// Best-effort removal of a stored file.
    pub async fn discard(&self, file_name: &str) {
        if !is_plain_file_name(file_name) {
            tracing::warn!(file = %file_name, "Refusing to remove suspicious upload name");
            return;
        }

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => tracing::debug!(file = %file_name, "Removed upload"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, file = %file_name, "Failed to remove upload"),
        }
    }

    /// Removes the file behind an entry's public URL.
    pub async fn discard_url(&self, img_url: &str) {
        match file_name_from_url(img_url) {
            Some(file_name) => self.discard(&file_name).await,
            None => tracing::warn!(url = %img_url, "Upload URL does not name a stored file"),
        }
    }
}

/// `<uuid v4><.ext>`, keeping the original extension.
pub fn generated_file_name(original_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), file_extension(original_name))
}

/// Absolute URL of a stored upload.
pub fn upload_url(base_url: &str, file_name: &str) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), UPLOADS_ROUTE, file_name)
}

fn file_name_from_url(img_url: &str) -> Option<String> {
    let url = Url::parse(img_url).ok()?;
    let stored = url.path().strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
    if stored.contains('/') {
        return None;
    }

    let file_name = url.path_segments()?.last()?;
    is_plain_file_name(file_name).then(|| file_name.to_string())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && name != ".."
}
