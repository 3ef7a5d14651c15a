use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::services::entries::EntryStore;
use crate::services::projects::ProjectStore;
use crate::services::storage::UploadStore;

/// Shared handler state. Cloned per request; everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub projects: ProjectStore,
    pub entries: EntryStore,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone());
        Self {
            config: Arc::new(config),
            projects: ProjectStore::new(db.clone(), uploads.clone()),
            entries: EntryStore::new(db, uploads.clone()),
            uploads,
        }
    }
}
