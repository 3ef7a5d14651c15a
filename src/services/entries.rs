use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, SelectTwo, Set, TransactionTrait,
};
use sea_orm::sea_query::SimpleExpr;
use uuid::Uuid;

use crate::entities::{entry, project};
use crate::error::AppError;
use crate::services::projects;
use crate::services::storage::UploadStore;

const ENTRY_NAME_TAKEN: &str = "An entry with this name already exists";

#[derive(Debug, Clone)]
pub struct EntryInput {
    pub name: String,
    pub project_id: Uuid,
}

/// An entry with its parent project loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDetail {
    pub entry: entry::Model,
    pub project: project::Model,
}

#[derive(Clone)]
pub struct EntryStore {
    db: DatabaseConnection,
    uploads: UploadStore,
}

impl EntryStore {
    pub fn new(db: DatabaseConnection, uploads: UploadStore) -> Self {
        Self { db, uploads }
    }

    /// Creates an entry under one of the caller's projects. Project lookup and
    /// insert share one transaction.
    pub async fn create(
        &self,
        input: EntryInput,
        img_url: String,
        owner_id: Uuid,
    ) -> Result<EntryDetail, AppError> {
        let detail = self
            .db
            .transaction::<_, EntryDetail, AppError>(move |txn| {
                Box::pin(async move {
                    let project = projects::find_owned_by_id(txn, input.project_id, owner_id)
                        .await?
                        .ok_or_else(project_not_found)?;
                    insert_entry(txn, input.name, img_url, owner_id, project).await
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "create entry"))?;

        tracing::info!(entry_id = %detail.entry.id, project_id = %detail.project.id, user_id = %owner_id, "Entry created");
        Ok(detail)
    }

    pub async fn find_all(&self, owner_id: Uuid) -> Result<Vec<EntryDetail>, AppError> {
        load_all(
            &self.db,
            with_project().filter(entry::Column::UserId.eq(owner_id)),
        )
        .await
    }

    pub async fn find_by_project(
        &self,
        owner_id: Uuid,
        project_id: Uuid,
    ) -> Result<Vec<EntryDetail>, AppError> {
        load_all(
            &self.db,
            with_project()
                .filter(entry::Column::UserId.eq(owner_id))
                .filter(entry::Column::ProjectId.eq(project_id)),
        )
        .await
    }

    pub async fn remove(&self, id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .delete_where(entry::Column::Id.eq(id).and(entry::Column::UserId.eq(owner_id)))
            .await?;

        tracing::info!(entry_id = %id, user_id = %owner_id, "Entry deleted");
        self.uploads.discard_url(&removed.img_url).await;
        Ok(())
    }

    /// Renames the entry and moves it under another of the caller's projects,
    /// re-stamping the API key from that project.
    pub async fn update(
        &self,
        id: Uuid,
        input: EntryInput,
        owner_id: Uuid,
    ) -> Result<EntryDetail, AppError> {
        let detail = self
            .db
            .transaction::<_, EntryDetail, AppError>(move |txn| {
                Box::pin(async move {
                    let entry = entry::Entity::find_by_id(id)
                        .filter(entry::Column::UserId.eq(owner_id))
                        .one(txn)
                        .await?
                        .ok_or_else(entry_not_found)?;

                    let project = projects::find_owned_by_id(txn, input.project_id, owner_id)
                        .await?
                        .ok_or_else(project_not_found)?;

                    save_changes(txn, entry, input.name, project).await
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "update entry"))?;

        tracing::info!(entry_id = %id, project_id = %detail.project.id, user_id = %owner_id, "Entry updated");
        Ok(detail)
    }

    pub async fn find_entries_by_api_key(&self, api_key: &str) -> Result<Vec<EntryDetail>, AppError> {
        load_all(&self.db, with_project().filter(entry::Column::ApiKey.eq(api_key))).await
    }

    /// The oldest entry under the key, if any.
    pub async fn find_one_by_api_key(&self, api_key: &str) -> Result<Option<EntryDetail>, AppError> {
        with_project()
            .filter(entry::Column::ApiKey.eq(api_key))
            .one(&self.db)
            .await?
            .map(into_detail)
            .transpose()
    }

    /// Creates an entry under the project owning `api_key`; ownership is
    /// inherited from that project.
    pub async fn add_by_api_key(
        &self,
        api_key: &str,
        name: String,
        img_url: String,
    ) -> Result<EntryDetail, AppError> {
        let api_key = api_key.to_string();
        let detail = self
            .db
            .transaction::<_, EntryDetail, AppError>(move |txn| {
                Box::pin(async move {
                    let project = projects::find_by_api_key(txn, &api_key)
                        .await?
                        .ok_or_else(project_not_found)?;
                    let owner_id = project.user_id;
                    insert_entry(txn, name, img_url, owner_id, project).await
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "create entry"))?;

        tracing::info!(entry_id = %detail.entry.id, project_id = %detail.project.id, "Entry created via API key");
        Ok(detail)
    }

    pub async fn remove_by_api_key(&self, api_key: &str, entry_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .delete_where(entry::Column::Id.eq(entry_id).and(entry::Column::ApiKey.eq(api_key)))
            .await?;

        tracing::info!(entry_id = %entry_id, project_id = %removed.project_id, "Entry deleted via API key");
        self.uploads.discard_url(&removed.img_url).await;
        Ok(())
    }

    pub async fn update_by_api_key(
        &self,
        api_key: &str,
        entry_id: Uuid,
        name: String,
    ) -> Result<EntryDetail, AppError> {
        let api_key = api_key.to_string();
        let detail = self
            .db
            .transaction::<_, EntryDetail, AppError>(move |txn| {
                Box::pin(async move {
                    let entry = entry::Entity::find_by_id(entry_id)
                        .filter(entry::Column::ApiKey.eq(api_key.as_str()))
                        .one(txn)
                        .await?
                        .ok_or_else(entry_not_found)?;

                    let project = projects::find_by_api_key(txn, &api_key)
                        .await?
                        .ok_or_else(project_not_found)?;

                    save_changes(txn, entry, name, project).await
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "update entry"))?;

        tracing::info!(entry_id = %entry_id, project_id = %detail.project.id, "Entry updated via API key");
        Ok(detail)
    }

    /// Deletes the single entry matching `condition` and returns it.
    async fn delete_where(&self, condition: SimpleExpr) -> Result<entry::Model, AppError> {
        self.db
            .transaction::<_, entry::Model, AppError>(move |txn| {
                Box::pin(async move {
                    let entry = entry::Entity::find()
                        .filter(condition)
                        .one(txn)
                        .await?
                        .ok_or_else(entry_not_found)?;

                    let result = entry::Entity::delete_by_id(entry.id).exec(txn).await?;
                    if result.rows_affected == 0 {
                        return Err(entry_not_found());
                    }
                    Ok(entry)
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "delete entry"))
    }
}

fn with_project() -> SelectTwo<entry::Entity, project::Entity> {
    entry::Entity::find()
        .find_also_related(project::Entity)
        .order_by_asc(entry::Column::CreatedAt)
        .order_by_asc(entry::Column::Id)
}

async fn load_all<C: ConnectionTrait>(
    conn: &C,
    query: SelectTwo<entry::Entity, project::Entity>,
) -> Result<Vec<EntryDetail>, AppError> {
    query
        .all(conn)
        .await?
        .into_iter()
        .map(into_detail)
        .collect()
}

fn into_detail((entry, project): (entry::Model, Option<project::Model>)) -> Result<EntryDetail, AppError> {
    let project = project.ok_or_else(|| {
        tracing::error!(entry_id = %entry.id, "Entry references a missing project");
        AppError::InternalServerError("Orphaned entry".to_string())
    })?;
    Ok(EntryDetail { entry, project })
}

async fn insert_entry<C: ConnectionTrait>(
    conn: &C,
    name: String,
    img_url: String,
    owner_id: Uuid,
    project: project::Model,
) -> Result<EntryDetail, AppError> {
    let now = chrono::Utc::now().naive_utc();
    let entry = entry::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        img_url: Set(img_url),
        user_id: Set(owner_id),
        api_key: Set(project.api_key.clone()),
        project_id: Set(project.id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let entry = entry
        .insert(conn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, ENTRY_NAME_TAKEN))?;
    Ok(EntryDetail { entry, project })
}

async fn save_changes<C: ConnectionTrait>(
    conn: &C,
    entry: entry::Model,
    name: String,
    project: project::Model,
) -> Result<EntryDetail, AppError> {
    let mut active_entry = entry.into_active_model();
    active_entry.name = Set(name);
    active_entry.project_id = Set(project.id);
    active_entry.api_key = Set(project.api_key.clone());
    active_entry.updated_at = Set(chrono::Utc::now().naive_utc());

    let entry = active_entry
        .update(conn)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, ENTRY_NAME_TAKEN))?;
    Ok(EntryDetail { entry, project })
}

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".to_string())
}

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}
