use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{entry, project};
use crate::error::AppError;
use crate::services::storage::UploadStore;
use crate::utils::{generate_api_key, slugify};

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Owner-scoped access to projects.
#[derive(Clone)]
pub struct ProjectStore {
    db: DatabaseConnection,
    uploads: UploadStore,
}

impl ProjectStore {
    pub fn new(db: DatabaseConnection, uploads: UploadStore) -> Self {
        Self { db, uploads }
    }

    pub async fn create(&self, input: NewProject, owner_id: Uuid) -> Result<project::Model, AppError> {
        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(AppError::Validation(
                "name must contain at least one letter or digit".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let project = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            slug: Set(slug),
            user_id: Set(owner_id),
            api_key: Set(generate_api_key()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = project
            .insert(&self.db)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "A project with this slug already exists"))?;

        tracing::info!(project_id = %created.id, user_id = %owner_id, slug = %created.slug, "Project created");
        Ok(created)
    }

    pub async fn find_all(&self, owner_id: Uuid) -> Result<Vec<project::Model>, AppError> {
        let projects = project::Entity::find()
            .filter(project::Column::UserId.eq(owner_id))
            .order_by_asc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(projects)
    }

    pub async fn find_one(&self, slug: &str, owner_id: Uuid) -> Result<project::Model, AppError> {
        find_owned_by_slug(&self.db, slug, owner_id)
            .await?
            .ok_or_else(|| not_found(slug))
    }

    /// Merges the given fields; the slug never changes.
    pub async fn update(
        &self,
        slug: &str,
        owner_id: Uuid,
        changes: ProjectChanges,
    ) -> Result<project::Model, AppError> {
        let project = self.find_one(slug, owner_id).await?;

        let mut active_project = project.into_active_model();
        if let Some(name) = changes.name {
            active_project.name = Set(name);
        }
        if let Some(description) = changes.description {
            active_project.description = Set(description);
        }
        active_project.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active_project.update(&self.db).await?;
        tracing::info!(project_id = %updated.id, user_id = %owner_id, "Project updated");
        Ok(updated)
    }

    /// Deletes the project together with its entries, then their files.
    pub async fn remove(&self, slug: &str, owner_id: Uuid) -> Result<(), AppError> {
        let slug = slug.to_string();
        let (project_id, img_urls) = self
            .db
            .transaction::<_, (Uuid, Vec<String>), AppError>(move |txn| {
                Box::pin(async move {
                    let project = find_owned_by_slug(txn, &slug, owner_id)
                        .await?
                        .ok_or_else(|| not_found(&slug))?;

                    let img_urls: Vec<String> = entry::Entity::find()
                        .select_only()
                        .column(entry::Column::ImgUrl)
                        .filter(entry::Column::ProjectId.eq(project.id))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    entry::Entity::delete_many()
                        .filter(entry::Column::ProjectId.eq(project.id))
                        .exec(txn)
                        .await?;
                    project::Entity::delete_by_id(project.id).exec(txn).await?;

                    Ok((project.id, img_urls))
                })
            })
            .await
            .map_err(|e| AppError::from_transaction(e, "delete project"))?;

        tracing::info!(
            project_id = %project_id,
            user_id = %owner_id,
            entries = img_urls.len(),
            "Project deleted"
        );

        for img_url in &img_urls {
            self.uploads.discard_url(img_url).await;
        }
        Ok(())
    }

    /// Unscoped lookup; the key itself is the credential.
    pub async fn find_by_api_key(&self, api_key: &str) -> Result<Option<project::Model>, AppError> {
        Ok(find_by_api_key(&self.db, api_key).await?)
    }
}

pub(crate) async fn find_owned_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    owner_id: Uuid,
) -> Result<Option<project::Model>, DbErr> {
    project::Entity::find()
        .filter(project::Column::Slug.eq(slug))
        .filter(project::Column::UserId.eq(owner_id))
        .one(conn)
        .await
}

pub(crate) async fn find_owned_by_id<C: ConnectionTrait>(
    conn: &C,
    project_id: Uuid,
    owner_id: Uuid,
) -> Result<Option<project::Model>, DbErr> {
    project::Entity::find_by_id(project_id)
        .filter(project::Column::UserId.eq(owner_id))
        .one(conn)
        .await
}

pub(crate) async fn find_by_api_key<C: ConnectionTrait>(
    conn: &C,
    api_key: &str,
) -> Result<Option<project::Model>, DbErr> {
    project::Entity::find()
        .filter(project::Column::ApiKey.eq(api_key))
        .one(conn)
        .await
}

fn not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("Project with slug {slug} not found"))
}
