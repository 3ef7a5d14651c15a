use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Entries::ImgUrl).text().not_null())
                    .col(ColumnDef::new(Entries::UserId).uuid().not_null())
                    .col(ColumnDef::new(Entries::ApiKey).string_len(64).not_null())
                    .col(ColumnDef::new(Entries::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Entries::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Entries::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_project_id")
                            .from(Entries::Table, Entries::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_user_id")
                    .table(Entries::Table)
                    .col(Entries::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_api_key")
                    .table(Entries::Table)
                    .col(Entries::ApiKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Entries {
    Table,
    Id,
    Name,
    ImgUrl,
    UserId,
    ApiKey,
    ProjectId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}
