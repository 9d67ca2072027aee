use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserConfigs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserConfigs::DomainId).string().not_null())
                    .col(ColumnDef::new(UserConfigs::UserId).string().not_null())
                    .col(ColumnDef::new(UserConfigs::Name).string().not_null())
                    .col(ColumnDef::new(UserConfigs::Data).json().not_null())
                    .col(ColumnDef::new(UserConfigs::Tags).json().not_null())
                    .col(
                        ColumnDef::new(UserConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserConfigs::DomainId)
                            .col(UserConfigs::UserId)
                            .col(UserConfigs::Name),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserConfigs {
    Table,
    DomainId,
    UserId,
    Name,
    Data,
    Tags,
    CreatedAt,
    UpdatedAt,
}
