use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = table_auto(AppUser::Table)
            .col(pk_uuid(AppUser::Id))
            .col(string_uniq(AppUser::Email))
            .col(string(AppUser::PasswordHash))
            .col(string(AppUser::FullName))
            .col(boolean(AppUser::IsAdmin).default(false))
            .to_owned();
        manager.create_table(table).await?;

        // Schedules keep a reference to the user that created them.
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_schedule_created_by")
                    .from(Schedule::Table, Schedule::CreatedBy)
                    .to(AppUser::Table, AppUser::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_schedule_created_by")
                    .table(Schedule::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AppUser::Table).to_owned())
            .await?;

        Ok(())
    }
}
