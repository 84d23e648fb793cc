use sea_orm_migration::{prelude::*, schema::*};

use crate::iden::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Community Table
        let table = table_auto(Community::Table)
            .col(pk_uuid(Community::Id))
            .col(string(Community::Name))
            .to_owned();
        manager.create_table(table).await?;

        // Create Person Table
        let table = table_auto(Person::Table)
            .col(pk_uuid(Person::Id))
            .col(string(Person::FullName))
            .col(string_len(Person::Role, 32))
            .col(uuid_null(Person::CommunityId))
            .col(string_null(Person::Phone))
            .col(boolean(Person::Active).default(true))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_person_community")
                    .from(Person::Table, Person::CommunityId)
                    .to(Community::Table, Community::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        manager.create_table(table).await?;

        // Create Schedule Table
        let table = table_auto(Schedule::Table)
            .col(pk_uuid(Schedule::Id))
            .col(date(Schedule::Date))
            .col(string_len(Schedule::Time, 8))
            .col(uuid(Schedule::CommunityId))
            .col(string_null(Schedule::Notes))
            .col(uuid_null(Schedule::CreatedBy))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_schedule_community")
                    .from(Schedule::Table, Schedule::CommunityId)
                    .to(Community::Table, Community::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schedule_date")
                    .table(Schedule::Table)
                    .col(Schedule::Date)
                    .to_owned(),
            )
            .await?;

        // Create ScheduleParticipant Table
        let table = table_auto(ScheduleParticipant::Table)
            .col(pk_uuid(ScheduleParticipant::Id))
            .col(uuid(ScheduleParticipant::ScheduleId))
            .col(uuid(ScheduleParticipant::PersonId))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_participant_schedule")
                    .from(ScheduleParticipant::Table, ScheduleParticipant::ScheduleId)
                    .to(Schedule::Table, Schedule::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_participant_person")
                    .from(ScheduleParticipant::Table, ScheduleParticipant::PersonId)
                    .to(Person::Table, Person::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        manager.create_table(table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleParticipant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedule::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Person::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Community::Table).to_owned())
            .await?;

        Ok(())
    }
}
