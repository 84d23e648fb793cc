use sea_orm_migration::prelude::*;

// Define table names
#[derive(DeriveIden)]
pub enum Community {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum Person {
    Table,
    Id,
    FullName,
    Role,
    CommunityId,
    Phone,
    Active,
}

#[derive(DeriveIden)]
pub enum Schedule {
    Table,
    Id,
    Date,
    Time,
    CommunityId,
    Notes,
    CreatedBy,
}

#[derive(DeriveIden)]
pub enum ScheduleParticipant {
    Table,
    Id,
    #[allow(clippy::enum_variant_names)]
    ScheduleId,
    PersonId,
}

#[derive(DeriveIden)]
pub enum AppUser {
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    IsAdmin,
}
