pub use sea_orm_migration::prelude::*;

mod iden;
mod m20260829_000001_create_tables;
mod m20260829_000002_user_table;
mod m20260829_000003_public_schedule_view;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_create_tables::Migration),
            Box::new(m20260829_000002_user_table::Migration),
            Box::new(m20260829_000003_public_schedule_view::Migration),
        ]
    }
}
