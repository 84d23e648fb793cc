use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Denormalized read-only projection served to unauthenticated visitors.
// Participant names and roles are aggregated into a JSON array so the
// public page needs a single query per month.
const CREATE_VIEW: &str = r#"
CREATE VIEW public_schedule AS
SELECT
    s.id,
    s.date,
    s.time,
    s.notes,
    c.name AS community_name,
    COALESCE(
        json_agg(
            json_build_object('full_name', p.full_name, 'role', p.role)
            ORDER BY p.full_name
        ) FILTER (WHERE p.id IS NOT NULL),
        '[]'::json
    ) AS participants
FROM schedule s
JOIN community c ON c.id = s.community_id
LEFT JOIN schedule_participant sp ON sp.schedule_id = s.id
LEFT JOIN person p ON p.id = sp.person_id
GROUP BY s.id, c.name
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(CREATE_VIEW)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP VIEW public_schedule")
            .await?;
        Ok(())
    }
}
