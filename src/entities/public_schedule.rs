use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Read-only mapping over the `public_schedule` SQL view. The view joins
/// community names in and aggregates participants into a JSON array of
/// `{full_name, role}` objects; it is never written through this entity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "public_schedule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub time: String,
    pub notes: Option<String>,
    pub community_name: String,
    pub participants: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
