use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Liturgical role a person can serve in. Stored as a closed string enum so
/// an invalid role cannot reach the database.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Role {
    #[sea_orm(string_value = "acolyte")]
    #[serde(rename = "acolyte")]
    Acolyte,
    #[sea_orm(string_value = "altar-server")]
    #[serde(rename = "altar-server")]
    AltarServer,
    #[sea_orm(string_value = "ceremony-leader")]
    #[serde(rename = "ceremony-leader")]
    CeremonyLeader,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::AltarServer, Role::Acolyte, Role::CeremonyLeader];

    pub fn value(&self) -> &'static str {
        match self {
            Role::Acolyte => "acolyte",
            Role::AltarServer => "altar-server",
            Role::CeremonyLeader => "ceremony-leader",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Acolyte => "Acolyte",
            Role::AltarServer => "Altar server",
            Role::CeremonyLeader => "Ceremony leader",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub community_id: Option<Uuid>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::community::Entity",
        from = "Column::CommunityId",
        to = "super::community::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Community,
    #[sea_orm(has_many = "super::schedule_participant::Entity")]
    ScheduleParticipant,
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl Related<super::schedule_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleParticipant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
