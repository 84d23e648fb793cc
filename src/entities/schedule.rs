use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// The fixed set of mass times a schedule can be created for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum ServiceTime {
    #[sea_orm(string_value = "08:00")]
    #[serde(rename = "08:00")]
    EightAm,
    #[sea_orm(string_value = "10:00")]
    #[serde(rename = "10:00")]
    TenAm,
    #[sea_orm(string_value = "19:30")]
    #[serde(rename = "19:30")]
    SevenThirtyPm,
    #[sea_orm(string_value = "20:00")]
    #[serde(rename = "20:00")]
    EightPm,
}

impl ServiceTime {
    pub const ALL: [ServiceTime; 4] = [
        ServiceTime::EightAm,
        ServiceTime::TenAm,
        ServiceTime::SevenThirtyPm,
        ServiceTime::EightPm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTime::EightAm => "08:00",
            ServiceTime::TenAm => "10:00",
            ServiceTime::SevenThirtyPm => "19:30",
            ServiceTime::EightPm => "20:00",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub time: ServiceTime,
    pub community_id: Uuid,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
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
        on_delete = "Cascade"
    )]
    Community,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(has_many = "super::schedule_participant::Entity")]
    ScheduleParticipant,
}

impl Related<super::community::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::schedule_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleParticipant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
