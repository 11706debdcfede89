use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (recipient, event). Always tied to a complaint; the
/// recipient and complaint ids reference records owned by other
/// subsystems, so there are no foreign keys here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub event_type: String,
    pub complaint_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub payload: Option<Json>,
    pub timeline_event_id: Option<i32>,
    pub read_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
