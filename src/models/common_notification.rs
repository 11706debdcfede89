use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per broadcast event, visible to the whole admin role. A null
/// `user_id` means broadcast; no complaint id ever appears on this shape.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "common_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<i32>,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub event_type: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub context_type: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(50))", nullable)]
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub payload: Option<Json>,
    pub marked_read_at: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
