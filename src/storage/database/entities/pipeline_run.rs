use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pipeline run database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pipeline_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub pipeline_type: String,

    pub status: String,

    pub start_time: DateTimeUtc,

    /// Set once the run reaches a terminal status
    pub end_time: Option<DateTimeUtc>,

    pub error_message: Option<String>,

    /// Free-form metadata object
    pub metadata: Json,
}

/// Pipeline run entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Has many alerts
    #[sea_orm(has_many = "super::alert::Entity")]
    Alert,
}

impl Related<super::alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alert.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
