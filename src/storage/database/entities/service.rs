use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monitored service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Service name
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,

    /// Current status (`unknown`, `up`, `down`)
    pub status: String,

    /// Health endpoint (optional)
    pub endpoint: Option<String>,

    /// Time of the latest observation
    pub last_check: Option<DateTimeUtc>,

    /// Time of the latest status flip
    pub last_status_change: Option<DateTimeUtc>,

    /// Registration timestamp
    pub created_at: DateTimeUtc,
}

/// Service entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Has many metric samples
    #[sea_orm(has_many = "super::metric_sample::Entity")]
    MetricSample,
    /// Has many alerts
    #[sea_orm(has_many = "super::alert::Entity")]
    Alert,
}

impl Related<super::metric_sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MetricSample.def()
    }
}

impl Related<super::alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alert.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
