use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metric sample database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metric_samples")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning service name
    pub service: String,

    /// Metric type tag
    pub metric_type: String,

    pub value: f64,

    pub timestamp: DateTimeUtc,
}

/// Metric sample entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Belongs to service relation
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::Service",
        to = "super::service::Column::Name",
        on_delete = "Cascade"
    )]
    Service,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
