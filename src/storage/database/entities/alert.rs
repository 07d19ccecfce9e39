use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alert database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Service the alert refers to (optional)
    pub service: Option<String>,

    /// Pipeline run the alert refers to (optional)
    pub pipeline_run: Option<i64>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Severity level, 1 (low) to 4 (critical)
    pub severity: i16,

    pub timestamp: DateTimeUtc,

    pub acknowledged: bool,

    pub acknowledged_by: Option<String>,

    pub acknowledged_at: Option<DateTimeUtc>,
}

/// Alert entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Belongs to service relation
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::Service",
        to = "super::service::Column::Name",
        on_delete = "SetNull"
    )]
    Service,
    /// Belongs to pipeline run relation
    #[sea_orm(
        belongs_to = "super::pipeline_run::Entity",
        from = "Column::PipelineRun",
        to = "super::pipeline_run::Column::Id",
        on_delete = "SetNull"
    )]
    PipelineRun,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::pipeline_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PipelineRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
