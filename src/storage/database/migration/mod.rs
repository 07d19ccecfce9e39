use sea_orm_migration::prelude::*;

mod m20241001_000001_create_services_table;
mod m20241001_000002_create_metric_samples_table;
mod m20241001_000003_create_pipeline_runs_table;
mod m20241001_000004_create_alerts_table;

/// Database migrator for SeaORM
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_services_table::Migration),
            Box::new(m20241001_000002_create_metric_samples_table::Migration),
            Box::new(m20241001_000003_create_pipeline_runs_table::Migration),
            Box::new(m20241001_000004_create_alerts_table::Migration),
        ]
    }
}
