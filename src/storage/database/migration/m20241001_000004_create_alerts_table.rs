use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alerts::Service).string_len(50).null())
                    .col(ColumnDef::new(Alerts::PipelineRun).big_integer().null())
                    .col(ColumnDef::new(Alerts::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Alerts::Message).text().not_null())
                    .col(ColumnDef::new(Alerts::Severity).small_integer().not_null())
                    .col(
                        ColumnDef::new(Alerts::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alerts::Acknowledged)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alerts::AcknowledgedBy).string().null())
                    .col(
                        ColumnDef::new(Alerts::AcknowledgedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_service")
                            .from(Alerts::Table, Alerts::Service)
                            .to(Services::Table, Services::Name)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_pipeline_run")
                            .from(Alerts::Table, Alerts::PipelineRun)
                            .to(PipelineRuns::Table, PipelineRuns::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alerts_acknowledged_severity")
                    .table(Alerts::Table)
                    .col(Alerts::Acknowledged)
                    .col(Alerts::Severity)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alerts_pipeline_run_title")
                    .table(Alerts::Table)
                    .col(Alerts::PipelineRun)
                    .col(Alerts::Title)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Alerts {
    Table,
    Id,
    Service,
    PipelineRun,
    Title,
    Message,
    Severity,
    Timestamp,
    Acknowledged,
    AcknowledgedBy,
    AcknowledgedAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum PipelineRuns {
    Table,
    Id,
}
