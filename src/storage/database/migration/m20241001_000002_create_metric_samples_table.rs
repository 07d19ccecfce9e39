use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MetricSamples::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MetricSamples::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MetricSamples::Service)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MetricSamples::MetricType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MetricSamples::Value).double().not_null())
                    .col(
                        ColumnDef::new(MetricSamples::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_metric_samples_service")
                            .from(MetricSamples::Table, MetricSamples::Service)
                            .to(Services::Table, Services::Name)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Range queries filter by service, type and time
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_metric_samples_service_type_timestamp")
                    .table(MetricSamples::Table)
                    .col(MetricSamples::Service)
                    .col(MetricSamples::MetricType)
                    .col(MetricSamples::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_metric_samples_timestamp")
                    .table(MetricSamples::Table)
                    .col(MetricSamples::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MetricSamples::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MetricSamples {
    Table,
    Id,
    Service,
    MetricType,
    Value,
    Timestamp,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Name,
}
