//! conversion_events 表迁移
//!
//! 归因窗口校验通过后写入的转化事件。revenue 以整数分存储，
//! 保证汇总精确到分。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConversionEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversionEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConversionEvents::TrackingId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversionEvents::LinkId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversionEvents::Kind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversionEvents::RevenueCents)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(ConversionEvents::EventData).json().null())
                    .col(
                        ColumnDef::new(ConversionEvents::ConvertedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversion_events_tracking_id")
                    .table(ConversionEvents::Table)
                    .col(ConversionEvents::TrackingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversion_events_link_id")
                    .table(ConversionEvents::Table)
                    .col(ConversionEvents::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversion_events_converted_at")
                    .table(ConversionEvents::Table)
                    .col(ConversionEvents::ConvertedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_conversion_events_converted_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_conversion_events_link_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_conversion_events_tracking_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ConversionEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConversionEvents {
    #[sea_orm(iden = "conversion_events")]
    Table,
    Id,
    TrackingId,
    LinkId,
    Kind,
    RevenueCents,
    EventData,
    ConvertedAt,
}
