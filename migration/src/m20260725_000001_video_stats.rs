//! video_stats 表迁移
//!
//! 外部视频播放量缓存，按 video_id 作主键。由采集方刷新，
//! 本服务只读（CTR 计算用）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoStats::VideoId)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VideoStats::ViewCount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VideoStats::RefreshedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VideoStats {
    #[sea_orm(iden = "video_stats")]
    Table,
    VideoId,
    ViewCount,
    RefreshedAt,
}
