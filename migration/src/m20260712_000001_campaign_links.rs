//! campaign_links 表迁移
//!
//! 每行对应一个可追踪的短链接：短码、可选自定义别名、目标落地页
//! 以及反范式化的视频元数据（标题、缩略图）。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CampaignLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CampaignLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::CampaignId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::ShortCode)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::CustomAlias)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::DestinationUrl)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::VideoId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CampaignLinks::VideoTitle).text().null())
                    .col(ColumnDef::new(CampaignLinks::VideoThumbnail).text().null())
                    .col(
                        ColumnDef::new(CampaignLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignLinks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 短码与别名共享一个解析命名空间，两者都必须全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaign_links_short_code")
                    .table(CampaignLinks::Table)
                    .col(CampaignLinks::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaign_links_custom_alias")
                    .table(CampaignLinks::Table)
                    .col(CampaignLinks::CustomAlias)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // campaign_id 索引（用于 per-campaign 聚合查询）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaign_links_campaign_id")
                    .table(CampaignLinks::Table)
                    .col(CampaignLinks::CampaignId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_campaign_links_campaign_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_campaign_links_custom_alias")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_campaign_links_short_code")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CampaignLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CampaignLinks {
    #[sea_orm(iden = "campaign_links")]
    Table,
    Id,
    CampaignId,
    ShortCode,
    CustomAlias,
    DestinationUrl,
    VideoId,
    VideoTitle,
    VideoThumbnail,
    CreatedAt,
    UpdatedAt,
}
