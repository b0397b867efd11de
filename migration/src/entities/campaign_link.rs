use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "campaign_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub campaign_id: i64,
    #[sea_orm(unique)]
    pub short_code: String,
    #[sea_orm(unique)]
    pub custom_alias: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub destination_url: String,
    pub video_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub video_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub video_thumbnail: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
