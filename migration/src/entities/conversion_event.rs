//! Conversion event entity: downstream actions credited to a click

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "conversion_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tracking_id: String,
    pub link_id: i64,
    /// signup | purchase | enrollment
    pub kind: String,
    /// Revenue in integer cents; sums stay exact
    pub revenue_cents: Option<i64>,
    pub event_data: Option<Json>,
    pub converted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
