pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260712_000001_campaign_links;
mod m20260712_000002_click_events;
mod m20260718_000001_conversion_events;
mod m20260725_000001_video_stats;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260712_000001_campaign_links::Migration),
            Box::new(m20260712_000002_click_events::Migration),
            Box::new(m20260718_000001_conversion_events::Migration),
            Box::new(m20260725_000001_video_stats::Migration),
        ]
    }
}
