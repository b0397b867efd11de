//! Storage layer
//!
//! `SeaOrmStorage` wraps the SeaORM connection and exposes one impl block
//! per concern: links, clicks, conversions, analytics rollups, video stats.

pub mod analytics;
pub mod clicks;
pub mod conversions;
pub mod links;
pub mod models;
pub mod video_stats;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{LinktrailError, Result};
use migration::{Migrator, MigratorTrait};

pub use analytics::{
    ConversionFilter, DailyConversionRow, KindBreakdownRow, LinkClickRow, LinkConversionRow,
};
pub use models::{
    CampaignLink, ClickEvent, ConversionEvent, ConversionKind, NewCampaignLink, NewClickEvent,
    NewConversionEvent, VideoStat,
};
pub use video_stats::ViewCountSource;

pub struct SeaOrmStorage {
    db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// Connect to the database and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.sqlx_logging(false);

        let db = Database::connect(options).await.map_err(|e| {
            LinktrailError::database_connection(format!(
                "Failed to connect to '{}': {}",
                database_url, e
            ))
        })?;

        Migrator::up(&db, None).await.map_err(|e| {
            LinktrailError::database_operation(format!("Migration failed: {}", e))
        })?;

        info!("Storage connected ({:?})", db.get_database_backend());

        Ok(Self { db })
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
