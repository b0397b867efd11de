use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;

use linktrail::api::routes::{api_routes, health_routes, redirect_routes};
use linktrail::config::init_config;
use linktrail::services::{
    AnalyticsService, AttributionService, ClickService, ConversionService, RetentionService,
    ShortCodeGenerator,
};
use linktrail::storage::SeaOrmStorage;
use linktrail::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = init_config();
    let _log_guard = init_logging(config);

    let storage = Arc::new(
        SeaOrmStorage::connect(&config.database.url)
            .await
            .unwrap_or_else(|e| panic!("Storage init failed: {}", e)),
    );

    let generator = Arc::new(ShortCodeGenerator::new(storage.clone()));
    let clicks = Arc::new(ClickService::new(storage.clone()));
    let conversions = Arc::new(ConversionService::new(storage.clone()));
    let attribution = Arc::new(AttributionService::new(storage.clone()));
    let analytics = Arc::new(AnalyticsService::new(storage.clone()));
    let retention = Arc::new(RetentionService::new(storage.clone()));

    retention.clone().spawn_background_task(
        config.tracking.cleanup_interval_hours,
        config.tracking.click_retention_days,
    );

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(generator.clone()))
            .app_data(web::Data::new(clicks.clone()))
            .app_data(web::Data::new(conversions.clone()))
            .app_data(web::Data::new(attribution.clone()))
            .app_data(web::Data::new(analytics.clone()))
            .app_data(web::Data::new(retention.clone()))
            .service(api_routes().wrap(cors))
            .service(health_routes())
            // 重定向热路径必须最后注册（通配）
            .service(redirect_routes())
    })
    .bind(bind_address)?
    .run()
    .await
}
