//! API 路由配置
//!
//! /api 下按资源拆分子路由；根路径留给重定向热路径。

use actix_web::web;

use super::handlers::analytics::{
    compare_campaigns, get_campaign_analytics, get_campaign_funnel, get_campaign_revenue,
    get_link_analytics, get_link_funnel, get_link_revenue, get_top_links,
};
use super::handlers::attribution::get_attribution;
use super::handlers::cleanup::run_cleanup;
use super::handlers::clicks::batch_record_clicks;
use super::handlers::conversions::record_conversion;
use super::handlers::health::health_check;
use super::handlers::links::{create_link, get_link};
use super::handlers::redirect::handle_redirect;
use super::handlers::videos::{get_video_stat, refresh_video_stat};

/// 链接路由 `/links`
///
/// - POST /links - 创建短链接
/// - GET /links/{id} - 获取单个链接
/// - GET /links/{id}/analytics|funnel|revenue - 单链接分析
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::post().to(create_link))
        // Analytics sub-resources (must be before /{id})
        .route("/{id}/analytics", web::get().to(get_link_analytics))
        .route("/{id}/funnel", web::get().to(get_link_funnel))
        .route("/{id}/revenue", web::get().to(get_link_revenue))
        .route("/{id}", web::get().to(get_link))
}

/// 活动路由 `/campaigns`
pub fn campaigns_routes() -> actix_web::Scope {
    web::scope("/campaigns")
        // /compare must be before /{id}
        .route("/compare", web::get().to(compare_campaigns))
        .route("/{id}/analytics", web::get().to(get_campaign_analytics))
        .route("/{id}/funnel", web::get().to(get_campaign_funnel))
        .route("/{id}/revenue", web::get().to(get_campaign_revenue))
}

/// 转化与归因路由
pub fn conversion_routes() -> actix_web::Scope {
    web::scope("/conversions").route("", web::post().to(record_conversion))
}

pub fn attribution_routes() -> actix_web::Scope {
    web::scope("/attribution").route("/{tracking_id}", web::get().to(get_attribution))
}

pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics").route("/top-links", web::get().to(get_top_links))
}

pub fn clicks_routes() -> actix_web::Scope {
    web::scope("/clicks").route("/batch", web::post().to(batch_record_clicks))
}

pub fn admin_routes() -> actix_web::Scope {
    web::scope("")
        .route("/cleanup", web::post().to(run_cleanup))
        .route(
            "/videos/{video_id}/stats",
            web::put().to(refresh_video_stat),
        )
        .route("/videos/{video_id}/stats", web::get().to(get_video_stat))
}

/// API v1 路由 `/api`
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .service(links_routes())
        .service(campaigns_routes())
        .service(conversion_routes())
        .service(attribution_routes())
        .service(analytics_routes())
        .service(clicks_routes())
        .service(admin_routes())
}

/// 健康检查路由 `/health`
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health").route("", web::get().to(health_check))
}

/// 重定向热路径：必须最后注册（通配）
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("").route("/{segment}", web::get().to(handle_redirect))
}
