//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{
    auth::middleware::jwt_auth_middleware,
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查、公开资料）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/users/{id}", get(handlers::user::get_public_profile));

    // 注册与登录
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login));

    // 需要认证的路由
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/users/profile",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/api/users/change-password", put(handlers::user::change_password))
        .route("/api/users/account", delete(handlers::user::delete_account))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(cors_layer(&state.config.server.cors_origin))
        .layer(axum::middleware::from_fn(request_tracking_middleware))
        .with_state(state)
}

/// CORS 配置，来源无法解析时不放行跨域请求
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(%origin, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}
