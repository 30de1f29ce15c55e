//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use space_explorer_api::{
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    repository::InMemoryUserRepository,
    routes,
};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置（内存存储，低开销 Argon2 参数）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
            environment: "test".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
        },
        database: DatabaseConfig {
            backend: "memory".to_string(),
            url: Secret::new(String::new()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            token_exp_secs: 604800,
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_digit: true,
            password_require_special: false,
            password_hash_memory_kib: 19456,
            password_hash_iterations: 2,
            password_hash_parallelism: 1,
        },
    }
}

/// 测试应用：路由 + 状态 + 底层内存存储
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub repository: Arc<InMemoryUserRepository>,
}

/// 创建测试应用
pub fn create_test_app() -> TestApp {
    let repository = Arc::new(InMemoryUserRepository::new());
    let state = Arc::new(
        AppState::from_config(create_test_config(), repository.clone())
            .expect("Failed to create app state"),
    );

    TestApp {
        router: routes::create_router(state.clone()),
        state,
        repository,
    }
}

impl TestApp {
    /// 发送请求并解析 JSON 响应体
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// 发送原始请求
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// 注册用户，返回 (响应体, accessToken)
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (Value, String) {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/auth/register",
                Some(serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
        let token = json["data"]["tokens"]["accessToken"]
            .as_str()
            .expect("missing access token")
            .to_string();

        (json, token)
    }
}
