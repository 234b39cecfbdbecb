#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use hrm_portal::auth::jwt::{Claims, TokenType};
use hrm_portal::config::{Config, Storage};
use hrm_portal::store::leave::LeavePolicy;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::Value;

pub const SECRET: &str = "integration-secret";

pub fn config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        jwt_secret: SECRET.into(),
        storage: Storage::Memory,
        rate_protected_per_min: 10_000,
        api_prefix: "/api".into(),
        leave_policy: LeavePolicy::default(),
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
    }
}

/// Full app over in-memory stores, as `main` wires it.
macro_rules! test_app {
    ($stores:expr) => {{
        let stores: hrm_portal::store::Stores = $stores;
        let config = common::config();
        let limiter = hrm_portal::routes::build_limiter(config.rate_protected_per_min).unwrap();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| stores.register(cfg))
                .configure(|cfg| hrm_portal::routes::configure(cfg, &config, limiter.clone())),
        )
        .await
    }};
}

fn token(role: u8, user_id: u64, employee_id: Option<&str>, token_type: TokenType) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        user_id,
        sub: format!("user{user_id}"),
        role,
        exp: now + 900,
        jti: uuid::Uuid::new_v4().to_string(),
        token_type,
        employee_id: employee_id.map(String::from),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn admin() -> String {
    token(1, 1, None, TokenType::Access)
}

pub fn hr() -> String {
    token(2, 2, None, TokenType::Access)
}

pub fn employee(employee_id: &str) -> String {
    token(3, 100, Some(employee_id), TokenType::Access)
}

pub fn refresh_token() -> String {
    token(1, 1, None, TokenType::Refresh)
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn authed(req: TestRequest, uri: &str, token: &str) -> TestRequest {
    req.uri(uri)
        .peer_addr(peer())
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

pub fn get(uri: &str, token: &str) -> TestRequest {
    authed(TestRequest::get(), uri, token)
}

pub fn delete(uri: &str, token: &str) -> TestRequest {
    authed(TestRequest::delete(), uri, token)
}

pub fn post(uri: &str, token: &str, body: &impl Serialize) -> TestRequest {
    authed(TestRequest::post(), uri, token).set_json(body)
}

pub fn put(uri: &str, token: &str, body: &impl Serialize) -> TestRequest {
    authed(TestRequest::put(), uri, token).set_json(body)
}

pub fn anonymous(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri).peer_addr(peer())
}

/// Calls the app and decodes the JSON body (`Null` when empty).
pub async fn send<S, R, B, E>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = E>,
    B: MessageBody,
    E: std::fmt::Debug,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
