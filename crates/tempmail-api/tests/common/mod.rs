//! Common test utilities and helpers for integration tests
#![allow(dead_code)]

use axum::{Router, body::Body};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tempmail_api::{ApiContext, router};
use tempmail_core::store::{Database, Row, Statement};
use tempmail_core::{AdminConfig, SqliteDatabase};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret";
pub const TEST_DOMAIN: &str = "test.com";

/// Test harness around an in-memory store
pub struct TestApp {
    pub ctx: Arc<ApiContext>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Build an app whose config overrides the defaults with `overrides`
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            ("DOMAINS".to_string(), TEST_DOMAIN.to_string()),
            ("PREFIX".to_string(), "tmp".to_string()),
        ]);
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }

        let config = AdminConfig::from_lookup(|key| env.get(key).cloned()).unwrap();
        let db: Arc<dyn Database> = Arc::new(SqliteDatabase::in_memory().await.unwrap());
        let ctx = ApiContext::with_database(config, db).unwrap();
        Self { ctx }
    }

    pub fn router(&self) -> Router {
        router(Arc::clone(&self.ctx))
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    /// Insert an address row and return its id
    pub async fn seed_address(&self, name: &str) -> i64 {
        self.exec(Statement::new("INSERT INTO address (name) VALUES (?)").bind(name))
            .await;
        let row = self
            .ctx
            .db
            .first(&Statement::new("SELECT id FROM address WHERE name = ?").bind(name))
            .await
            .unwrap()
            .unwrap();
        row["id"].as_i64().unwrap()
    }

    pub async fn seed_mail(&self, address: &str, raw: &str) {
        self.exec(
            Statement::new("INSERT INTO raw_mails (source, address, raw) VALUES (?, ?, ?)")
                .bind("sender@elsewhere.org")
                .bind(address)
                .bind(raw),
        )
        .await;
    }

    pub async fn exec(&self, statement: Statement) {
        self.ctx.db.run(&statement).await.unwrap();
    }

    pub async fn rows(&self, statement: Statement) -> Vec<Row> {
        self.ctx.db.all(&statement).await.unwrap()
    }
}

pub fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

pub fn text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}
