//! Shared helpers for the HTTP and live feed tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use kafe_server::api::build_app;
use kafe_server::{Config, ServerState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ApiResponse;
use shared::models::{Product, ProductCreate, Store, StoreCreate};
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::for_tests()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let state = ServerState::in_memory(config).await.unwrap();
        let router = build_app().with_state(state.clone());
        Self { state, router }
    }

    /// Send a request and decode the envelope
    pub async fn request<T, B>(
        &self,
        method: Method,
        uri: &str,
        body: Option<&B>,
    ) -> (StatusCode, ApiResponse<T>)
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "invalid envelope ({e}): {}",
                String::from_utf8_lossy(&bytes)
            )
        });
        (status, envelope)
    }

    pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> (StatusCode, ApiResponse<T>) {
        self.request::<T, ()>(Method::GET, uri, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        uri: &str,
        body: &B,
    ) -> (StatusCode, ApiResponse<T>) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// Expect a success envelope and return its data
    pub async fn get_ok<T: DeserializeOwned>(&self, uri: &str) -> T {
        let (status, envelope) = self.get::<T>(uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}: {}", envelope.message);
        envelope.data.unwrap()
    }

    pub async fn post_ok<T: DeserializeOwned, B: Serialize>(&self, uri: &str, body: &B) -> T {
        let (status, envelope) = self.post::<T, B>(uri, body).await;
        assert_eq!(status, StatusCode::OK, "POST {uri}: {}", envelope.message);
        envelope.data.unwrap()
    }

    pub async fn create_store(&self, slug: &str) -> Store {
        self.post_ok(
            "/api/admin/stores",
            &StoreCreate {
                name: format!("Kafe {slug}"),
                slug: slug.to_string(),
                logo_url: None,
            },
        )
        .await
    }

    pub async fn create_product(&self, store_id: i64, name: &str, price: f64) -> Product {
        self.post_ok(
            &format!("/api/admin/stores/{store_id}/products"),
            &ProductCreate {
                name: name.to_string(),
                price,
                category: "Drinks".to_string(),
                image_url: None,
                description: None,
            },
        )
        .await
    }
}
