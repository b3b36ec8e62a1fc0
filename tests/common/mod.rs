#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use kpi_dashboard_api::auth::TokenAuthority;
use kpi_dashboard_api::company::CompanyProfile;
use kpi_dashboard_api::config::AppConfig;
use kpi_dashboard_api::insights::AnalyticsClient;
use kpi_dashboard_api::services::CompanyService;
use kpi_dashboard_api::{app, AppState};

pub const SECRET: &str = "test-secret";

/// In-process server on the in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        // Nothing listens here; tests that talk to the analytics service use `with_analytics`.
        Self::with_analytics("http://127.0.0.1:9")
    }

    pub fn with_analytics(base_url: &str) -> Self {
        let tokens = TokenAuthority::new(SECRET, 1).expect("token authority");
        let analytics = AnalyticsClient::new(base_url, Duration::from_secs(5)).expect("analytics client");
        let state = Arc::new(AppState::in_memory(tokens, analytics));

        let mut config = AppConfig::development();
        config.server.enable_request_logging = false;
        let router = app(state.clone(), &config);
        Self { router, state }
    }

    /// Sign the company in, creating a default profile the first time.
    pub async fn token(&self, company_id: &str) -> String {
        let companies = CompanyService::new(self.state.companies.clone());
        if companies.profile(company_id).await.is_err() {
            companies
                .save_profile(company_id, &profile("Acme"))
                .await
                .expect("save profile");
        }
        companies
            .sign_in(&self.state.tokens, company_id)
            .await
            .expect("sign in")
            .token
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await?.to_bytes();
        let text = String::from_utf8(bytes.to_vec())?;
        let json = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(TestResponse {
            status,
            headers,
            text,
            json,
        })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

pub fn profile(name: &str) -> CompanyProfile {
    CompanyProfile {
        name: name.to_string(),
        email: "founders@acme.example".into(),
        industry: "SaaS".into(),
        stage: "Series A".into(),
        founded: 2019,
        employees: 42,
        product: "Revenue analytics".into(),
        target_market: "B2B startups".into(),
        technology_readiness_level: "TRL 9".into(),
        tam: "$20B".into(),
        sam: "$4B".into(),
        som: "$200M".into(),
        market_cagr: 18.0,
        elevator_pitch: "Board-ready KPIs from a CSV".into(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
    pub json: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.json["data"]
    }
}
