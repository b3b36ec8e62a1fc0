mod common;

use anyhow::Result;
use axum::http::StatusCode;
use httpmock::prelude::*;
use serde_json::{json, Value};

fn insight_body() -> Value {
    json!({
        "executive_summary": "Recurring revenue doubled over the quarter.",
        "swot_analysis": {
            "strengths": ["MRR growth"],
            "weaknesses": [],
            "opportunities": ["EU expansion"],
            "threats": []
        },
        "growth_tactics": ["Launch annual plans"],
        "competitive_positioning": "Challenger",
        "kpi_action_items": ["Track churn monthly"]
    })
}

#[tokio::test]
async fn insights_are_stored_per_company() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;
    let uri = "/api/insights/acme";

    let res = app.get(uri, &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.post(uri, &token, insight_body()).await?;
    assert_eq!(res.status, StatusCode::OK, "upsert failed: {}", res.text);
    assert_eq!(res.data()["companyId"], "acme");
    assert_eq!(res.data()["executive_summary"], "Recurring revenue doubled over the quarter.");
    let created_at = res.data()["createdAt"].clone();

    let mut updated = insight_body();
    updated["competitive_positioning"] = json!("Leader");
    let res = app.post(uri, &token, updated).await?;
    assert_eq!(res.data()["competitive_positioning"], "Leader");
    assert_eq!(res.data()["createdAt"], created_at);

    let res = app.post(uri, &token, json!({ "executive_summary": "only" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.delete(uri, &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.delete(uri, &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn generate_sends_kpi_snapshot_and_stores_answer() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate-insights")
                .json_body_partial(
                    r#"{ "company_data": { "name": "Acme", "target_market": "B2B startups", "market_cagr": 18.0 } }"#,
                )
                .body_contains("monthlyRecurringRevenue");
            then.status(200).json_body(insight_body());
        })
        .await;

    let app = common::TestApp::with_analytics(&server.base_url());
    let token = app.token("acme").await;

    app.put(
        "/api/kpis/saas/acme/series",
        &token,
        json!({ "fileData": "date,monthlyRecurringRevenue\n01-01-24,1000\n01-02-24,2000" }),
    )
    .await?;

    let res = app.post("/api/insights/acme/generate", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::OK, "generate failed: {}", res.text);
    assert_eq!(res.data()["growth_tactics"], json!(["Launch annual plans"]));
    mock.assert_async().await;

    let res = app.get("/api/insights/acme", &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["competitive_positioning"], "Challenger");
    Ok(())
}

#[tokio::test]
async fn generate_uses_the_saved_profile() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate-insights")
                .json_body_partial(r#"{ "company_data": { "name": "Acme Robotics", "stage": "Seed" } }"#);
            then.status(200).json_body(insight_body());
        })
        .await;

    let app = common::TestApp::with_analytics(&server.base_url());
    let token = app.token("acme").await;

    let mut profile = serde_json::to_value(common::profile("Acme Robotics"))?;
    profile["stage"] = json!("Seed");
    let res = app.put("/api/companies/acme", &token, profile).await?;
    assert_eq!(res.status, StatusCode::OK, "profile update failed: {}", res.text);

    let res = app.post("/api/insights/acme/generate", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::OK, "generate failed: {}", res.text);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/generate-insights");
            then.status(503).body("model overloaded");
        })
        .await;

    let app = common::TestApp::with_analytics(&server.base_url());
    let token = app.token("acme").await;

    let res = app.post("/api/insights/acme/generate", &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(res.json["upstream_status"], 503);

    let res = app.get("/api/insights/acme", &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
