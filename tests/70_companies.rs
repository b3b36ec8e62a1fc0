mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

const ACME: &str = "/api/companies/acme";

#[tokio::test]
async fn profile_round_trips_with_sign_in_state() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;

    let res = app.get(ACME, &token).await?;
    assert_eq!(res.status, StatusCode::OK, "get failed: {}", res.text);
    assert_eq!(res.data()["companyId"], "acme");
    assert_eq!(res.data()["isActive"], true);
    assert!(res.data()["lastLogin"].is_string());
    assert!(res.data()["lastLogout"].is_null());
    let created_at = res.data()["createdAt"].clone();

    let mut profile = serde_json::to_value(common::profile("Acme Analytics"))?;
    profile["marketCAGR"] = json!(21.5);
    profile["employees"] = json!(60);
    let res = app.put(ACME, &token, profile).await?;
    assert_eq!(res.status, StatusCode::OK, "put failed: {}", res.text);
    assert_eq!(res.data()["name"], "Acme Analytics");
    assert_eq!(res.data()["marketCAGR"], 21.5);
    assert_eq!(res.data()["employees"], 60);
    assert_eq!(res.data()["isActive"], true);
    assert_eq!(res.data()["createdAt"], created_at);
    Ok(())
}

#[tokio::test]
async fn incomplete_profiles_are_rejected() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;

    let res = app.put(ACME, &token, json!({ "name": "Acme" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["code"], "INVALID_JSON");

    let mut profile = serde_json::to_value(common::profile("Acme"))?;
    profile["industry"] = json!("");
    profile["elevatorPitch"] = json!("   ");
    let res = app.put(ACME, &token, profile).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["code"], "VALIDATION_ERROR");
    assert_eq!(res.json["field_errors"]["industry"], "is required");
    assert_eq!(res.json["field_errors"]["elevatorPitch"], "is required");

    let res = app.get(ACME, &token).await?;
    assert_eq!(res.data()["industry"], "SaaS");
    Ok(())
}

#[tokio::test]
async fn profiles_are_scoped_to_the_token_company() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;

    let res = app.get("/api/companies/globex", &token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let profile = serde_json::to_value(common::profile("Globex"))?;
    let res = app.put("/api/companies/globex", &token, profile).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}
