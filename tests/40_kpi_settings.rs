mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

const BASE: &str = "/api/kpis/sales/acme";

#[tokio::test]
async fn selection_is_validated_against_the_catalogue() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;

    // no document yet
    let res = app.put(&format!("{BASE}/select"), &token, json!({ "kpiId": "churnRate" })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    app.get(BASE, &token).await?;

    let res = app.put(&format!("{BASE}/select"), &token, json!({ "kpiId": "churnRate" })).await?;
    assert_eq!(res.status, StatusCode::OK, "select failed: {}", res.text);
    assert_eq!(res.data()["selectedKPIs"], json!(["churnRate"]));

    // selecting twice keeps one entry
    app.put(&format!("{BASE}/select"), &token, json!({ "kpiId": "averageDealSize" })).await?;
    let res = app.put(&format!("{BASE}/select"), &token, json!({ "kpiId": "churnRate" })).await?;
    assert_eq!(res.data()["selectedKPIs"], json!(["churnRate", "averageDealSize"]));

    let res = app.put(&format!("{BASE}/select"), &token, json!({ "kpiId": "burnRate" })).await?;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.json["field_errors"]["kpiId"].is_string());

    let res = app.delete(&format!("{BASE}/select/churnRate"), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["selectedKPIs"], json!(["averageDealSize"]));
    Ok(())
}

#[tokio::test]
async fn layout_is_upserted_and_reset() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;
    let layout = json!({ "lg": [{ "i": "churnRate", "x": 0, "y": 0, "w": 6, "h": 4 }] });

    let res = app.get(&format!("{BASE}/layout"), &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.put(&format!("{BASE}/layout"), &token, layout.clone()).await?;
    assert_eq!(res.status, StatusCode::OK, "layout save failed: {}", res.text);
    assert_eq!(res.data()["lg"], layout["lg"]);
    assert_eq!(res.data()["md"], json!([]));

    let res = app.get(&format!("{BASE}/layout"), &token).await?;
    assert_eq!(res.data()["lg"][0]["w"], 6);

    let res = app.put(&format!("{BASE}/layout"), &token, json!({ "md": [] })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.delete(&format!("{BASE}/layout"), &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["lg"], json!([]));
    Ok(())
}

#[tokio::test]
async fn chart_configurations_replace_upsert_and_reset() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;
    let charts = format!("{BASE}/chart-configurations");

    let res = app.get(&charts, &token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    app.get(BASE, &token).await?;

    let res = app
        .put(
            &charts,
            &token,
            json!([
                { "kpiId": "churnRate", "chartType": "line" },
                { "kpiId": "averageDealSize", "chartType": "bar" }
            ]),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK, "replace failed: {}", res.text);
    assert_eq!(res.data().as_array().map(Vec::len), Some(2));

    let res = app.put(&format!("{charts}/churnRate"), &token, json!({ "chartType": "area" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()[0], json!({ "kpiId": "churnRate", "chartType": "area" }));

    let res = app.put(&format!("{charts}/leadResponseTime"), &token, json!({ "chartType": "pie" })).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(3));

    let res = app.put(&charts, &token, json!([{ "kpiId": "churnRate" }])).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.delete(&charts, &token).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data(), &json!([]));

    let res = app.get(&charts, &token).await?;
    assert_eq!(res.data(), &json!([]));
    Ok(())
}
