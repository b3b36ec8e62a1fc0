mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn dashboard_aggregates_every_department() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;

    app.put(
        "/api/kpis/saas/acme/series",
        &token,
        json!({ "fileData": "date,monthlyRecurringRevenue\n01-02-24,2000\n01-01-24,1000" }),
    )
    .await?;

    let res = app.get("/api/dashboard/acme", &token).await?;
    assert_eq!(res.status, StatusCode::OK, "dashboard failed: {}", res.text);

    let kpis = res.data()["kpis"].as_object().cloned().unwrap_or_default();
    assert_eq!(kpis.len(), 8);
    for key in [
        "finance",
        "sales",
        "marketing",
        "operations",
        "manufacturing",
        "saas",
        "production",
        "customerGrowth",
    ] {
        assert!(kpis.contains_key(key), "missing department {key}");
    }
    assert_eq!(kpis["saas"]["monthlyRecurringRevenue"][0]["month"], "2024-01");
    assert_eq!(res.data()["selectedKPIs"]["saas"], json!(["monthlyRecurringRevenue"]));
    assert_eq!(res.data()["selectedKPIs"]["finance"], json!([]));
    assert_eq!(res.data()["layouts"]["finance"]["lg"], json!([]));
    Ok(())
}

#[tokio::test]
async fn layouts_are_initialised_saved_and_reset() -> Result<()> {
    let app = common::TestApp::new();
    let token = app.token("acme").await;
    let layouts = "/api/dashboard/acme/layouts";

    let res = app.post(layouts, &token, json!({})).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["lg"], json!([]));

    let res = app
        .put(
            layouts,
            &token,
            json!({
                "layouts": {
                    "sales": { "lg": [{ "i": "churnRate", "x": 0, "y": 0, "w": 4, "h": 3 }] },
                    "customerGrowth": { "lg": [] },
                    "hr": { "lg": [] }
                }
            }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK, "save failed: {}", res.text);
    assert_eq!(res.data()["saved"], json!(["sales", "customerGrowth"]));

    let res = app.get("/api/kpis/sales/acme/layout", &token).await?;
    assert_eq!(res.data()["lg"][0]["i"], "churnRate");

    let res = app.delete(layouts, &token).await?;
    assert_eq!(res.data()["reset"], 8);

    let res = app.get("/api/kpis/sales/acme/layout", &token).await?;
    assert_eq!(res.data()["lg"], json!([]));
    Ok(())
}
