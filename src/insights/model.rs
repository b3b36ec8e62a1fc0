use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Narrative insight body, as produced by the analytics service or posted
/// directly by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightBody {
    pub executive_summary: String,
    pub swot_analysis: SwotAnalysis,
    pub growth_tactics: Vec<String>,
    pub competitive_positioning: String,
    pub kpi_action_items: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Stored insight: one per company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub company_id: String,
    #[serde(flatten)]
    pub body: InsightBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
