use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Descriptive company fields. Every field is required on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub email: String,
    pub industry: String,
    pub stage: String,
    pub founded: i32,
    pub employees: i64,
    pub product: String,
    pub target_market: String,
    pub technology_readiness_level: String,
    pub tam: String,
    pub sam: String,
    pub som: String,
    #[serde(rename = "marketCAGR")]
    pub market_cagr: f64,
    pub elevator_pitch: String,
}

impl CompanyProfile {
    /// Text fields left blank, by their wire name.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("industry", &self.industry),
            ("stage", &self.stage),
            ("product", &self.product),
            ("targetMarket", &self.target_market),
            ("technologyReadinessLevel", &self.technology_readiness_level),
            ("tam", &self.tam),
            ("sam", &self.sam),
            ("som", &self.som),
            ("elevatorPitch", &self.elevator_pitch),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// `company_data` as the analytics service reads it.
    pub fn insight_payload(&self) -> Value {
        json!({
            "name": self.name,
            "industry": self.industry,
            "stage": self.stage,
            "product": self.product,
            "founded": self.founded,
            "employees": self.employees,
            "target_market": self.target_market,
            "technology_readiness_level": self.technology_readiness_level,
            "tam": self.tam,
            "sam": self.sam,
            "som": self.som,
            "market_cagr": self.market_cagr,
            "elevator_pitch": self.elevator_pitch,
        })
    }
}

/// Stored company: profile plus sign-in bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_id: String,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub last_logout: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_profile(name: &str) -> CompanyProfile {
    CompanyProfile {
        name: name.to_string(),
        email: format!("founders@{}.example", name.to_lowercase()),
        industry: "Fintech".into(),
        stage: "Seed".into(),
        founded: 2021,
        employees: 12,
        product: "Treasury automation".into(),
        target_market: "Mid-market CFOs".into(),
        technology_readiness_level: "TRL 7".into(),
        tam: "$12B".into(),
        sam: "$2B".into(),
        som: "$150M".into(),
        market_cagr: 14.5,
        elevator_pitch: "Cash forecasting without spreadsheets".into(),
    }
}
