use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Business departments a company tracks KPIs for.
///
/// Every department shares the same document shape and endpoints; the only
/// per-department data is the metric catalogue returned by [`Department::catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Department {
    Finance,
    Sales,
    Marketing,
    Operations,
    Manufacturing,
    Saas,
    Production,
    CustomerGrowth,
}

#[derive(Debug, Error)]
#[error("Unknown department: {0}")]
pub struct DepartmentParseError(pub String);

impl Department {
    /// All departments, in the order the insight snapshot folds them.
    pub const ALL: [Department; 8] = [
        Department::Finance,
        Department::Sales,
        Department::Marketing,
        Department::Operations,
        Department::Manufacturing,
        Department::Saas,
        Department::Production,
        Department::CustomerGrowth,
    ];

    /// URL path segment (`/api/kpis/customer-growth/...`)
    pub fn slug(&self) -> &'static str {
        match self {
            Department::Finance => "finance",
            Department::Sales => "sales",
            Department::Marketing => "marketing",
            Department::Operations => "operations",
            Department::Manufacturing => "manufacturing",
            Department::Saas => "saas",
            Department::Production => "production",
            Department::CustomerGrowth => "customer-growth",
        }
    }

    /// Key used in aggregated JSON responses and stored on records
    pub fn key(&self) -> &'static str {
        match self {
            Department::CustomerGrowth => "customerGrowth",
            other => other.slug(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Department::Finance => "Finance",
            Department::Sales => "Sales",
            Department::Marketing => "Marketing",
            Department::Operations => "Operations",
            Department::Manufacturing => "Manufacturing",
            Department::Saas => "SaaS",
            Department::Production => "Production",
            Department::CustomerGrowth => "Customer Growth",
        }
    }

    /// Metric names a company may select for display in this department.
    pub fn catalog(&self) -> &'static [&'static str] {
        match self {
            Department::Finance => &[
                "revenueGrowthRate",
                "grossProfitMargin",
                "netProfitMargin",
                "operatingCashFlow",
                "burnRate",
                "runway",
                "ebitda",
                "currentRatio",
                "arTurnover",
                "debtToEquity",
            ],
            Department::Sales => &[
                "monthlyRecurringRevenue",
                "salesGrowthRate",
                "salesTargetAchievement",
                "leadToCustomerConversionRate",
                "averageDealSize",
                "customerAcquisitionCost",
                "salesCycleLength",
                "leadResponseTime",
                "churnRate",
                "upsellCrossSellRate",
            ],
            Department::Marketing => &[
                "customerAcquisitionCost",
                "returnOnMarketingInvestment",
                "websiteTraffic",
                "conversionRate",
                "socialMediaEngagement",
                "emailOpenRate",
                "clickThroughRate",
                "leadGenerationVolume",
                "marketingQualifiedLeads",
                "campaignROI",
            ],
            Department::Operations => &[
                "orderFulfillmentTime",
                "inventoryTurnover",
                "stockOutRate",
                "orderAccuracyRate",
                "supplyChainCycleTime",
                "warehouseUtilizationRate",
                "logisticsCostPerUnit",
                "returnRate",
                "procurementCycleTime",
                "forecastAccuracy",
            ],
            Department::Manufacturing => &[
                "productionVolume",
                "oee",
                "cycleTime",
                "downtime",
                "yield",
                "scrapRate",
                "defectDensity",
                "maintenanceCostPerUnit",
                "inventoryTurnover",
                "energyConsumptionPerUnit",
            ],
            Department::Saas => &[
                "mrr",
                "arr",
                "customerChurn",
                "revenueChurn",
                "cltv",
                "cac",
                "cacPayback",
                "activeUsers",
                "productUsage",
                "nrr",
            ],
            Department::Production => &[
                "productionVolume",
                "productionEfficiency",
                "downtime",
                "cycleTime",
                "yieldRate",
                "reworkRate",
                "scrapRate",
                "capacityUtilization",
                "oee",
                "onTimeProduction",
            ],
            Department::CustomerGrowth => &[
                "customerAcquisitionRate",
                "customerRetentionRate",
                "netPromoterScore",
                "customerLifetimeValue",
                "activeCustomers",
                "repeatPurchaseRate",
                "referralRate",
                "customerSatisfactionScore",
                "expansionRevenue",
                "timeToValue",
            ],
        }
    }

    pub fn allows(&self, kpi_id: &str) -> bool {
        self.catalog().contains(&kpi_id)
    }

    /// CSV template header for uploads: `date` followed by the catalogue.
    pub fn csv_template(&self) -> String {
        let mut header = String::from("date");
        for metric in self.catalog() {
            header.push(',');
            header.push_str(metric);
        }
        header.push('\n');
        header
    }
}

impl FromStr for Department {
    type Err = DepartmentParseError;

    /// Accepts the path slug as well as the camelCase key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.slug() == s || d.key() == s)
            .ok_or_else(|| DepartmentParseError(s.to_string()))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slug_and_key() {
        assert_eq!("customer-growth".parse::<Department>().unwrap(), Department::CustomerGrowth);
        assert_eq!("customerGrowth".parse::<Department>().unwrap(), Department::CustomerGrowth);
        assert_eq!("saas".parse::<Department>().unwrap(), Department::Saas);
        assert!("hr".parse::<Department>().is_err());
    }

    #[test]
    fn serde_uses_key() {
        let v = serde_json::to_value(Department::CustomerGrowth).unwrap();
        assert_eq!(v, "customerGrowth");
        let d: Department = serde_json::from_value(serde_json::json!("finance")).unwrap();
        assert_eq!(d, Department::Finance);
    }

    #[test]
    fn every_catalog_has_ten_unique_metrics() {
        for dept in Department::ALL {
            let catalog = dept.catalog();
            assert_eq!(catalog.len(), 10, "{dept}");
            let mut sorted = catalog.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 10, "duplicate metric in {dept}");
        }
    }

    #[test]
    fn template_starts_with_date_column() {
        let header = Department::Finance.csv_template();
        assert!(header.starts_with("date,revenueGrowthRate,"));
        assert!(header.ends_with("debtToEquity\n"));
    }
}
