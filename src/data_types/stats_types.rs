use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{_id, count}` rows produced by the server-side `$group` stages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupCount {
    #[serde(rename = "_id", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub count: u64,
}

impl GroupCount {
    pub fn label(&self) -> &str {
        self.key.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealsByYear {
    #[serde(default)]
    pub year_of_study: Option<String>,
    #[serde(default)]
    pub total_meals: u64,
    #[serde(default)]
    pub unique_client_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealsByField {
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub total_meals: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientStats {
    pub by_year: Vec<GroupCount>,
    pub by_field: Vec<GroupCount>,
    pub combined: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MealAnalytics {
    pub by_year: Vec<MealsByYear>,
    pub by_field: Vec<MealsByField>,
    pub combined: Vec<Value>,
    pub top_groups: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub transaction_count: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub transaction_count: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub transaction_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RevenuePoint {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KindCount {
    #[serde(default)]
    pub count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PurchasesVsTopups {
    #[serde(default)]
    pub purchases: Vec<KindCount>,
    #[serde(default)]
    pub topups: Vec<KindCount>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestaurantStats {
    pub daily: Vec<DailyStat>,
    pub monthly: Vec<MonthlyStat>,
    pub top_clients: Vec<TopClient>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevenueAnalytics {
    pub revenue: Vec<RevenuePoint>,
    pub purchases_vs_topups: PurchasesVsTopups,
}
