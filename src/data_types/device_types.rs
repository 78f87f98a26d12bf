use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::admin_types::Subscription;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TapRequest {
    pub device_id: String,
    pub card_number: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TapResult {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
    #[serde(default)]
    pub balance: Option<f64>,
}

impl TapResult {
    pub fn client(&self) -> &str {
        self.client_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn remaining(&self) -> Option<f64> {
        self.remaining_balance.or(self.balance)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceLookup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfflineTap {
    pub card_number: String,
    pub offline_deducted: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub device_id: String,
    pub taps: Vec<OfflineTap>,
}

/// Register and sync answers are shown verbatim; their shape belongs to the device firmware.
pub type DeviceResponse = Option<Value>;
