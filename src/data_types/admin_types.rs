use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionType, EntityRef, YearOfStudy};
use crate::panels::Keyed;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Device {
    Tagged {
        #[serde(rename = "deviceId")]
        device_id: String,
    },
    // older records store plain strings
    Bare(String),
}

impl Device {
    pub fn new(device_id: impl Into<String>) -> Self {
        Device::Tagged {
            device_id: device_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Device::Tagged { device_id } => device_id,
            Device::Bare(id) => id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub meal_price: f64,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl Restaurant {
    pub fn device_list(&self) -> String {
        self.devices
            .iter()
            .map(Device::id)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub restaurant_id: Option<EntityRef>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

impl Subscription {
    pub fn restaurant_label(&self) -> &str {
        self.restaurant_name
            .as_deref()
            .or_else(|| self.restaurant_id.as_ref().and_then(EntityRef::display))
            .unwrap_or("Unknown")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub year_of_study: Option<YearOfStudy>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Client {
    pub fn total_balance(&self) -> f64 {
        self.subscriptions.iter().map(|sub| sub.balance).sum()
    }

    /// A client is active while any subscription still holds a positive balance.
    pub fn is_active(&self) -> bool {
        self.subscriptions.iter().any(|sub| sub.balance > 0.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client: Option<EntityRef>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub restaurant: Option<EntityRef>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub meal_name: Option<String>,
    #[serde(default)]
    pub meal: Option<String>,
    #[serde(default)]
    pub action_type: Option<ActionType>,
    #[serde(default)]
    pub initial_balance: Option<f64>,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl MealLog {
    pub fn balance_delta(&self) -> Option<f64> {
        Some(self.initial_balance? - self.remaining_balance?)
    }

    /// `actionType` decides; the sign of the balance delta only breaks the tie for
    /// rows that were written without one.
    pub fn kind(&self) -> ActionType {
        self.action_type.unwrap_or(match self.balance_delta() {
            Some(delta) if delta < 0.0 => ActionType::Topup,
            _ => ActionType::Purchase,
        })
    }

    pub fn is_topup(&self) -> bool {
        self.kind() == ActionType::Topup
    }

    /// Unsigned transaction amount.
    pub fn transaction_amount(&self) -> Option<f64> {
        self.balance_delta().map(f64::abs).or(self.amount)
    }

    pub fn counts_as_revenue(&self) -> bool {
        self.kind() == ActionType::Purchase
            && self
                .status
                .as_deref()
                .map_or(true, |status| status.eq_ignore_ascii_case("success"))
    }

    pub fn revenue(&self) -> f64 {
        if self.counts_as_revenue() {
            self.transaction_amount().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    pub fn local_time(&self) -> Option<DateTime<Local>> {
        self.timestamp.map(|ts| ts.with_timezone(&Local))
    }

    pub fn client_label(&self) -> &str {
        self.client_name
            .as_deref()
            .or_else(|| self.client.as_ref().and_then(EntityRef::display))
            .unwrap_or("")
    }

    pub fn restaurant_label(&self) -> &str {
        self.restaurant_name
            .as_deref()
            .or_else(|| self.restaurant.as_ref().and_then(EntityRef::display))
            .unwrap_or("")
    }

    pub fn meal_label(&self) -> &str {
        self.meal_name
            .as_deref()
            .or(self.meal.as_deref())
            .unwrap_or("Meal")
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub email: String,
    pub password: String,
    pub meal_price: f64,
    pub devices: Vec<Device>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
    pub name: String,
    pub email: String,
    pub meal_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RestaurantCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub id_number: String,
    pub card_number: String,
    pub year_of_study: YearOfStudy,
    pub field_of_study: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustment {
    pub restaurant_id: String,
    pub amount: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardReplacement {
    pub new_card_number: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetails {
    pub name: String,
    pub phone: String,
    pub id_number: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TopUp {
    pub amount: f64,
}

/// The caller's own record as returned by `/auth/me` (or found by id in a listing).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub meal_price: Option<f64>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

impl From<Admin> for Profile {
    fn from(admin: Admin) -> Self {
        Profile {
            id: admin.id,
            username: Some(admin.username),
            name: None,
            email: None,
            meal_price: None,
        }
    }
}

impl From<Restaurant> for Profile {
    fn from(restaurant: Restaurant) -> Self {
        Profile {
            id: restaurant.id,
            username: None,
            name: Some(restaurant.name),
            email: Some(restaurant.email),
            meal_price: Some(restaurant.meal_price),
        }
    }
}

impl Keyed for Restaurant {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Admin {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Client {
    fn key(&self) -> &str {
        &self.id
    }
}
