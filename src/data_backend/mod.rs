//! Endpoint bindings. Each submodule wraps one area of the REST backend as plain
//! async functions; the traits below bundle them per dashboard so the dashboards
//! can run against the real server or an in-memory stand-in.

use crate::{
    api_client::ApiClient,
    data_types::{
        admin_types::{
            Admin, AdminCredentials, BalanceAdjustment, Client, ClientDetails, MealLog, NewClient,
            NewRestaurant, Profile, Restaurant, RestaurantUpdate,
        },
        device_types::{BalanceLookup, DeviceResponse, OfflineTap, TapRequest, TapResult},
        stats_types::{ClientStats, MealAnalytics, RestaurantStats, RevenueAnalytics},
        Role,
    },
    errors::ApiError,
    session::Session,
};

pub mod admin_api;
pub mod auth_api;
pub mod device_api;
pub mod restaurant_api;
pub mod stats_api;

/// Create/update calls resolve to `None` when the server answers without a record.
#[allow(async_fn_in_trait)]
pub trait AdminBackend {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, ApiError>;
    async fn meal_logs(&self) -> Result<Vec<MealLog>, ApiError>;
    async fn admins(&self) -> Result<Vec<Admin>, ApiError>;
    async fn clients(&self) -> Result<Vec<Client>, ApiError>;

    async fn create_restaurant(&self, payload: &NewRestaurant)
        -> Result<Option<Restaurant>, ApiError>;
    async fn update_restaurant(
        &self,
        id: &str,
        payload: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError>;
    async fn delete_restaurant(&self, id: &str) -> Result<(), ApiError>;

    async fn create_admin(&self, payload: &AdminCredentials) -> Result<Option<Admin>, ApiError>;
    async fn delete_admin(&self, id: &str) -> Result<(), ApiError>;

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError>;
    async fn adjust_balance(
        &self,
        client_id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Option<Client>, ApiError>;

    async fn client_stats(&self) -> Result<ClientStats, ApiError>;
    async fn meal_analytics(&self) -> Result<MealAnalytics, ApiError>;
}

#[allow(async_fn_in_trait)]
pub trait RestaurantBackend {
    async fn clients(&self, restaurant_id: &str) -> Result<Vec<Client>, ApiError>;
    async fn meal_logs(&self, restaurant_id: &str) -> Result<Vec<MealLog>, ApiError>;

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError>;
    async fn replace_card(
        &self,
        card_number: &str,
        new_card_number: &str,
    ) -> Result<Option<Client>, ApiError>;
    async fn update_details(
        &self,
        card_number: &str,
        restaurant_id: &str,
        details: &ClientDetails,
    ) -> Result<Option<Client>, ApiError>;
    async fn top_up(
        &self,
        card_number: &str,
        restaurant_id: &str,
        amount: f64,
    ) -> Result<Option<Client>, ApiError>;

    async fn tap(&self, request: &TapRequest) -> Result<TapResult, ApiError>;
    async fn lookup_balance(&self, card_number: &str) -> Result<BalanceLookup, ApiError>;
    async fn register_card(&self, device_id: &str) -> Result<DeviceResponse, ApiError>;
    async fn sync_device(
        &self,
        device_id: &str,
        taps: &[OfflineTap],
    ) -> Result<DeviceResponse, ApiError>;

    async fn restaurant_stats(&self, restaurant_id: &str) -> Result<RestaurantStats, ApiError>;
    async fn revenue_analytics(&self, restaurant_id: &str)
        -> Result<RevenueAnalytics, ApiError>;

    async fn profile(&self) -> Result<Profile, ApiError>;
    async fn update_settings(
        &self,
        restaurant_id: &str,
        update: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError>;
}

/// The live backend: one `ApiClient` plus the caller's session.
#[derive(Debug, Clone)]
pub struct ApiBackend {
    api: ApiClient,
    session: Session,
}

impl ApiBackend {
    pub fn new(api: ApiClient, session: Session) -> Self {
        ApiBackend { api, session }
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    fn token(&self) -> &str {
        &self.session.token
    }
}

impl AdminBackend for ApiBackend {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, ApiError> {
        admin_api::get_restaurants(&self.api, self.token()).await
    }

    async fn meal_logs(&self) -> Result<Vec<MealLog>, ApiError> {
        admin_api::get_meal_logs(&self.api, self.token()).await
    }

    async fn admins(&self) -> Result<Vec<Admin>, ApiError> {
        admin_api::get_admins(&self.api, self.token()).await
    }

    async fn clients(&self) -> Result<Vec<Client>, ApiError> {
        admin_api::get_clients(&self.api, self.token()).await
    }

    async fn create_restaurant(
        &self,
        payload: &NewRestaurant,
    ) -> Result<Option<Restaurant>, ApiError> {
        admin_api::create_restaurant(&self.api, self.token(), payload).await
    }

    async fn update_restaurant(
        &self,
        id: &str,
        payload: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError> {
        admin_api::update_restaurant(&self.api, self.token(), id, payload).await
    }

    async fn delete_restaurant(&self, id: &str) -> Result<(), ApiError> {
        admin_api::delete_restaurant(&self.api, self.token(), id).await
    }

    async fn create_admin(&self, payload: &AdminCredentials) -> Result<Option<Admin>, ApiError> {
        auth_api::signup_admin(&self.api, Some(self.token()), payload).await
    }

    async fn delete_admin(&self, id: &str) -> Result<(), ApiError> {
        admin_api::delete_admin(&self.api, self.token(), id).await
    }

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError> {
        admin_api::create_client(&self.api, self.token(), payload).await
    }

    async fn adjust_balance(
        &self,
        client_id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Option<Client>, ApiError> {
        admin_api::adjust_balance(&self.api, self.token(), client_id, adjustment).await
    }

    async fn client_stats(&self) -> Result<ClientStats, ApiError> {
        stats_api::client_stats(&self.api, self.token()).await
    }

    async fn meal_analytics(&self) -> Result<MealAnalytics, ApiError> {
        stats_api::meal_analytics(&self.api, self.token()).await
    }
}

impl RestaurantBackend for ApiBackend {
    async fn clients(&self, restaurant_id: &str) -> Result<Vec<Client>, ApiError> {
        restaurant_api::get_clients(&self.api, self.token(), restaurant_id).await
    }

    async fn meal_logs(&self, restaurant_id: &str) -> Result<Vec<MealLog>, ApiError> {
        restaurant_api::get_meal_logs(&self.api, self.token(), restaurant_id).await
    }

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError> {
        restaurant_api::create_client(&self.api, self.token(), payload).await
    }

    async fn replace_card(
        &self,
        card_number: &str,
        new_card_number: &str,
    ) -> Result<Option<Client>, ApiError> {
        restaurant_api::replace_card(&self.api, self.token(), card_number, new_card_number).await
    }

    async fn update_details(
        &self,
        card_number: &str,
        restaurant_id: &str,
        details: &ClientDetails,
    ) -> Result<Option<Client>, ApiError> {
        restaurant_api::update_details(
            &self.api,
            self.token(),
            card_number,
            restaurant_id,
            details,
        )
        .await
    }

    async fn top_up(
        &self,
        card_number: &str,
        restaurant_id: &str,
        amount: f64,
    ) -> Result<Option<Client>, ApiError> {
        restaurant_api::top_up(&self.api, self.token(), card_number, restaurant_id, amount).await
    }

    async fn tap(&self, request: &TapRequest) -> Result<TapResult, ApiError> {
        device_api::tap(&self.api, self.token(), request).await
    }

    async fn lookup_balance(&self, card_number: &str) -> Result<BalanceLookup, ApiError> {
        device_api::lookup_balance(&self.api, self.token(), card_number).await
    }

    async fn register_card(&self, device_id: &str) -> Result<DeviceResponse, ApiError> {
        device_api::register_card(&self.api, self.token(), device_id).await
    }

    async fn sync_device(
        &self,
        device_id: &str,
        taps: &[OfflineTap],
    ) -> Result<DeviceResponse, ApiError> {
        device_api::sync_device(&self.api, self.token(), device_id, taps).await
    }

    async fn restaurant_stats(&self, restaurant_id: &str) -> Result<RestaurantStats, ApiError> {
        stats_api::restaurant_stats(&self.api, self.token(), restaurant_id).await
    }

    async fn revenue_analytics(
        &self,
        restaurant_id: &str,
    ) -> Result<RevenueAnalytics, ApiError> {
        stats_api::revenue_analytics(&self.api, self.token(), restaurant_id).await
    }

    async fn profile(&self) -> Result<Profile, ApiError> {
        auth_api::resolve_identity(&self.api, &self.session).await
    }

    async fn update_settings(
        &self,
        restaurant_id: &str,
        update: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError> {
        admin_api::update_restaurant(&self.api, self.token(), restaurant_id, update).await
    }
}

/// Decodes an optional record from a mutation response. Bodies that are not a
/// record (`{"message": ...}`, plain text) count as "no record".
fn optional_record<T: serde::de::DeserializeOwned>(value: Option<serde_json::Value>) -> Option<T> {
    let value = value?;
    // some routes wrap the record, e.g. {"message": "...", "client": {...}}
    serde_json::from_value(value.clone()).ok().or_else(|| {
        value
            .as_object()?
            .values()
            .filter(|inner| inner.is_object())
            .find_map(|inner| serde_json::from_value(inner.clone()).ok())
    })
}
