use reqwest::Method;

use crate::{
    api_client::{encode_segment, ApiClient, RequestOptions},
    data_backend::optional_record,
    data_types::admin_types::{
        Admin, BalanceAdjustment, Client, MealLog, NewClient, NewRestaurant, Restaurant,
        RestaurantUpdate,
    },
    errors::ApiError,
};

pub async fn get_restaurants(api: &ApiClient, token: &str) -> Result<Vec<Restaurant>, ApiError> {
    api.request_as::<Option<Vec<Restaurant>>>("/admin/restaurants", RequestOptions::get().token(token))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn create_restaurant(
    api: &ApiClient,
    token: &str,
    payload: &NewRestaurant,
) -> Result<Option<Restaurant>, ApiError> {
    let options = RequestOptions::new(Method::POST).json(payload)?.token(token);
    let value = api.request("/admin/restaurants", options).await?;
    Ok(optional_record(value))
}

/// Also used by restaurants to save their own settings.
pub async fn update_restaurant(
    api: &ApiClient,
    token: &str,
    id: &str,
    payload: &RestaurantUpdate,
) -> Result<Option<Restaurant>, ApiError> {
    let options = RequestOptions::new(Method::PUT).json(payload)?.token(token);
    let value = api
        .request(&format!("/admin/restaurants/{}", encode_segment(id)?), options)
        .await?;
    Ok(optional_record(value))
}

pub async fn delete_restaurant(api: &ApiClient, token: &str, id: &str) -> Result<(), ApiError> {
    api.request(
        &format!("/admin/restaurants/{}", encode_segment(id)?),
        RequestOptions::new(Method::DELETE).token(token),
    )
    .await?;
    Ok(())
}

pub async fn get_meal_logs(api: &ApiClient, token: &str) -> Result<Vec<MealLog>, ApiError> {
    api.request_as::<Option<Vec<MealLog>>>("/admin/logs", RequestOptions::get().token(token))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn get_admins(api: &ApiClient, token: &str) -> Result<Vec<Admin>, ApiError> {
    api.request_as::<Option<Vec<Admin>>>("/admin/admins", RequestOptions::get().token(token))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn delete_admin(api: &ApiClient, token: &str, id: &str) -> Result<(), ApiError> {
    api.request(
        &format!("/admin/admins/{}", encode_segment(id)?),
        RequestOptions::new(Method::DELETE).token(token),
    )
    .await?;
    Ok(())
}

pub async fn get_clients(api: &ApiClient, token: &str) -> Result<Vec<Client>, ApiError> {
    api.request_as::<Option<Vec<Client>>>("/client", RequestOptions::get().token(token))
        .await
        .map(Option::unwrap_or_default)
}

pub async fn create_client(
    api: &ApiClient,
    token: &str,
    payload: &NewClient,
) -> Result<Option<Client>, ApiError> {
    let options = RequestOptions::new(Method::POST).json(payload)?.token(token);
    let value = api.request("/client", options).await?;
    Ok(optional_record(value))
}

pub async fn adjust_balance(
    api: &ApiClient,
    token: &str,
    client_id: &str,
    adjustment: &BalanceAdjustment,
) -> Result<Option<Client>, ApiError> {
    let options = RequestOptions::new(Method::POST)
        .json(adjustment)?
        .token(token);
    let value = api
        .request(
            &format!("/client/{}/balance", encode_segment(client_id)?),
            options,
        )
        .await?;
    Ok(optional_record(value))
}
