use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::{
    api_client::{ApiClient, RequestOptions},
    data_types::stats_types::{
        ClientStats, DailyStat, GroupCount, MealAnalytics, MealsByField, MealsByYear,
        MonthlyStat, PurchasesVsTopups, RestaurantStats, RevenueAnalytics, RevenuePoint,
        TopClient,
    },
    errors::ApiError,
};

async fn get_rows<T: DeserializeOwned>(
    api: &ApiClient,
    token: &str,
    endpoint: &str,
    restaurant_id: Option<&str>,
) -> Result<Vec<T>, ApiError> {
    let mut options = RequestOptions::get().token(token);
    if let Some(id) = restaurant_id {
        options = options.query("restaurantId", id);
    }
    api.request_as::<Option<Vec<T>>>(endpoint, options)
        .await
        .map(Option::unwrap_or_default)
}

pub async fn client_stats(api: &ApiClient, token: &str) -> Result<ClientStats, ApiError> {
    let now = Instant::now();
    let (by_year, by_field, combined) = tokio::try_join!(
        get_rows::<GroupCount>(api, token, "/client/stats/year-of-study", None),
        get_rows::<GroupCount>(api, token, "/client/stats/field-of-study", None),
        get_rows(api, token, "/client/stats/combined", None),
    )?;
    log::debug!("client stats: {:.2?}", now.elapsed());

    Ok(ClientStats {
        by_year,
        by_field,
        combined,
    })
}

pub async fn meal_analytics(api: &ApiClient, token: &str) -> Result<MealAnalytics, ApiError> {
    let now = Instant::now();
    let (by_year, by_field, combined, top_groups) = tokio::try_join!(
        get_rows::<MealsByYear>(api, token, "/client/analytics/meals-by-year", None),
        get_rows::<MealsByField>(api, token, "/client/analytics/meals-by-field", None),
        get_rows(api, token, "/client/analytics/meals-combined", None),
        get_rows(api, token, "/client/analytics/top-eating-groups", None),
    )?;
    log::debug!("meal analytics: {:.2?}", now.elapsed());

    Ok(MealAnalytics {
        by_year,
        by_field,
        combined,
        top_groups,
    })
}

pub async fn restaurant_stats(
    api: &ApiClient,
    token: &str,
    restaurant_id: &str,
) -> Result<RestaurantStats, ApiError> {
    let id = Some(restaurant_id);
    let (daily, monthly, top_clients) = tokio::try_join!(
        get_rows::<DailyStat>(api, token, "/restaurants/analytics/daily-stats", id),
        get_rows::<MonthlyStat>(api, token, "/restaurants/analytics/monthly-stats", id),
        get_rows::<TopClient>(api, token, "/restaurants/analytics/top-clients", id),
    )?;

    Ok(RestaurantStats {
        daily,
        monthly,
        top_clients,
    })
}

pub async fn revenue_analytics(
    api: &ApiClient,
    token: &str,
    restaurant_id: &str,
) -> Result<RevenueAnalytics, ApiError> {
    let options = RequestOptions::get()
        .token(token)
        .query("restaurantId", restaurant_id);
    let (revenue, purchases_vs_topups) = tokio::try_join!(
        get_rows::<RevenuePoint>(
            api,
            token,
            "/restaurants/analytics/revenue",
            Some(restaurant_id)
        ),
        api.request_as::<Option<PurchasesVsTopups>>(
            "/restaurants/analytics/purchases-vs-topups",
            options
        ),
    )?;

    Ok(RevenueAnalytics {
        revenue,
        purchases_vs_topups: purchases_vs_topups.unwrap_or_default(),
    })
}
