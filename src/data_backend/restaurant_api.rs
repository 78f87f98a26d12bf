use reqwest::Method;

use crate::{
    api_client::{encode_segment, ApiClient, RequestOptions},
    data_backend::optional_record,
    data_types::admin_types::{CardReplacement, Client, ClientDetails, MealLog, NewClient, TopUp},
    errors::ApiError,
};

pub async fn get_clients(
    api: &ApiClient,
    token: &str,
    restaurant_id: &str,
) -> Result<Vec<Client>, ApiError> {
    let options = RequestOptions::get()
        .token(token)
        .query("restaurantId", restaurant_id);
    api.request_as::<Option<Vec<Client>>>("/restaurants/clients", options)
        .await
        .map(Option::unwrap_or_default)
}

pub async fn get_meal_logs(
    api: &ApiClient,
    token: &str,
    restaurant_id: &str,
) -> Result<Vec<MealLog>, ApiError> {
    let options = RequestOptions::get()
        .token(token)
        .query("restaurantId", restaurant_id);
    api.request_as::<Option<Vec<MealLog>>>("/restaurants/logs", options)
        .await
        .map(Option::unwrap_or_default)
}

/// `payload.restaurant_id` must be set; the server subscribes the client there.
pub async fn create_client(
    api: &ApiClient,
    token: &str,
    payload: &NewClient,
) -> Result<Option<Client>, ApiError> {
    let options = RequestOptions::new(Method::POST).json(payload)?.token(token);
    let value = api.request("/restaurants/clients", options).await?;
    Ok(optional_record(value))
}

pub async fn replace_card(
    api: &ApiClient,
    token: &str,
    card_number: &str,
    new_card_number: &str,
) -> Result<Option<Client>, ApiError> {
    let body = CardReplacement {
        new_card_number: new_card_number.to_string(),
    };
    let options = RequestOptions::new(Method::PUT).json(&body)?.token(token);
    let value = api
        .request(
            &format!("/restaurants/clients/{}", encode_segment(card_number)?),
            options,
        )
        .await?;
    Ok(optional_record(value))
}

pub async fn update_details(
    api: &ApiClient,
    token: &str,
    card_number: &str,
    restaurant_id: &str,
    details: &ClientDetails,
) -> Result<Option<Client>, ApiError> {
    let options = RequestOptions::new(Method::PATCH)
        .json(details)?
        .token(token)
        .query("restaurantId", restaurant_id);
    let value = api
        .request(
            &format!("/restaurants/clients/{}", encode_segment(card_number)?),
            options,
        )
        .await?;
    Ok(optional_record(value))
}

pub async fn top_up(
    api: &ApiClient,
    token: &str,
    card_number: &str,
    restaurant_id: &str,
    amount: f64,
) -> Result<Option<Client>, ApiError> {
    let options = RequestOptions::new(Method::POST)
        .json(&TopUp { amount })?
        .token(token)
        .query("restaurantId", restaurant_id);
    let value = api
        .request(
            &format!("/restaurants/topup/{}", encode_segment(card_number)?),
            options,
        )
        .await?;
    Ok(optional_record(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StubResponse, StubServer};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn client_mutations_hit_card_routes() {
        let server = StubServer::start(vec![
            StubResponse::json(200, r#"{"_id":"c1","name":"Ann","cardNumber":"NEW"}"#),
            StubResponse::json(200, r#"{"message":"updated"}"#),
            StubResponse::json(200, r#"{"message":"topped up"}"#),
        ])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let replaced = replace_card(&api, "t", "OLD", "NEW").await.unwrap();
        assert_eq!(replaced.unwrap().card_number, "NEW");

        let details = ClientDetails {
            name: "Ann".into(),
            phone: "078".into(),
            id_number: "ID1".into(),
        };
        assert!(update_details(&api, "t", "NEW", "r1", &details)
            .await
            .unwrap()
            .is_none());
        top_up(&api, "t", "NEW", "r1", 3000.0).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].path, "/restaurants/clients/OLD");
        let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(sent, json!({"newCardNumber": "NEW"}));

        assert_eq!(requests[1].method, "PATCH");
        assert_eq!(requests[1].path, "/restaurants/clients/NEW?restaurantId=r1");

        assert_eq!(requests[2].path, "/restaurants/topup/NEW?restaurantId=r1");
        let sent: Value = serde_json::from_str(&requests[2].body).unwrap();
        assert_eq!(sent, json!({"amount": 3000.0}));
    }

    #[tokio::test]
    async fn listings_carry_restaurant_id() {
        let server = StubServer::start(vec![StubResponse::json(200, "[]")]).await;
        let api = ApiClient::new(&server.base_url).unwrap();

        assert!(get_meal_logs(&api, "t", "r1").await.unwrap().is_empty());
        assert_eq!(server.requests()[0].path, "/restaurants/logs?restaurantId=r1");
    }
}
