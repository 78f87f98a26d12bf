//! Point-of-sale device routes. Balance deduction and offline reconciliation happen on
//! the server; these calls only forward what the operator entered.

use reqwest::Method;

use crate::{
    api_client::{encode_segment, ApiClient, RequestOptions},
    data_types::device_types::{
        BalanceLookup, DeviceResponse, OfflineTap, SyncRequest, TapRequest, TapResult,
    },
    errors::ApiError,
};

pub async fn tap(api: &ApiClient, token: &str, request: &TapRequest) -> Result<TapResult, ApiError> {
    let options = RequestOptions::new(Method::POST).json(request)?.token(token);
    api.request_as("/devices/tap", options).await
}

pub async fn lookup_balance(
    api: &ApiClient,
    token: &str,
    card_number: &str,
) -> Result<BalanceLookup, ApiError> {
    api.request_as(
        &format!("/client/balance/{}", encode_segment(card_number)?),
        RequestOptions::get().token(token),
    )
    .await
}

pub async fn register_card(
    api: &ApiClient,
    token: &str,
    device_id: &str,
) -> Result<DeviceResponse, ApiError> {
    let options = RequestOptions::get()
        .token(token)
        .query("deviceId", device_id);
    api.request("/devices/register", options).await
}

pub async fn sync_device(
    api: &ApiClient,
    token: &str,
    device_id: &str,
    taps: &[OfflineTap],
) -> Result<DeviceResponse, ApiError> {
    let body = SyncRequest {
        device_id: device_id.to_string(),
        taps: taps.to_vec(),
    };
    let options = RequestOptions::new(Method::POST).json(&body)?.token(token);
    api.request("/devices/sync-device", options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StubResponse, StubServer};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn tap_reads_either_name_field() {
        let server = StubServer::start(vec![StubResponse::json(
            200,
            r#"{"name":"Bob","balance":1500}"#,
        )])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let request = TapRequest {
            device_id: "dev-1".into(),
            card_number: "CARD-1".into(),
        };
        let result = tap(&api, "t", &request).await.unwrap();
        assert_eq!(result.client(), "Bob");
        assert_eq!(result.remaining(), Some(1500.0));

        let sent: Value = serde_json::from_str(&server.requests()[0].body).unwrap();
        assert_eq!(sent, json!({"deviceId": "dev-1", "cardNumber": "CARD-1"}));
    }

    #[tokio::test]
    async fn sync_forwards_offline_taps_verbatim() {
        let server = StubServer::start(vec![StubResponse::json(200, r#"{"synced":2}"#)]).await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let taps = vec![
            OfflineTap {
                card_number: "A".into(),
                offline_deducted: 500.0,
            },
            OfflineTap {
                card_number: "B".into(),
                offline_deducted: 250.5,
            },
        ];
        let resp = sync_device(&api, "t", "dev-1", &taps).await.unwrap();
        assert_eq!(resp, Some(json!({"synced": 2})));

        let sent: Value = serde_json::from_str(&server.requests()[0].body).unwrap();
        assert_eq!(
            sent,
            json!({"deviceId": "dev-1", "taps": [
                {"cardNumber": "A", "offlineDeducted": 500.0},
                {"cardNumber": "B", "offlineDeducted": 250.5}
            ]})
        );
    }

    #[tokio::test]
    async fn register_passes_device_as_query() {
        let server = StubServer::start(vec![StubResponse::json(200, r#"{"cardNumber":"X"}"#)]).await;
        let api = ApiClient::new(&server.base_url).unwrap();

        register_card(&api, "t", "dev 1").await.unwrap();
        assert_eq!(server.requests()[0].path, "/devices/register?deviceId=dev+1");
    }
}
