//! Test helpers: canned records, a one-shot HTTP stub and in-memory backends.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    data_backend::{AdminBackend, RestaurantBackend},
    data_types::{
        admin_types::{
            Admin, AdminCredentials, BalanceAdjustment, Client, ClientDetails, Device, MealLog,
            NewClient, NewRestaurant, Profile, Restaurant, RestaurantUpdate, Subscription,
        },
        device_types::{BalanceLookup, DeviceResponse, OfflineTap, TapRequest, TapResult},
        stats_types::{ClientStats, MealAnalytics, RestaurantStats, RevenueAnalytics},
        ActionType, EntityRef, YearOfStudy,
    },
    errors::ApiError,
};

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        StubResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::json(status, "")
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Answers one connection per queued response, in order, then stops listening.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                if let Some(request) = read_request(&mut socket).await {
                    recorded.lock().unwrap().push(request);
                }

                let reason = StatusCode::from_u16(response.status)
                    .ok()
                    .and_then(|status| status.canonical_reason())
                    .unwrap_or("");
                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status,
                    reason,
                    response.body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(response.body.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        StubServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// A base url nothing listens on.
    pub async fn closed_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn log_at(
    timestamp: DateTime<Utc>,
    action: Option<ActionType>,
    initial: f64,
    remaining: f64,
) -> MealLog {
    MealLog {
        id: format!("log-{}", timestamp.timestamp_millis()),
        timestamp: Some(timestamp),
        client_name: Some("Alice".into()),
        restaurant_name: Some("Main Campus".into()),
        action_type: action,
        initial_balance: Some(initial),
        remaining_balance: Some(remaining),
        ..Default::default()
    }
}

pub fn restaurant(id: &str, name: &str) -> Restaurant {
    Restaurant {
        id: id.into(),
        name: name.into(),
        email: format!("{}@campus.rw", id),
        meal_price: 500.0,
        devices: vec![Device::new(format!("dev-{}", id))],
    }
}

pub fn admin(id: &str, username: &str) -> Admin {
    Admin {
        id: id.into(),
        username: username.into(),
    }
}

pub fn client(id: &str, name: &str, year: YearOfStudy, field: &str, balance: f64) -> Client {
    Client {
        id: id.into(),
        name: name.into(),
        email: Some(format!("{}@students.rw", id)),
        phone: "0780000000".into(),
        id_number: format!("ID-{}", id),
        card_number: format!("CARD-{}", id),
        year_of_study: Some(year),
        field_of_study: Some(field.into()),
        subscriptions: vec![Subscription {
            restaurant_id: Some(EntityRef::Id("r1".into())),
            restaurant_name: Some("Main Campus".into()),
            balance,
        }],
    }
}

/// Minimal unsigned JWT with the given JSON payload.
pub fn token_with_payload(payload: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

/// In-memory admin backend counting every call by name.
#[derive(Default)]
pub struct FakeAdminBackend {
    pub restaurants: RefCell<Vec<Restaurant>>,
    pub admins: RefCell<Vec<Admin>>,
    pub clients: RefCell<Vec<Client>>,
    pub logs: Vec<MealLog>,
    pub calls: RefCell<BTreeMap<&'static str, usize>>,
    pub fail_with: RefCell<BTreeMap<&'static str, ApiError>>,
    pub echo_created: bool,
}

impl FakeAdminBackend {
    fn hit(&self, name: &'static str) -> Result<(), ApiError> {
        *self.calls.borrow_mut().entry(name).or_default() += 1;
        match self.fail_with.borrow_mut().remove(name) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn fail_next(&self, name: &'static str, status: u16, message: &str) {
        self.fail_with.borrow_mut().insert(
            name,
            ApiError::Status {
                status,
                message: message.into(),
            },
        );
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

impl AdminBackend for FakeAdminBackend {
    async fn restaurants(&self) -> Result<Vec<Restaurant>, ApiError> {
        self.hit("restaurants")?;
        Ok(self.restaurants.borrow().clone())
    }

    async fn meal_logs(&self) -> Result<Vec<MealLog>, ApiError> {
        self.hit("meal_logs")?;
        Ok(self.logs.clone())
    }

    async fn admins(&self) -> Result<Vec<Admin>, ApiError> {
        self.hit("admins")?;
        Ok(self.admins.borrow().clone())
    }

    async fn clients(&self) -> Result<Vec<Client>, ApiError> {
        self.hit("clients")?;
        Ok(self.clients.borrow().clone())
    }

    async fn create_restaurant(
        &self,
        payload: &NewRestaurant,
    ) -> Result<Option<Restaurant>, ApiError> {
        self.hit("create_restaurant")?;
        let created = Restaurant {
            id: format!("r{}", self.restaurants.borrow().len() + 1),
            name: payload.name.clone(),
            email: payload.email.clone(),
            meal_price: payload.meal_price,
            devices: payload.devices.clone(),
        };
        self.restaurants.borrow_mut().push(created.clone());
        Ok(self.echo_created.then_some(created))
    }

    async fn update_restaurant(
        &self,
        id: &str,
        payload: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError> {
        self.hit("update_restaurant")?;
        let mut restaurants = self.restaurants.borrow_mut();
        let Some(existing) = restaurants.iter_mut().find(|r| r.id == id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "Restaurant not found".into(),
            });
        };
        existing.name = payload.name.clone();
        existing.email = payload.email.clone();
        existing.meal_price = payload.meal_price;
        if let Some(devices) = &payload.devices {
            existing.devices = devices.clone();
        }
        Ok(self.echo_created.then(|| existing.clone()))
    }

    async fn delete_restaurant(&self, id: &str) -> Result<(), ApiError> {
        self.hit("delete_restaurant")?;
        self.restaurants.borrow_mut().retain(|r| r.id != id);
        Ok(())
    }

    async fn create_admin(&self, payload: &AdminCredentials) -> Result<Option<Admin>, ApiError> {
        self.hit("create_admin")?;
        let created = Admin {
            id: format!("a{}", self.admins.borrow().len() + 1),
            username: payload.username.clone(),
        };
        self.admins.borrow_mut().push(created.clone());
        Ok(self.echo_created.then_some(created))
    }

    async fn delete_admin(&self, id: &str) -> Result<(), ApiError> {
        self.hit("delete_admin")?;
        self.admins.borrow_mut().retain(|a| a.id != id);
        Ok(())
    }

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError> {
        self.hit("create_client")?;
        let created = Client {
            id: format!("c{}", self.clients.borrow().len() + 1),
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            id_number: payload.id_number.clone(),
            card_number: payload.card_number.clone(),
            year_of_study: Some(payload.year_of_study),
            field_of_study: Some(payload.field_of_study.clone()),
            subscriptions: Vec::new(),
        };
        self.clients.borrow_mut().push(created.clone());
        Ok(self.echo_created.then_some(created))
    }

    async fn adjust_balance(
        &self,
        client_id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Option<Client>, ApiError> {
        self.hit("adjust_balance")?;
        let mut clients = self.clients.borrow_mut();
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return Err(ApiError::Status {
                status: 404,
                message: "Client not found".into(),
            });
        };
        client.subscriptions.push(Subscription {
            restaurant_id: Some(EntityRef::Id(adjustment.restaurant_id.clone())),
            restaurant_name: None,
            balance: adjustment.amount,
        });
        Ok(self.echo_created.then(|| client.clone()))
    }

    async fn client_stats(&self) -> Result<ClientStats, ApiError> {
        self.hit("client_stats")?;
        Ok(ClientStats::default())
    }

    async fn meal_analytics(&self) -> Result<MealAnalytics, ApiError> {
        self.hit("meal_analytics")?;
        Ok(MealAnalytics::default())
    }
}

/// In-memory restaurant backend counting every call by name.
#[derive(Default)]
pub struct FakeRestaurantBackend {
    pub profile: Option<Restaurant>,
    pub clients: RefCell<Vec<Client>>,
    pub logs: Vec<MealLog>,
    pub calls: RefCell<BTreeMap<&'static str, usize>>,
    pub fail_with: RefCell<BTreeMap<&'static str, ApiError>>,
    pub last_restaurant_id: RefCell<Option<String>>,
}

impl FakeRestaurantBackend {
    fn hit(&self, name: &'static str) -> Result<(), ApiError> {
        *self.calls.borrow_mut().entry(name).or_default() += 1;
        match self.fail_with.borrow_mut().remove(name) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn fail_next(&self, name: &'static str, status: u16, message: &str) {
        self.fail_with.borrow_mut().insert(
            name,
            ApiError::Status {
                status,
                message: message.into(),
            },
        );
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.borrow().get(name).copied().unwrap_or(0)
    }
}

impl RestaurantBackend for FakeRestaurantBackend {
    async fn clients(&self, restaurant_id: &str) -> Result<Vec<Client>, ApiError> {
        self.hit("clients")?;
        *self.last_restaurant_id.borrow_mut() = Some(restaurant_id.to_string());
        Ok(self.clients.borrow().clone())
    }

    async fn meal_logs(&self, restaurant_id: &str) -> Result<Vec<MealLog>, ApiError> {
        self.hit("meal_logs")?;
        *self.last_restaurant_id.borrow_mut() = Some(restaurant_id.to_string());
        Ok(self.logs.clone())
    }

    async fn create_client(&self, payload: &NewClient) -> Result<Option<Client>, ApiError> {
        self.hit("create_client")?;
        let created = Client {
            id: format!("c{}", self.clients.borrow().len() + 1),
            name: payload.name.clone(),
            email: None,
            phone: payload.phone.clone(),
            id_number: payload.id_number.clone(),
            card_number: payload.card_number.clone(),
            year_of_study: Some(payload.year_of_study),
            field_of_study: Some(payload.field_of_study.clone()),
            subscriptions: Vec::new(),
        };
        self.clients.borrow_mut().push(created.clone());
        Ok(Some(created))
    }

    async fn replace_card(
        &self,
        card_number: &str,
        new_card_number: &str,
    ) -> Result<Option<Client>, ApiError> {
        self.hit("replace_card")?;
        let mut clients = self.clients.borrow_mut();
        let client = clients.iter_mut().find(|c| c.card_number == card_number);
        Ok(client.map(|client| {
            client.card_number = new_card_number.to_string();
            client.clone()
        }))
    }

    async fn update_details(
        &self,
        card_number: &str,
        _restaurant_id: &str,
        details: &ClientDetails,
    ) -> Result<Option<Client>, ApiError> {
        self.hit("update_details")?;
        let mut clients = self.clients.borrow_mut();
        let client = clients.iter_mut().find(|c| c.card_number == card_number);
        Ok(client.map(|client| {
            client.name = details.name.clone();
            client.phone = details.phone.clone();
            client.id_number = details.id_number.clone();
            client.clone()
        }))
    }

    async fn top_up(
        &self,
        _card_number: &str,
        _restaurant_id: &str,
        _amount: f64,
    ) -> Result<Option<Client>, ApiError> {
        self.hit("top_up")?;
        Ok(None)
    }

    async fn tap(&self, request: &TapRequest) -> Result<TapResult, ApiError> {
        self.hit("tap")?;
        Ok(TapResult {
            client_name: Some(format!("holder of {}", request.card_number)),
            name: None,
            remaining_balance: Some(500.0),
            balance: None,
        })
    }

    async fn lookup_balance(&self, card_number: &str) -> Result<BalanceLookup, ApiError> {
        self.hit("lookup_balance")?;
        Ok(BalanceLookup {
            name: "Alice".into(),
            card_number: card_number.into(),
            subscriptions: Vec::new(),
        })
    }

    async fn register_card(&self, device_id: &str) -> Result<DeviceResponse, ApiError> {
        self.hit("register_card")?;
        Ok(Some(serde_json::json!({ "deviceId": device_id, "cardNumber": "NEW-1" })))
    }

    async fn sync_device(
        &self,
        device_id: &str,
        taps: &[OfflineTap],
    ) -> Result<DeviceResponse, ApiError> {
        self.hit("sync_device")?;
        Ok(Some(serde_json::json!({ "deviceId": device_id, "synced": taps.len() })))
    }

    async fn restaurant_stats(&self, _restaurant_id: &str) -> Result<RestaurantStats, ApiError> {
        self.hit("restaurant_stats")?;
        Ok(RestaurantStats::default())
    }

    async fn revenue_analytics(
        &self,
        _restaurant_id: &str,
    ) -> Result<RevenueAnalytics, ApiError> {
        self.hit("revenue_analytics")?;
        Ok(RevenueAnalytics::default())
    }

    async fn profile(&self) -> Result<Profile, ApiError> {
        self.hit("profile")?;
        self.profile
            .clone()
            .map(Profile::from)
            .ok_or(ApiError::Status {
                status: 404,
                message: "Restaurant not found".into(),
            })
    }

    async fn update_settings(
        &self,
        _restaurant_id: &str,
        _update: &RestaurantUpdate,
    ) -> Result<Option<Restaurant>, ApiError> {
        self.hit("update_settings")?;
        Ok(None)
    }
}
