use std::time::Instant;

use reqwest::{header::CONTENT_TYPE, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::ApiError;

/// Everything a single call needs besides the endpoint path.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    pub method: Method,
    pub body: Option<Value>,
    pub token: Option<&'a str>,
    pub query: Vec<(&'static str, String)>,
}

impl<'a> RequestOptions<'a> {
    pub fn new(method: Method) -> Self {
        RequestOptions {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Endpoint(base_url));
        }

        Ok(ApiClient {
            http: reqwest::Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one JSON request. Resolves to the parsed body, or `None` when the body is
    /// empty, not JSON, or `null`.
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions<'_>,
    ) -> Result<Option<Value>, ApiError> {
        if !endpoint.starts_with('/') {
            return Err(ApiError::Endpoint(endpoint.to_string()));
        }

        let mut req = self
            .http
            .request(options.method.clone(), format!("{}{}", self.base_url, endpoint))
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = options.token {
            req = req.bearer_auth(token);
        }
        if !options.query.is_empty() {
            req = req.query(&options.query);
        }
        if let Some(body) = &options.body {
            req = req.json(body);
        }

        let now = Instant::now();
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        log::debug!(
            "{} {} -> {} ({:.2?})",
            options.method,
            endpoint,
            status.as_u16(),
            now.elapsed()
        );

        decode_response(status, &body)
    }

    pub async fn request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions<'_>,
    ) -> Result<T, ApiError> {
        let value = self.request(endpoint, options).await?;
        Ok(serde_json::from_value(value.unwrap_or(Value::Null))?)
    }
}

/// Applies the response rules: any non-2xx status is an error carrying that status and
/// the server's `message`, falling back to the status text.
pub fn decode_response(status: StatusCode, body: &[u8]) -> Result<Option<Value>, ApiError> {
    let data = serde_json::from_slice::<Value>(body)
        .ok()
        .filter(|value| !value.is_null());

    if status.is_success() {
        return Ok(data);
    }

    let message = data
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string())
        });

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Percent-encodes one path segment (ids, card numbers) with `Url`'s path-segment rules.
pub fn encode_segment(segment: &str) -> Result<String, ApiError> {
    let invalid = || ApiError::Endpoint(segment.to_string());
    let mut url = Url::parse("http://segment.invalid/").map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .push(segment);
    Ok(url.path().trim_start_matches('/').to_string())
}
