//! Form state and validation. Forms keep the raw text the operator typed and turn it
//! into typed request payloads; server failures are mapped to the form's wording.

use regex_lite::Regex;
use static_init::dynamic;

use crate::{
    constants::{
        ADMIN_EXISTS_MSG, ADMIN_NOT_FOUND_MSG, CARD_EXISTS_MSG, INVALID_CREDENTIALS_MSG,
        RESTAURANT_NOT_FOUND_MSG,
    },
    data_backend::auth_api,
    data_types::{
        admin_types::{
            AdminCredentials, ClientDetails, Device, NewClient, NewRestaurant, Profile, Restaurant,
            RestaurantCredentials, RestaurantUpdate,
        },
        Role, YearOfStudy,
    },
    errors::{ApiError, FormError},
    navigation::Route,
    session::AppContext,
};

#[dynamic]
static EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

/// Asked before anything destructive is sent.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every prompt with yes (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        log::debug!("auto-confirmed: {}", prompt);
        true
    }
}

pub fn require<S: AsRef<str>>(fields: &[S]) -> Result<(), FormError> {
    if fields.iter().any(|field| field.as_ref().trim().is_empty()) {
        return Err(FormError::MissingFields);
    }
    Ok(())
}

pub fn check_email(email: &str) -> Result<(), FormError> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

/// A strictly positive amount (prices, top-ups).
pub fn parse_amount(raw: &str) -> Result<f64, FormError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        _ => Err(FormError::InvalidAmount(raw.to_string())),
    }
}

/// A non-zero amount; negative values take money off a balance.
pub fn parse_adjustment(raw: &str) -> Result<f64, FormError> {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount != 0.0 => Ok(amount),
        _ => Err(FormError::InvalidAmount(raw.to_string())),
    }
}

/// Comma separated device ids, blanks dropped.
pub fn parse_devices(raw: &str) -> Vec<Device> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Device::new)
        .collect()
}

/// The server's message for a failed call, else `fallback`.
pub fn form_error(err: &ApiError, fallback: &str) -> FormError {
    FormError::Rejected(err.user_message(fallback))
}

pub fn login_error(role: Role, err: &ApiError) -> FormError {
    match (err.status(), role) {
        (Some(401), _) => FormError::Rejected(INVALID_CREDENTIALS_MSG.to_string()),
        (Some(404), Role::Admin) => FormError::Rejected(ADMIN_NOT_FOUND_MSG.to_string()),
        (Some(404), Role::Restaurant) => {
            FormError::Rejected(RESTAURANT_NOT_FOUND_MSG.to_string())
        }
        _ => form_error(err, "Login failed. Please try again."),
    }
}

pub fn signup_error(err: &ApiError) -> FormError {
    match err.status() {
        Some(400) => FormError::Rejected(ADMIN_EXISTS_MSG.to_string()),
        _ => form_error(err, "Signup failed."),
    }
}

/// Client creation from the restaurant side.
pub fn restaurant_client_error(err: &ApiError) -> FormError {
    match err.status() {
        Some(400) => FormError::Rejected(CARD_EXISTS_MSG.to_string()),
        Some(404) => FormError::Rejected(RESTAURANT_NOT_FOUND_MSG.to_string()),
        _ => form_error(err, "Failed to create client."),
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Username for admins, email for restaurants.
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    /// Logs in, stores the session and returns the dashboard to open. Nothing is
    /// stored on failure.
    pub async fn submit(&self, ctx: &AppContext, role: Role) -> Result<Route, FormError> {
        require(&[&self.identifier, &self.password])?;

        let login = match role {
            Role::Admin => {
                let credentials = AdminCredentials {
                    username: self.identifier.trim().to_string(),
                    password: self.password.clone(),
                };
                auth_api::login_admin(&ctx.api, &credentials).await
            }
            Role::Restaurant => {
                let credentials = RestaurantCredentials {
                    email: self.identifier.trim().to_string(),
                    password: self.password.clone(),
                };
                auth_api::login_restaurant(&ctx.api, &credentials).await
            }
        };
        let login = login.map_err(|err| login_error(role, &err))?;

        ctx.store
            .store_login(&login.token, role)
            .await
            .map_err(|err| FormError::Rejected(err.to_string()))?;

        log::info!("Logged in as {}", role);
        Ok(Route::for_role(role))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminForm {
    pub username: String,
    pub password: String,
}

impl AdminForm {
    pub fn to_payload(&self) -> Result<AdminCredentials, FormError> {
        require(&[&self.username, &self.password])?;
        Ok(AdminCredentials {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Public signup; on success the operator continues at the login screen.
    pub async fn signup(&self, ctx: &AppContext) -> Result<Route, FormError> {
        let credentials = self.to_payload()?;
        auth_api::signup_admin(&ctx.api, None, &credentials)
            .await
            .map_err(|err| signup_error(&err))?;
        Ok(Route::Login)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestaurantForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub meal_price: String,
    pub devices: String,
}

impl RestaurantForm {
    pub fn to_payload(&self) -> Result<NewRestaurant, FormError> {
        require(&[&self.name, &self.email, &self.password, &self.meal_price])?;
        check_email(&self.email)?;

        Ok(NewRestaurant {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            meal_price: parse_amount(&self.meal_price)?,
            devices: parse_devices(&self.devices),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditRestaurantForm {
    pub name: String,
    pub email: String,
    pub meal_price: String,
    pub devices: String,
}

impl EditRestaurantForm {
    /// Prefilled from the cached record.
    pub fn from_restaurant(restaurant: &Restaurant) -> Self {
        EditRestaurantForm {
            name: restaurant.name.clone(),
            email: restaurant.email.clone(),
            meal_price: restaurant.meal_price.to_string(),
            devices: restaurant.device_list(),
        }
    }

    pub fn to_payload(&self) -> Result<RestaurantUpdate, FormError> {
        require(&[&self.name, &self.email, &self.meal_price])?;
        check_email(&self.email)?;

        Ok(RestaurantUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            meal_price: parse_amount(&self.meal_price)?,
            devices: Some(parse_devices(&self.devices)),
            password: None,
        })
    }
}

/// A restaurant's own settings. The password is only sent when one was typed.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub name: String,
    pub email: String,
    pub meal_price: String,
    pub password: String,
}

impl SettingsForm {
    pub fn from_profile(profile: &Profile) -> Self {
        SettingsForm {
            name: profile.name.clone().unwrap_or_default(),
            email: profile.email.clone().unwrap_or_default(),
            meal_price: profile
                .meal_price
                .map(|price| price.to_string())
                .unwrap_or_default(),
            password: String::new(),
        }
    }

    pub fn to_payload(&self) -> Result<RestaurantUpdate, FormError> {
        require(&[&self.name, &self.email, &self.meal_price])?;
        check_email(&self.email)?;

        Ok(RestaurantUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            meal_price: parse_amount(&self.meal_price)?,
            devices: None,
            password: Some(self.password.clone()).filter(|password| !password.is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub id_number: String,
    pub card_number: String,
    pub year_of_study: String,
    pub field_of_study: String,
}

impl ClientForm {
    fn base_payload(&self) -> Result<NewClient, FormError> {
        require(&[
            &self.name,
            &self.phone,
            &self.id_number,
            &self.card_number,
            &self.year_of_study,
            &self.field_of_study,
        ])?;

        Ok(NewClient {
            name: self.name.trim().to_string(),
            email: None,
            phone: self.phone.trim().to_string(),
            id_number: self.id_number.trim().to_string(),
            card_number: self.card_number.trim().to_string(),
            year_of_study: self.year_of_study.parse::<YearOfStudy>()?,
            field_of_study: self.field_of_study.trim().to_string(),
            restaurant_id: None,
        })
    }

    /// Admin-side creation; email is required there.
    pub fn to_admin_payload(&self) -> Result<NewClient, FormError> {
        require(&[&self.email])?;
        let mut payload = self.base_payload()?;
        check_email(&self.email)?;
        payload.email = Some(self.email.trim().to_string());
        Ok(payload)
    }

    /// Restaurant-side creation subscribes the client to `restaurant_id`.
    pub fn to_restaurant_payload(&self, restaurant_id: &str) -> Result<NewClient, FormError> {
        let mut payload = self.base_payload()?;
        if !self.email.trim().is_empty() {
            check_email(&self.email)?;
            payload.email = Some(self.email.trim().to_string());
        }
        payload.restaurant_id = Some(restaurant_id.to_string());
        Ok(payload)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientDetailsForm {
    pub name: String,
    pub phone: String,
    pub id_number: String,
}

impl ClientDetailsForm {
    pub fn to_payload(&self) -> Result<ClientDetails, FormError> {
        require(&[&self.name, &self.phone, &self.id_number])?;
        Ok(ClientDetails {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            id_number: self.id_number.trim().to_string(),
        })
    }
}
