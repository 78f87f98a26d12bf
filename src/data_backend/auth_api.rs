use reqwest::Method;

use crate::{
    api_client::{ApiClient, RequestOptions},
    constants::{ADMIN_NOT_FOUND_MSG, RESTAURANT_NOT_FOUND_MSG},
    data_backend::{admin_api, optional_record},
    data_types::{
        admin_types::{Admin, AdminCredentials, LoginResponse, Profile, RestaurantCredentials},
        Role,
    },
    errors::ApiError,
    session::Session,
};

pub async fn login_admin(
    api: &ApiClient,
    credentials: &AdminCredentials,
) -> Result<LoginResponse, ApiError> {
    let options = RequestOptions::new(Method::POST).json(credentials)?;
    api.request_as("/auth/admin/login", options).await
}

pub async fn login_restaurant(
    api: &ApiClient,
    credentials: &RestaurantCredentials,
) -> Result<LoginResponse, ApiError> {
    let options = RequestOptions::new(Method::POST).json(credentials)?;
    api.request_as("/auth/restaurant/login", options).await
}

/// Public signup, and admin creation from the users section when a token is given.
pub async fn signup_admin(
    api: &ApiClient,
    token: Option<&str>,
    credentials: &AdminCredentials,
) -> Result<Option<Admin>, ApiError> {
    let mut options = RequestOptions::new(Method::POST).json(credentials)?;
    if let Some(token) = token {
        options = options.token(token);
    }
    let value = api.request("/auth/admin/signup", options).await?;
    Ok(optional_record(value))
}

/// The caller's own record, from `/auth/me`. Backends without that route answer 404;
/// only then the full listing is scanned for the token's subject.
pub async fn resolve_identity(api: &ApiClient, session: &Session) -> Result<Profile, ApiError> {
    let me = api
        .request_as::<Profile>("/auth/me", RequestOptions::get().token(&session.token))
        .await;

    match me {
        Err(err) if err.status() == Some(404) => {
            log::warn!(
                "/auth/me unavailable, scanning {} listing for {}",
                session.role,
                session.subject()
            );
            find_in_listing(api, session).await
        }
        other => other,
    }
}

/// Name for the dashboard header. A failed lookup leaves the header generic.
pub async fn display_name(api: &ApiClient, session: &Session) -> Option<String> {
    match resolve_identity(api, session).await {
        Ok(profile) => Some(profile.display_name().to_string()),
        Err(err) => {
            log::warn!("Could not resolve {} identity: {}", session.role, err);
            None
        }
    }
}

async fn find_in_listing(api: &ApiClient, session: &Session) -> Result<Profile, ApiError> {
    let id = session.subject();
    let (found, missing_msg) = match session.role {
        Role::Admin => (
            admin_api::get_admins(api, &session.token)
                .await?
                .into_iter()
                .find(|admin| admin.id == id)
                .map(Profile::from),
            ADMIN_NOT_FOUND_MSG,
        ),
        Role::Restaurant => (
            admin_api::get_restaurants(api, &session.token)
                .await?
                .into_iter()
                .find(|restaurant| restaurant.id == id)
                .map(Profile::from),
            RESTAURANT_NOT_FOUND_MSG,
        ),
    };

    found.ok_or_else(|| ApiError::Status {
        status: 404,
        message: missing_msg.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::decode_claims;
    use crate::test_utils::{token_with_payload, StubResponse, StubServer};

    fn session(role: Role, id: &str) -> Session {
        let token = token_with_payload(&format!(r#"{{"id":"{}"}}"#, id));
        Session {
            claims: decode_claims(&token).unwrap(),
            token,
            role,
        }
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = StubServer::start(vec![StubResponse::json(200, r#"{"token":"jwt"}"#)]).await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let credentials = RestaurantCredentials {
            email: "main@campus.rw".into(),
            password: "pw".into(),
        };
        let resp = login_restaurant(&api, &credentials).await.unwrap();
        assert_eq!(resp.token, "jwt");

        let requests = server.requests();
        assert_eq!(requests[0].path, "/auth/restaurant/login");
        assert_eq!(requests[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn identity_comes_from_me_endpoint() {
        let server = StubServer::start(vec![StubResponse::json(
            200,
            r#"{"_id":"a1","username":"root"}"#,
        )])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let profile = resolve_identity(&api, &session(Role::Admin, "a1"))
            .await
            .unwrap();
        assert_eq!(profile.display_name(), "root");
        assert_eq!(server.requests().len(), 1);
        assert_eq!(server.requests()[0].path, "/auth/me");
    }

    #[tokio::test]
    async fn identity_falls_back_to_listing_on_404() {
        let server = StubServer::start(vec![
            StubResponse::json(404, r#"{"message":"Not found"}"#),
            StubResponse::json(
                200,
                r#"[{"_id":"r1","name":"Other"},{"_id":"r2","name":"Mine","mealPrice":700}]"#,
            ),
        ])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let profile = resolve_identity(&api, &session(Role::Restaurant, "r2"))
            .await
            .unwrap();
        assert_eq!(profile.display_name(), "Mine");
        assert_eq!(profile.meal_price, Some(700.0));
        assert_eq!(server.requests()[1].path, "/admin/restaurants");
    }

    #[tokio::test]
    async fn identity_does_not_fall_back_on_other_errors() {
        let server = StubServer::start(vec![StubResponse::json(
            401,
            r#"{"message":"Token invalid"}"#,
        )])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let err = resolve_identity(&api, &session(Role::Admin, "a1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn display_name_for_header() {
        let server = StubServer::start(vec![
            StubResponse::json(200, r#"{"_id":"r2","name":"Main Campus"}"#),
            StubResponse::json(500, r#"{"message":"boom"}"#),
        ])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();
        let session = session(Role::Restaurant, "r2");

        assert_eq!(
            display_name(&api, &session).await.as_deref(),
            Some("Main Campus")
        );
        assert_eq!(display_name(&api, &session).await, None);
    }

    #[tokio::test]
    async fn missing_subject_is_not_found() {
        let server = StubServer::start(vec![
            StubResponse::empty(404),
            StubResponse::json(200, r#"[{"_id":"a9","username":"other"}]"#),
        ])
        .await;
        let api = ApiClient::new(&server.base_url).unwrap();

        let err = resolve_identity(&api, &session(Role::Admin, "a1"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), ADMIN_NOT_FOUND_MSG);
    }
}
