//! Persisted client state: the session token, its role and a few UI preferences.
//!
//! `SessionStore` owns the session file; nothing else reads or writes it.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::{api_client::ApiClient, data_types::Role, errors::SessionError};

/// Claims read from the token payload. Unverified: good for a subject id and an
/// expiry hint, never for anything shown as authoritative.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| SessionError::MalformedToken("missing payload segment".into()))?;

    // some issuers pad, the url-safe engine must not see it
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|err| SessionError::MalformedToken(err.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|err| SessionError::MalformedToken(err.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub claims: TokenClaims,
}

impl Session {
    pub fn subject(&self) -> &str {
        &self.claims.id
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims
            .expires_at()
            .is_some_and(|expires_at| expires_at <= now)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub admin_sidebar_collapsed: bool,
    #[serde(default)]
    pub restaurant_sidebar_collapsed: bool,
    /// Cached restaurant id of the last restaurant login.
    #[serde(default)]
    pub restaurant_id: Option<String>,
}

impl Preferences {
    pub fn sidebar_collapsed(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin_sidebar_collapsed,
            Role::Restaurant => self.restaurant_sidebar_collapsed,
        }
    }

    pub fn set_sidebar_collapsed(&mut self, role: Role, collapsed: bool) {
        match role {
            Role::Admin => self.admin_sidebar_collapsed = collapsed,
            Role::Restaurant => self.restaurant_sidebar_collapsed = collapsed,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct SessionFile {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    preferences: Preferences,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SessionFile, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(SessionFile::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SessionFile::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the file readable by its owner only, since it holds the bearer token.
    async fn save(&self, file: &SessionFile) -> Result<(), SessionError> {
        let json = serde_json::to_vec_pretty(file)?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut out = options.open(&self.path).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // files from older runs keep their mode on open
            out.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        out.write_all(&json).await?;
        out.flush().await?;
        Ok(())
    }

    /// The stored session as of `now`. An expired token is cleared from disk.
    pub async fn session_at(&self, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let mut file = self.load().await?;
        let (Some(token), Some(role)) = (file.token.clone(), file.role) else {
            return Err(SessionError::NoSession);
        };

        let session = Session {
            claims: decode_claims(&token)?,
            token,
            role,
        };

        if session.is_expired_at(now) {
            log::info!("Stored {} session expired, clearing it", role);
            file.token = None;
            file.role = None;
            self.save(&file).await?;
            return Err(SessionError::Expired);
        }

        Ok(session)
    }

    pub async fn session(&self) -> Result<Session, SessionError> {
        self.session_at(Utc::now()).await
    }

    /// Like `session`, but only a session of `role` is accepted.
    pub async fn require_role(&self, role: Role) -> Result<Session, SessionError> {
        let session = self.session().await?;
        if session.role != role {
            return Err(SessionError::RoleMismatch {
                expected: role.as_str(),
                found: session.role.as_str(),
            });
        }
        Ok(session)
    }

    /// Persists a fresh login. Restaurant logins also cache their restaurant id.
    pub async fn store_login(&self, token: &str, role: Role) -> Result<Session, SessionError> {
        let claims = decode_claims(token)?;
        let mut file = self.load().await?;
        file.token = Some(token.to_string());
        file.role = Some(role);
        file.preferences.restaurant_id = match role {
            Role::Restaurant => Some(claims.id.clone()),
            Role::Admin => None,
        };
        self.save(&file).await?;

        Ok(Session {
            token: token.to_string(),
            role,
            claims,
        })
    }

    /// Drops the token and the cached restaurant id; other preferences survive.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut file = self.load().await?;
        file.token = None;
        file.role = None;
        file.preferences.restaurant_id = None;
        self.save(&file).await
    }

    pub async fn preferences(&self) -> Result<Preferences, SessionError> {
        Ok(self.load().await?.preferences)
    }

    pub async fn update_preferences(
        &self,
        update: impl FnOnce(&mut Preferences),
    ) -> Result<Preferences, SessionError> {
        let mut file = self.load().await?;
        update(&mut file.preferences);
        self.save(&file).await?;
        Ok(file.preferences)
    }
}

/// Handed to every operation in place of ambient global state.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub store: SessionStore,
}

impl AppContext {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        AppContext { api, store }
    }
}
