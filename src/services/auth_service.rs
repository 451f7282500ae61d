use std::collections::HashSet;

use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::context::AppContext;
use crate::models::{IdentityUser, Role};
use crate::services::auth_events::AuthStateChange;
use crate::services::profile_service;
use crate::utils::AppError;

pub const SESSION_COOKIE: &str = "session";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // identity uid
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

/// Signing material for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl SessionKeys {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl: Duration::hours(config.session_ttl_hours),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &IdentityUser) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.uid.clone(),
            email: user.email.clone(),
            name: Some(user.display_name.clone()),
            picture: user.photo_url.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::SessionError(format!("Failed to generate token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let mut issuers = HashSet::new();
        issuers.insert(self.issuer.clone());
        validation.iss = Some(issuers);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::SessionError(format!("Invalid token: {}", e)))
    }
}

/// Session carried by the request: the session cookie first, then a Bearer header.
pub fn session_from_request(req: &HttpRequest, keys: &SessionKeys) -> Option<Claims> {
    let token = req
        .cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::to_string)
        })?;

    match keys.verify(&token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            log::debug!("Ignoring session: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignIn {
    pub token: String,
    pub user: IdentityUser,
    pub role: Role,
    pub first_sign_in: bool,
}

/// Completes the popup sign-in: code exchange, profile upsert, session token.
pub async fn complete_sign_in(ctx: &AppContext, code: &str) -> Result<SignIn, AppError> {
    let identity = ctx.identity.exchange_code(code).await?;
    let now = Utc::now().timestamp();

    let profile = profile_service::upsert_profile(ctx.store.as_ref(), &identity, now).await?;
    if !profile.user.is_active {
        log::warn!("⚠️ Inactive account tried to sign in: {}", identity.uid);
        return Err(AppError::InvalidRequest("Account is inactive".to_string()));
    }

    let token = ctx.sessions.issue(&identity)?;

    ctx.auth_events.publish(AuthStateChange::SignedIn {
        user: identity.clone(),
        first_sign_in: profile.created,
    });

    Ok(SignIn {
        token,
        user: identity,
        role: profile.user.role,
        first_sign_in: profile.created,
    })
}

pub fn sign_out(ctx: &AppContext, claims: &Claims) {
    ctx.auth_events.publish(AuthStateChange::SignedOut {
        uid: claims.sub.clone(),
    });
}
