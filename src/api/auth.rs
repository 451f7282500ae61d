use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::models::Role;
use crate::services::auth_service::{self, OAUTH_STATE_COOKIE, SESSION_COOKIE};
use crate::services::profile_service;
use crate::views;

const STATE_TTL_MINUTES: i64 = 10;
const SIGNIN_FAILED_TARGET: &str = "/?error=signin_failed";

fn cookie<'c>(ctx: &AppContext, name: &'c str, value: String, max_age: CookieDuration) -> Cookie<'c> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(ctx.config.frontend_origin.starts_with("https://"))
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
}

fn expired<'c>(ctx: &AppContext, name: &'c str) -> Cookie<'c> {
    cookie(ctx, name, String::new(), CookieDuration::ZERO)
}

fn popup_failure(ctx: &AppContext) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(expired(ctx, OAUTH_STATE_COOKIE))
        .body(views::popup_result(SIGNIN_FAILED_TARGET))
}

/// Starts the popup sign-in: remembers a fresh state value and sends the
/// popup to the identity provider.
pub async fn google_sign_in(ctx: web::Data<AppContext>) -> HttpResponse {
    log::info!("🔐 GET /auth/google - Starting sign-in");

    let state = Uuid::new_v4().simple().to_string();
    match ctx.identity.authorization_url(&state) {
        Ok(url) => HttpResponse::Found()
            .cookie(cookie(&ctx, OAUTH_STATE_COOKIE, state, CookieDuration::minutes(STATE_TTL_MINUTES)))
            .insert_header((header::LOCATION, url))
            .finish(),
        Err(e) => {
            log::error!("❌ Failed to build authorization URL: {}", e);
            popup_failure(&ctx)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn google_callback(
    ctx: web::Data<AppContext>,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    log::info!("🔐 GET /auth/callback - Completing sign-in");

    if let Some(error) = &query.error {
        log::warn!("❌ Identity provider returned an error: {}", error);
        return popup_failure(&ctx);
    }

    let expected_state = req.cookie(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    if expected_state.is_none() || expected_state != query.state {
        log::warn!("❌ Sign-in state mismatch");
        return popup_failure(&ctx);
    }

    let code = match &query.code {
        Some(code) => code,
        None => {
            log::warn!("❌ No authorization code provided");
            return popup_failure(&ctx);
        }
    };

    match auth_service::complete_sign_in(&ctx, code).await {
        Ok(sign_in) => {
            log::info!(
                "✅ Signed in: {} ({}){}",
                sign_in.user.uid,
                sign_in.role.as_str(),
                if sign_in.first_sign_in { " - new profile" } else { "" }
            );
            let ttl = CookieDuration::seconds(ctx.sessions.ttl().num_seconds());
            HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .cookie(cookie(&ctx, SESSION_COOKIE, sign_in.token, ttl))
                .cookie(expired(&ctx, OAUTH_STATE_COOKIE))
                .body(views::popup_result("/dashboard"))
        }
        Err(e) => {
            log::error!("❌ Sign-in failed: {}", e);
            popup_failure(&ctx)
        }
    }
}

pub async fn logout(ctx: web::Data<AppContext>, req: HttpRequest) -> HttpResponse {
    match auth_service::session_from_request(&req, &ctx.sessions) {
        Some(claims) => {
            log::info!("👋 POST /auth/logout - {}", claims.sub);
            auth_service::sign_out(&ctx, &claims);
        }
        None => log::debug!("Logout without a session"),
    }

    HttpResponse::SeeOther()
        .cookie(expired(&ctx, SESSION_COOKIE))
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub role: Role,
    pub new_profile: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Signed-in user", body = MeResponse),
        (status = 401, description = "No valid session")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(ctx: web::Data<AppContext>, req: HttpRequest) -> HttpResponse {
    log::info!("👤 GET /auth/me");

    let claims = match auth_service::session_from_request(&req, &ctx.sessions) {
        Some(claims) => claims,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": "Not signed in"
            }));
        }
    };

    match profile_service::get_profile(ctx.store.as_ref(), &claims.sub).await {
        Ok(profile) => {
            let me = MeResponse {
                uid: claims.sub.clone(),
                email: claims.email.clone(),
                display_name: profile
                    .as_ref()
                    .map(|p| p.display_name.clone())
                    .filter(|name| !name.is_empty())
                    .or(claims.name.clone()),
                photo_url: profile
                    .as_ref()
                    .and_then(|p| p.photo_url.clone())
                    .or(claims.picture.clone()),
                role: profile.as_ref().map(|p| p.role).unwrap_or_default(),
                new_profile: profile.is_none(),
            };
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "user": me
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to load profile {}: {}", claims.sub, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
