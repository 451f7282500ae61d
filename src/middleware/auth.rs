use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::context::AppContext;
use crate::models::Role;
use crate::services::auth_service::session_from_request;
use crate::services::profile_service;

pub const SIGNED_OUT_REDIRECT: &str = "/";
pub const ACCESS_DENIED_REDIRECT: &str = "/?error=access_denied";
pub const SUSPENDED_REDIRECT: &str = "/?error=account_suspended";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Valid session of an account that isn't suspended
    SignedIn,
    /// Valid session of an active account whose stored role is admin
    Admin,
}

/// Page gate. Requests that pass carry their `Claims` in the request
/// extensions; the rest are redirected.
pub struct AuthMiddleware {
    gate: Gate,
}

impl AuthMiddleware {
    pub fn signed_in() -> Self {
        Self { gate: Gate::SignedIn }
    }

    pub fn admin() -> Self {
        Self { gate: Gate::Admin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            gate: self.gate,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    gate: Gate,
}

fn redirect<B>(req: ServiceRequest, location: &'static str) -> ServiceResponse<EitherBody<B>> {
    let (request, _) = req.into_parts();
    let response = HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
        .map_into_right_body();
    ServiceResponse::new(request, response)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate;

        Box::pin(async move {
            let ctx = match req.app_data::<web::Data<AppContext>>().cloned() {
                Some(ctx) => ctx,
                None => {
                    log::error!("❌ AppContext missing from app data");
                    return Ok(redirect(req, SIGNED_OUT_REDIRECT));
                }
            };

            let claims = match session_from_request(req.request(), &ctx.sessions) {
                Some(claims) => claims,
                None => {
                    log::debug!("No session for {}, redirecting", req.path());
                    return Ok(redirect(req, SIGNED_OUT_REDIRECT));
                }
            };

            // The profile is re-read on every request so suspensions and role
            // changes apply to sessions that are already open.
            let profile = profile_service::get_profile(ctx.store.as_ref(), &claims.sub).await;

            match (gate, profile) {
                (_, Ok(Some(user))) if !user.is_active => {
                    log::warn!("🚫 Suspended account {} tried {}", claims.sub, req.path());
                    return Ok(redirect(req, SUSPENDED_REDIRECT));
                }
                (Gate::SignedIn, Ok(_)) => {}
                (Gate::SignedIn, Err(e)) => {
                    // Page data degrades to its empty state on the same error
                    log::error!("❌ Profile lookup failed for {}: {}", claims.sub, e);
                }
                (Gate::Admin, Ok(Some(user))) if user.role == Role::Admin => {}
                (Gate::Admin, Ok(user)) => {
                    let role = user.map(|u| u.role).unwrap_or_default();
                    log::warn!("🚫 {} ({}) denied admin access", claims.sub, role.as_str());
                    return Ok(redirect(req, ACCESS_DENIED_REDIRECT));
                }
                // Fails closed: lookup errors count as "not admin"
                (Gate::Admin, Err(e)) => {
                    log::error!("❌ Role lookup failed for {}: {}", claims.sub, e);
                    return Ok(redirect(req, ACCESS_DENIED_REDIRECT));
                }
            }

            req.extensions_mut().insert(claims);
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::testing::{admin_context, session_for, test_context, StubIdentity};
    use crate::database::{DocumentStore, Query, Record, USERS};
    use crate::services::admin_service;
    use crate::services::auth_service::{Claims, SESSION_COOKIE};
    use crate::utils::AppError;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use mongodb::bson::{doc, Document};
    use std::sync::Arc;

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn create(&self, _: &str, _: Document) -> Result<String, AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
        async fn find(&self, _: &Query) -> Result<Vec<Record>, AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
        async fn get(&self, _: &str, _: &str) -> Result<Option<Record>, AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
        async fn merge(&self, _: &str, _: &str, _: Document) -> Result<(), AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<bool, AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
        async fn count(&self, _: &str) -> Result<u64, AppError> {
            Err(AppError::DatabaseError("offline".into()))
        }
    }

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.sub.clone())
    }

    async fn status_for(ctx: AppContext, gate: AuthMiddleware, session: Option<String>) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(web::scope("/area").wrap(gate).route("", web::get().to(whoami))),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/area");
        if let Some(token) = session {
            req = req.cookie(Cookie::new(SESSION_COOKIE, token));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (resp.status(), location)
    }

    #[actix_web::test]
    async fn test_missing_session_redirects_home() {
        let (status, location) = status_for(test_context(), AuthMiddleware::signed_in(), None).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/"));

        let (status, _) = status_for(test_context(), AuthMiddleware::signed_in(), Some("junk".into())).await;
        assert_eq!(status, StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn test_signed_in_gate_passes_claims() {
        let ctx = test_context();
        let token = session_for(&ctx, &StubIdentity::ana());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .service(web::scope("/area").wrap(AuthMiddleware::signed_in()).route("", web::get().to(whoami))),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/area")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "uid-ana");
    }

    #[actix_web::test]
    async fn test_admin_gate_allows_admin() {
        let ctx = admin_context().await;
        let token = session_for(&ctx, &StubIdentity::admin());
        let (status, _) = status_for(ctx, AuthMiddleware::admin(), Some(token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_admin_gate_denies_other_roles_and_missing_profile() {
        for role in ["student", "instructor"] {
            let ctx = test_context();
            ctx.store.merge(USERS, "uid-ana", doc! { "role": role }).await.unwrap();
            let token = session_for(&ctx, &StubIdentity::ana());

            let (status, location) = status_for(ctx, AuthMiddleware::admin(), Some(token)).await;
            assert_eq!(status, StatusCode::FOUND);
            assert_eq!(location.as_deref(), Some(ACCESS_DENIED_REDIRECT));
        }

        let ctx = test_context();
        let token = session_for(&ctx, &StubIdentity::ana());
        let (_, location) = status_for(ctx, AuthMiddleware::admin(), Some(token)).await;
        assert_eq!(location.as_deref(), Some(ACCESS_DENIED_REDIRECT));
    }

    #[actix_web::test]
    async fn test_admin_gate_fails_closed_on_lookup_error() {
        let ctx = AppContext::new(Config::for_tests(), Arc::new(BrokenStore), Arc::new(StubIdentity));
        let token = session_for(&ctx, &StubIdentity::admin());

        let (status, location) = status_for(ctx, AuthMiddleware::admin(), Some(token)).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some(ACCESS_DENIED_REDIRECT));
    }

    #[actix_web::test]
    async fn test_suspended_admin_loses_open_session() {
        let ctx = admin_context().await;
        let token = session_for(&ctx, &StubIdentity::admin());
        assert!(!admin_service::toggle_user_status(ctx.store.as_ref(), "uid-admin").await.unwrap());

        let (status, location) = status_for(ctx, AuthMiddleware::admin(), Some(token)).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some(SUSPENDED_REDIRECT));
    }

    #[actix_web::test]
    async fn test_signed_in_gate_refuses_suspended_account() {
        let ctx = test_context();
        ctx.store
            .merge(USERS, "uid-ana", doc! { "uid": "uid-ana", "role": "student", "isActive": false })
            .await
            .unwrap();
        let token = session_for(&ctx, &StubIdentity::ana());

        let (status, location) = status_for(ctx, AuthMiddleware::signed_in(), Some(token)).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some(SUSPENDED_REDIRECT));
    }

    #[actix_web::test]
    async fn test_signed_in_gate_tolerates_profile_lookup_error() {
        let ctx = AppContext::new(Config::for_tests(), Arc::new(BrokenStore), Arc::new(StubIdentity));
        let token = session_for(&ctx, &StubIdentity::ana());

        let (status, _) = status_for(ctx, AuthMiddleware::signed_in(), Some(token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
