use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::context::AppContext;
use crate::services::auth_service::Claims;
use crate::services::dashboard_service::{self, CourseFilter};
use crate::views::dashboard::dashboard_page;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    filter: Option<String>,
}

/// Student dashboard. Sits behind the signed-in gate.
pub async fn dashboard(
    ctx: web::Data<AppContext>,
    claims: web::ReqData<Claims>,
    query: web::Query<DashboardQuery>,
) -> HttpResponse {
    log::info!("📊 GET /dashboard - {}", claims.sub);

    let filter = CourseFilter::parse(query.filter.as_deref());
    let data = dashboard_service::load_dashboard(ctx.store.as_ref(), &claims.sub, filter).await;

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(dashboard_page(&data, &claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{session_for, test_context, StubIdentity};
    use crate::database::{COURSES, ENROLLMENTS};
    use crate::middleware::AuthMiddleware;
    use crate::services::auth_service::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use mongodb::bson::doc;

    #[actix_web::test]
    async fn test_dashboard_renders_enrollments_for_session_user() {
        let ctx = web::Data::new(test_context());
        ctx.store
            .create(COURSES, doc! { "id": "rust", "title": "Rust from zero", "published": true })
            .await
            .unwrap();
        ctx.store
            .create(
                ENROLLMENTS,
                doc! { "userId": "uid-ana", "courseId": "rust", "progress": 30.0, "timeSpent": 2.5, "enrolledAt": 1_i64 },
            )
            .await
            .unwrap();
        let token = session_for(&ctx, &StubIdentity::ana());

        let app = test::init_service(
            App::new().app_data(ctx).service(
                web::scope("/dashboard")
                    .wrap(AuthMiddleware::signed_in())
                    .route("", web::get().to(dashboard)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/dashboard?filter=in-progress")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("Rust from zero"));
        assert!(body.contains("2.5h"));
        assert!(body.contains(r#"data-filter="in-progress""#));
        assert!(body.contains("Welcome back, Ana Lima"));
    }
}
