use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::context::AppContext;
use crate::models::{Course, Role};
use crate::services::auth_service::{session_from_request, Claims};
use crate::services::{catalog_service, profile_service};
use crate::utils::AppError;
use crate::views::{catalog, Viewer};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    error: Option<String>,
    notice: Option<String>,
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body)
}

/// Session of a public page's visitor with their stored role. A failed
/// role lookup renders the page as for a student.
async fn visitor(ctx: &AppContext, req: &HttpRequest) -> Option<(Claims, Role)> {
    let claims = session_from_request(req, &ctx.sessions)?;
    let role = profile_service::role_of(ctx.store.as_ref(), &claims.sub)
        .await
        .unwrap_or_else(|e| {
            log::warn!("⚠️ Role lookup failed for {}: {}", claims.sub, e);
            Role::Student
        });
    Some((claims, role))
}

fn as_viewer(visitor: &Option<(Claims, Role)>) -> Option<Viewer<'_>> {
    visitor.as_ref().map(|(claims, role)| Viewer::new(claims, *role))
}

/// Landing page with the featured catalog. A failed read shows the empty state.
pub async fn home(ctx: web::Data<AppContext>, req: HttpRequest, query: web::Query<HomeQuery>) -> HttpResponse {
    let session = visitor(&ctx, &req).await;

    let courses = catalog_service::featured_courses(ctx.store.as_ref())
        .await
        .unwrap_or_else(|e| {
            log::error!("❌ Failed to load featured courses: {}", e);
            Vec::new()
        });

    let notice = query.error.as_deref().or(query.notice.as_deref());
    html(catalog::catalog_page(&courses, as_viewer(&session), notice))
}

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    id: Option<String>,
}

pub async fn course_detail(ctx: web::Data<AppContext>, req: HttpRequest, query: web::Query<CourseQuery>) -> HttpResponse {
    let session = visitor(&ctx, &req).await;
    let viewer = as_viewer(&session);

    let id = match query.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => {
            return HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(catalog::course_not_found_page(viewer));
        }
    };

    match catalog_service::published_course(ctx.store.as_ref(), id).await {
        Ok(course) => html(catalog::course_page(&course, viewer)),
        Err(AppError::NotFound(_)) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(catalog::course_not_found_page(viewer)),
        Err(e) => {
            log::error!("❌ Failed to load course {}: {}", id, e);
            HttpResponse::InternalServerError()
                .content_type("text/html; charset=utf-8")
                .body(catalog::course_unavailable_page(viewer))
        }
    }
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct FeaturedCoursesResponse {
    pub success: bool,
    pub courses: Vec<Course>,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/featured",
    tag = "Courses",
    responses(
        (status = 200, description = "Featured, published courses, newest first", body = FeaturedCoursesResponse),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn featured_courses(ctx: web::Data<AppContext>) -> HttpResponse {
    log::info!("📚 GET /courses/featured");

    match catalog_service::featured_courses(ctx.store.as_ref()).await {
        Ok(courses) => HttpResponse::Ok().json(FeaturedCoursesResponse { success: true, courses }),
        Err(e) => {
            log::error!("❌ Failed to load featured courses: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{session_for, test_context, StubIdentity};
    use crate::database::{COURSES, USERS};
    use crate::services::auth_service::SESSION_COOKIE;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use mongodb::bson::doc;

    async fn app_with_courses() -> web::Data<AppContext> {
        let ctx = web::Data::new(test_context());
        ctx.store
            .create(COURSES, doc! { "id": "live", "title": "Live course", "featured": true, "published": true })
            .await
            .unwrap();
        ctx.store
            .create(COURSES, doc! { "id": "draft", "title": "Draft course", "featured": true, "published": false })
            .await
            .unwrap();
        ctx
    }

    #[actix_web::test]
    async fn test_home_lists_featured_and_shows_denial_notice() {
        let ctx = app_with_courses().await;
        let app = test::init_service(App::new().app_data(ctx).route("/", web::get().to(home))).await;

        let req = test::TestRequest::get().uri("/?error=access_denied").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = std::str::from_utf8(&body).unwrap();

        assert!(body.contains("Live course"));
        assert!(!body.contains("Draft course"));
        assert!(body.contains("Access denied"));
    }

    #[actix_web::test]
    async fn test_admin_link_follows_stored_role() {
        let ctx = app_with_courses().await;
        ctx.store.merge(USERS, "uid-ana", doc! { "role": "student" }).await.unwrap();
        let student = session_for(&ctx, &StubIdentity::ana());
        let admin = session_for(&ctx, &StubIdentity::admin());
        ctx.store.merge(USERS, "uid-admin", doc! { "role": "admin" }).await.unwrap();
        let app = test::init_service(App::new().app_data(ctx).route("/", web::get().to(home))).await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, student))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains(r#"id="dashboardLink""#));
        assert!(!body.contains(r#"id="adminLink""#));

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(SESSION_COOKIE, admin))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(std::str::from_utf8(&body).unwrap().contains(r#"id="adminLink""#));
    }

    #[actix_web::test]
    async fn test_course_detail_hides_drafts() {
        let ctx = app_with_courses().await;
        let app = test::init_service(App::new().app_data(ctx).route("/course", web::get().to(course_detail))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/course?id=live").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/course?id=draft").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/course").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_featured_json() {
        let ctx = app_with_courses().await;
        let app = test::init_service(
            App::new()
                .app_data(ctx)
                .route("/api/v1/courses/featured", web::get().to(featured_courses)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/courses/featured").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["courses"].as_array().unwrap().len(), 1);
        assert_eq!(body["courses"][0]["id"], "live");
    }
}
