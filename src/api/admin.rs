use actix_web::http::header;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::context::AppContext;
use crate::database::COURSES;
use crate::models::{Course, CourseForm, Role};
use crate::services::auth_service::Claims;
use crate::services::upload_service::{self, UploadRequest};
use crate::services::{activity_service, admin_service};
use crate::utils::AppError;
use crate::views::admin::{admin_page, AdminPanel, AdminSection};

#[derive(Debug, Deserialize)]
pub struct PanelQuery {
    section: Option<String>,
    edit: Option<String>,
    notice: Option<String>,
}

fn back_to(section: AdminSection, notice: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            header::LOCATION,
            format!("/admin?section={}&notice={}", section.slug(), notice),
        ))
        .finish()
}

/// Maps a failed admin write to the flash shown after the redirect.
fn failure_notice(action: &str, e: &AppError) -> &'static str {
    match e {
        AppError::NotFound(_) => {
            log::warn!("⚠️ {}: {}", action, e);
            "not_found"
        }
        AppError::InvalidRequest(_) => {
            log::warn!("⚠️ {}: {}", action, e);
            "course_invalid"
        }
        _ => {
            log::error!("❌ {}: {}", action, e);
            "save_failed"
        }
    }
}

fn author_name(claims: &Claims) -> &str {
    claims.name.as_deref().unwrap_or(&claims.email)
}

async fn load_panel(ctx: &AppContext, uid: &str, section: AdminSection, edit: Option<&str>) -> AdminPanel {
    let store = ctx.store.as_ref();
    match section {
        AdminSection::Dashboard => {
            let (stats, activity) = tokio::join!(admin_service::load_stats(store), activity_service::recent(store));
            AdminPanel::Dashboard {
                stats: stats.unwrap_or_else(|e| {
                    log::error!("❌ Failed to load admin stats: {}", e);
                    Default::default()
                }),
                activity: activity.unwrap_or_else(|e| {
                    log::error!("❌ Failed to load recent activity: {}", e);
                    Vec::new()
                }),
                now: Utc::now().timestamp(),
            }
        }
        AdminSection::Courses => {
            let courses = admin_service::list_courses(store).await.unwrap_or_else(|e| {
                log::error!("❌ Failed to load courses: {}", e);
                Vec::new()
            });
            let editing = match edit {
                Some(id) => match store.get(COURSES, id).await {
                    Ok(Some(record)) => record.into_model::<Course>().ok(),
                    Ok(None) => None,
                    Err(e) => {
                        log::error!("❌ Failed to load course {}: {}", id, e);
                        None
                    }
                },
                None => None,
            };
            AdminPanel::Courses { courses, editing }
        }
        AdminSection::Users => AdminPanel::Users {
            users: admin_service::list_users(store).await.unwrap_or_else(|e| {
                log::error!("❌ Failed to load users: {}", e);
                Vec::new()
            }),
        },
        AdminSection::Content => AdminPanel::Content {
            media: admin_service::list_media(store).await.unwrap_or_else(|e| {
                log::error!("❌ Failed to load media: {}", e);
                Vec::new()
            }),
            upload: ctx.uploads.state_of(uid),
        },
    }
}

/// Admin panel. Sits behind the admin gate.
pub async fn panel(
    ctx: web::Data<AppContext>,
    claims: web::ReqData<Claims>,
    query: web::Query<PanelQuery>,
) -> HttpResponse {
    let section = AdminSection::parse(query.section.as_deref());
    log::info!("🛠️ GET /admin - {} ({})", section.slug(), claims.sub);

    let panel = load_panel(&ctx, &claims.sub, section, query.edit.as_deref()).await;
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(admin_page(&panel, &claims, query.notice.as_deref()))
}

pub async fn create_course(
    ctx: web::Data<AppContext>,
    claims: web::ReqData<Claims>,
    form: web::Form<CourseForm>,
) -> HttpResponse {
    let now = Utc::now().timestamp();
    match admin_service::create_course(ctx.store.as_ref(), &form, &claims.sub, author_name(&claims), now).await {
        Ok(_) => back_to(AdminSection::Courses, "course_created"),
        Err(e) => back_to(AdminSection::Courses, failure_notice("Course creation failed", &e)),
    }
}

pub async fn update_course(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    form: web::Form<CourseForm>,
) -> HttpResponse {
    let id = path.into_inner();
    match admin_service::update_course(ctx.store.as_ref(), &id, &form, Utc::now().timestamp()).await {
        Ok(()) => back_to(AdminSection::Courses, "course_updated"),
        Err(e) => back_to(AdminSection::Courses, failure_notice("Course update failed", &e)),
    }
}

pub async fn delete_course(ctx: web::Data<AppContext>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    match admin_service::delete_course(ctx.store.as_ref(), &id).await {
        Ok(()) => back_to(AdminSection::Courses, "course_deleted"),
        Err(e) => back_to(AdminSection::Courses, failure_notice("Course deletion failed", &e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    role: String,
}

pub async fn set_user_role(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
    form: web::Form<RoleForm>,
) -> HttpResponse {
    let uid = path.into_inner();
    let role = Role::from(form.role.as_str());
    match admin_service::set_user_role(ctx.store.as_ref(), &uid, role).await {
        Ok(()) => back_to(AdminSection::Users, "role_updated"),
        Err(e) => back_to(AdminSection::Users, failure_notice("Role change failed", &e)),
    }
}

pub async fn toggle_user(ctx: web::Data<AppContext>, path: web::Path<String>) -> HttpResponse {
    let uid = path.into_inner();
    match admin_service::toggle_user_status(ctx.store.as_ref(), &uid).await {
        Ok(_) => back_to(AdminSection::Users, "status_updated"),
        Err(e) => back_to(AdminSection::Users, failure_notice("Status change failed", &e)),
    }
}

pub async fn delete_media(ctx: web::Data<AppContext>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    match admin_service::delete_media(ctx.store.as_ref(), &id).await {
        Ok(()) => back_to(AdminSection::Content, "media_deleted"),
        Err(e) => back_to(AdminSection::Content, failure_notice("Media deletion failed", &e)),
    }
}

/// Accepts a batch of file descriptors and runs the simulated transfer in the
/// background. Progress is read from the status endpoint.
pub async fn upload_media(
    ctx: web::Data<AppContext>,
    claims: web::ReqData<Claims>,
    body: web::Json<UploadRequest>,
) -> HttpResponse {
    let files = match upload_service::prepare(body.into_inner().files) {
        Ok(files) => files,
        Err(e) => {
            log::warn!("⚠️ Rejected upload from {}: {}", claims.sub, e);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e.to_string()
            }));
        }
    };

    let first = files.first().map(|f| f.name.clone()).unwrap_or_default();
    let sender = match ctx.uploads.try_begin(&claims.sub, &first, files.len()) {
        Some(sender) => sender,
        None => {
            return HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "error": "An upload is already running"
            }));
        }
    };

    let count = files.len();
    let uploader = claims.sub.clone();
    let ctx = ctx.into_inner();
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        upload_service::run_upload(
            ctx.store.as_ref(),
            files,
            &uploader,
            &ctx.config.media_base_url,
            &mut rng,
            |state| {
                sender.send_replace(state);
            },
        )
        .await;
    });

    HttpResponse::Accepted().json(serde_json::json!({
        "success": true,
        "files": count
    }))
}

pub async fn upload_status(ctx: web::Data<AppContext>, claims: web::ReqData<Claims>) -> HttpResponse {
    HttpResponse::Ok().json(ctx.uploads.state_of(&claims.sub))
}
