use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::database::USERS;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up; `status` is degraded when the store is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(ctx: web::Data<AppContext>) -> impl Responder {
    let (status, database) = match ctx.store.count(USERS).await {
        Ok(_) => ("healthy", "ok"),
        Err(e) => {
            log::warn!("⚠️ Health check could not reach the store: {}", e);
            ("degraded", "unavailable")
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        service: "learning-platform".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::test_context;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_reports_store() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_context()))
                .route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "ok");
        assert_eq!(body["service"], "learning-platform");
    }
}
