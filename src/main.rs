mod api;
mod config;
mod context;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
mod utils;
mod views;

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::context::AppContext;
use crate::middleware::AuthMiddleware;
use crate::services::identity_service::GoogleIdentityProvider;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting Learning Platform...");

    let store = database::connect(&config.database_url).await.map_err(|e| {
        log::error!("❌ Failed to open the store: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    log::info!("✅ Store ready");

    let identity = Arc::new(GoogleIdentityProvider::from_config(&config));
    let host = config.host.clone();
    let port = config.port;
    let frontend_origin = config.frontend_origin.clone();

    let ctx = web::Data::new(AppContext::new(config, store, identity));

    log::info!("📰 Starting background jobs...");
    jobs::activity_feed::start_activity_feed(ctx.store.clone(), &ctx.auth_events);
    log::info!("✅ Auth-state subscribers: {}", ctx.auth_events.subscriber_count());

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(ctx.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            .route("/health", web::get().to(api::health::health_check))
            // Pages
            .route("/", web::get().to(api::catalog::home))
            .route("/course", web::get().to(api::catalog::course_detail))
            .service(
                web::scope("/dashboard")
                    .wrap(AuthMiddleware::signed_in())
                    .route("", web::get().to(api::dashboard::dashboard)),
            )
            .service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::admin())
                    .route("", web::get().to(api::admin::panel))
                    .route("/courses", web::post().to(api::admin::create_course))
                    .route("/courses/{id}", web::post().to(api::admin::update_course))
                    .route("/courses/{id}/delete", web::post().to(api::admin::delete_course))
                    .route("/users/{id}/role", web::post().to(api::admin::set_user_role))
                    .route("/users/{id}/toggle", web::post().to(api::admin::toggle_user))
                    .route("/media/upload", web::post().to(api::admin::upload_media))
                    .route("/media/upload/status", web::get().to(api::admin::upload_status))
                    .route("/media/{id}/delete", web::post().to(api::admin::delete_media)),
            )
            // Popup sign-in
            .service(
                web::scope("/auth")
                    .route("/google", web::get().to(api::auth::google_sign_in))
                    .route("/callback", web::get().to(api::auth::google_callback))
                    .route("/logout", web::post().to(api::auth::logout)),
            )
            // JSON
            .route("/api/v1/auth/me", web::get().to(api::auth::get_me))
            .route("/api/v1/courses/featured", web::get().to(api::catalog::featured_courses))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
