use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Learning Platform API",
        version = "1.0.0",
        description = "JSON endpoints of the learning platform. Pages are server-rendered; these routes back the sign-in state and the public catalog.\n\n**Authentication:** the `session` cookie set by the Google sign-in popup, or the same token as a Bearer header."
    ),
    paths(
        crate::api::auth::get_me,
        crate::api::catalog::featured_courses,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::api::auth::MeResponse,
            crate::api::catalog::FeaturedCoursesResponse,
            crate::api::health::HealthResponse,
            crate::models::Course,
            crate::models::Role,
        )
    ),
    tags(
        (name = "Auth", description = "Signed-in user information."),
        (name = "Courses", description = "Public course catalog."),
        (name = "Health", description = "Liveness and store reachability."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_json_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/v1/auth/me".to_string()));
        assert!(paths.contains(&"/api/v1/courses/featured".to_string()));
        assert!(paths.contains(&"/health".to_string()));
    }
}
