use std::env;

/// Runtime configuration, read once from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub session_ttl_hours: i64,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: String,
    pub frontend_origin: String,
    pub media_base_url: String,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let port = var_or("PORT", "3002")
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let session_ttl_hours = var_or("SESSION_TTL_HOURS", "24")
            .parse::<i64>()
            .map_err(|e| format!("Invalid SESSION_TTL_HOURS: {}", e))?;

        let jwt_secret = var_or("JWT_SECRET", "default-secret-change-me");
        if jwt_secret == "default-secret-change-me" {
            log::warn!("⚠️ JWT_SECRET not set, using the development default");
        }

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port,
            database_url,
            jwt_secret,
            jwt_issuer: var_or("JWT_ISSUER", "learning-platform"),
            jwt_audience: var_or("JWT_AUDIENCE", "learning-platform-web"),
            session_ttl_hours,
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET").ok(),
            google_redirect_uri: var_or("GOOGLE_REDIRECT_URI", "http://localhost:3002/auth/callback"),
            frontend_origin: var_or("FRONTEND_ORIGIN", "http://localhost:3002"),
            media_base_url: var_or("MEDIA_BASE_URL", "https://kekoweb.org/uploads"),
        })
    }

    /// Settings for tests: in-memory store, fixed secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "memory://".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "learning-platform".to_string(),
            jwt_audience: "learning-platform-web".to_string(),
            session_ttl_hours: 1,
            google_client_id: Some("client-id".to_string()),
            google_client_secret: Some("client-secret".to_string()),
            google_redirect_uri: "http://localhost/auth/callback".to_string(),
            frontend_origin: "http://localhost".to_string(),
            media_base_url: "https://media.test/uploads".to_string(),
        }
    }
}
