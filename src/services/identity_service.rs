use async_trait::async_trait;

use crate::config::Config;
use crate::models::IdentityUser;
use crate::utils::AppError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// External identity provider driving the popup sign-in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start sign-in; `state` comes back on the callback.
    fn authorization_url(&self, state: &str) -> Result<String, AppError>;

    /// Trades the callback's authorization code for the signed-in identity.
    async fn exchange_code(&self, code: &str) -> Result<IdentityUser, AppError>;
}

pub struct GoogleIdentityProvider {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleIdentityProvider {
    pub fn from_config(config: &Config) -> Self {
        if config.google_client_id.is_none() || config.google_client_secret.is_none() {
            log::warn!("⚠️ GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not configured, sign-in is disabled");
        }
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            http: reqwest::Client::new(),
        }
    }

    fn client_id(&self) -> Result<&str, AppError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| AppError::IdentityError("GOOGLE_CLIENT_ID not configured".to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        let client_id = self.client_id()?;

        let params = [
            ("client_id", client_id),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
            ("prompt", "select_account"),
        ];

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}?{}", GOOGLE_AUTH_URL, query_string))
    }

    async fn exchange_code(&self, code: &str) -> Result<IdentityUser, AppError> {
        let client_id = self.client_id()?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| AppError::IdentityError("GOOGLE_CLIENT_SECRET not configured".to_string()))?;

        let token_response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::IdentityError(format!("Failed to exchange code: {}", e)))?;

        if !token_response.status().is_success() {
            return Err(AppError::IdentityError(format!(
                "Code exchange rejected with status {}",
                token_response.status()
            )));
        }

        let tokens: serde_json::Value = token_response
            .json()
            .await
            .map_err(|e| AppError::IdentityError(format!("Failed to parse token response: {}", e)))?;

        let access_token = tokens["access_token"]
            .as_str()
            .ok_or_else(|| AppError::IdentityError("No access token in response".to_string()))?;

        let user_info: serde_json::Value = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::IdentityError(format!("Failed to get user info: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::IdentityError(format!("Failed to parse user info: {}", e)))?;

        identity_from_userinfo(&user_info)
    }
}

fn identity_from_userinfo(user_info: &serde_json::Value) -> Result<IdentityUser, AppError> {
    let uid = user_info["id"]
        .as_str()
        .ok_or_else(|| AppError::IdentityError("No id in user info".to_string()))?;
    let email = user_info["email"]
        .as_str()
        .ok_or_else(|| AppError::IdentityError("No email in user info".to_string()))?;

    Ok(IdentityUser {
        uid: uid.to_string(),
        display_name: user_info["name"].as_str().unwrap_or(email).to_string(),
        email: email.to_string(),
        photo_url: user_info["picture"].as_str().map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_carries_state() {
        let provider = GoogleIdentityProvider::from_config(&Config::for_tests());
        let url = provider.authorization_url("abc-123").unwrap();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("state=abc-123"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=openid%20email%20profile"));
    }

    #[test]
    fn test_missing_client_id_disables_sign_in() {
        let mut config = Config::for_tests();
        config.google_client_id = None;
        let provider = GoogleIdentityProvider::from_config(&config);
        assert!(matches!(provider.authorization_url("s"), Err(AppError::IdentityError(_))));
    }

    #[test]
    fn test_userinfo_name_falls_back_to_email() {
        let info = serde_json::json!({ "id": "42", "email": "bia@example.com" });
        let identity = identity_from_userinfo(&info).unwrap();
        assert_eq!(identity.uid, "42");
        assert_eq!(identity.display_name, "bia@example.com");
        assert_eq!(identity.photo_url, None);

        let info = serde_json::json!({ "email": "bia@example.com" });
        assert!(identity_from_userinfo(&info).is_err());
    }
}
