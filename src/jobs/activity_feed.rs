// ==================== ACTIVITY FEED LISTENER ====================
// Background task that turns auth-state changes into admin feed entries

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::database::DocumentStore;
use crate::services::activity_service;
use crate::services::auth_events::{AuthEvents, AuthStateChange};

/// Starts the listener. It records one "user" entry per first sign-in and
/// stops once every publisher is gone.
pub fn start_activity_feed(store: Arc<dyn DocumentStore>, events: &AuthEvents) -> JoinHandle<()> {
    let mut subscription = events.subscribe();
    log::info!("📰 Starting activity feed listener");

    tokio::spawn(async move {
        while let Some(change) = subscription.next().await {
            match change {
                AuthStateChange::SignedIn { user, first_sign_in: true } => {
                    let message = format!("New user registered: {}", user.display_name);
                    activity_service::record_quietly(store.as_ref(), "user", message, Utc::now().timestamp()).await;
                }
                AuthStateChange::SignedIn { user, .. } => {
                    log::debug!("👤 {} signed in", user.uid);
                }
                AuthStateChange::SignedOut { uid } => {
                    log::debug!("👋 {} signed out", uid);
                }
            }
        }
        log::info!("🛑 Activity feed listener stopped");
    })
}
