use std::sync::Arc;

use crate::config::Config;
use crate::database::DocumentStore;
use crate::services::auth_events::AuthEvents;
use crate::services::auth_service::SessionKeys;
use crate::services::identity_service::IdentityProvider;
use crate::services::upload_service::UploadTracker;

/// Everything a page controller needs, shared across workers via `web::Data`.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionKeys,
    pub auth_events: AuthEvents,
    pub uploads: UploadTracker,
}

impl AppContext {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let sessions = SessionKeys::from_config(&config);
        Self {
            config,
            store,
            identity,
            sessions,
            auth_events: AuthEvents::new(),
            uploads: UploadTracker::default(),
        }
    }
}
