use mongodb::bson::doc;

use crate::database::{to_fields, DocumentStore, Record, USERS};
use crate::models::{IdentityUser, Role, User};
use crate::utils::AppError;

#[derive(Debug, Clone)]
pub struct ProfileUpsert {
    pub user: User,
    pub created: bool,
}

/// Create-if-absent / touch-last-login-if-present, keyed by the identity uid.
pub async fn upsert_profile(
    store: &dyn DocumentStore,
    identity: &IdentityUser,
    now: i64,
) -> Result<ProfileUpsert, AppError> {
    if let Some(record) = store.get(USERS, &identity.uid).await? {
        return touch_last_login(store, &identity.uid, record, now).await;
    }

    let user = User::new_profile(identity, now);
    let mut fields = to_fields(&user)?;
    fields.insert("id", identity.uid.clone());

    match store.create(USERS, fields).await {
        Ok(_) => {
            log::info!("✅ Created profile for {} ({})", identity.uid, identity.email);
            Ok(ProfileUpsert { user, created: true })
        }
        // Another sign-in for the same uid may have created it since the read
        Err(e) => match store.get(USERS, &identity.uid).await? {
            Some(record) => {
                log::debug!("Profile {} appeared concurrently, touching it instead", identity.uid);
                touch_last_login(store, &identity.uid, record, now).await
            }
            None => Err(e),
        },
    }
}

async fn touch_last_login(
    store: &dyn DocumentStore,
    uid: &str,
    record: Record,
    now: i64,
) -> Result<ProfileUpsert, AppError> {
    store.merge(USERS, uid, doc! { "lastLogin": now }).await?;

    let mut user: User = record.into_model()?;
    user.last_login = Some(now);
    log::debug!("Updated last login for {}", uid);
    Ok(ProfileUpsert { user, created: false })
}

pub async fn get_profile(store: &dyn DocumentStore, uid: &str) -> Result<Option<User>, AppError> {
    match store.get(USERS, uid).await? {
        Some(record) => Ok(Some(record.into_model()?)),
        None => Ok(None),
    }
}

/// Stored role, `Student` when there is no profile.
pub async fn role_of(store: &dyn DocumentStore, uid: &str) -> Result<Role, AppError> {
    Ok(get_profile(store, uid).await?.map(|user| user.role).unwrap_or_default())
}
