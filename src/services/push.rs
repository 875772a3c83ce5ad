use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{PushSubscription, PushSubscriptionInput};
use crate::database::Store;
use crate::error::{ApiError, ValidationErrors};

fn validate(input: &PushSubscriptionInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let https = url::Url::parse(&input.endpoint)
        .map(|u| u.scheme() == "https" && u.host_str().is_some())
        .unwrap_or(false);
    errors.check(https, "endpoint", "Push endpoint must be an https URL");
    errors.check(!input.keys.p256dh.trim().is_empty(), "keys.p256dh", "Missing p256dh key");
    errors.check(!input.keys.auth.trim().is_empty(), "keys.auth", "Missing auth secret");
    errors.into_result()
}

/// Registers (or refreshes) a browser subscription. Admin devices get order alerts.
pub async fn register(store: &dyn Store, input: PushSubscriptionInput, is_admin: bool) -> Result<PushSubscription, ApiError> {
    validate(&input)?;
    let subscription = PushSubscription {
        id: Uuid::new_v4(),
        endpoint: input.endpoint,
        p256dh: input.keys.p256dh,
        auth: input.keys.auth,
        is_admin,
        created_at: Utc::now(),
    };
    let saved = store.save_push_subscription(&subscription).await?;
    tracing::info!(admin = saved.is_admin, "Push subscription registered");
    Ok(saved)
}

pub async fn unregister(store: &dyn Store, endpoint: &str) -> Result<(), ApiError> {
    if !store.delete_push_subscription(endpoint).await? {
        return Err(ApiError::not_found("Abonnement push introuvable"));
    }
    Ok(())
}
