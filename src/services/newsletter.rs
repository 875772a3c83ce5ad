use sha2::{Digest, Sha256};
use tracing::info;

use crate::database::models::{SubscriberSource, UnsubscribeRequest};
use crate::database::Store;
use crate::error::ApiError;
use crate::types::Email;

/// Stable per-address token embedded in unsubscribe links.
pub fn unsubscribe_token(secret: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b":newsletter:");
    hasher.update(email.to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn unsubscribe_url(site_url: &str, secret: &str, email: &str) -> String {
    let token = unsubscribe_token(secret, email);
    let base = format!("{}/newsletter/desinscription", site_url);
    match url::Url::parse_with_params(&base, &[("email", email), ("token", token.as_str())]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?token={}", base, token),
    }
}

/// Returns `true` when the address is new or was reactivated.
pub async fn subscribe(store: &dyn Store, email: &str, source: SubscriberSource) -> Result<bool, ApiError> {
    let email = Email::parse(email)?;
    let created = store.subscribe(email.as_str(), source).await?;
    if created {
        info!(source = source.as_str(), "Newsletter subscription");
    }
    Ok(created)
}

pub async fn unsubscribe(store: &dyn Store, secret: &str, request: &UnsubscribeRequest) -> Result<(), ApiError> {
    let email = Email::parse(&request.email)?;
    if request.token.trim() != unsubscribe_token(secret, email.as_str()) {
        return Err(ApiError::forbidden("Lien de désinscription invalide"));
    }
    if store.unsubscribe(email.as_str()).await? {
        info!("Newsletter unsubscription");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_ignores_case_and_depends_on_secret() {
        assert_eq!(unsubscribe_token(SECRET, "Awa@Example.gn"), unsubscribe_token(SECRET, "awa@example.gn"));
        assert_ne!(unsubscribe_token(SECRET, "awa@example.gn"), unsubscribe_token("other", "awa@example.gn"));
        assert_eq!(unsubscribe_token(SECRET, "awa@example.gn").len(), 64);
    }

    #[test]
    fn url_escapes_email() {
        let url = unsubscribe_url("https://shop.gn", SECRET, "awa+promo@example.gn");
        assert!(url.starts_with("https://shop.gn/newsletter/desinscription?email=awa%2Bpromo%40example.gn&token="));
    }

    #[tokio::test]
    async fn unsubscribe_requires_valid_token() {
        let store = MemoryStore::new();
        assert!(subscribe(&store, "awa@example.gn", SubscriberSource::Footer).await.unwrap());
        assert!(!subscribe(&store, "AWA@example.gn", SubscriberSource::Footer).await.unwrap());

        let forged = UnsubscribeRequest {
            email: "awa@example.gn".to_string(),
            token: "0".repeat(64),
        };
        assert_eq!(unsubscribe(&store, SECRET, &forged).await.unwrap_err().error_code(), "FORBIDDEN");

        let genuine = UnsubscribeRequest {
            email: "awa@example.gn".to_string(),
            token: unsubscribe_token(SECRET, "awa@example.gn"),
        };
        unsubscribe(&store, SECRET, &genuine).await.unwrap();
        assert!(store.list_subscribers(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_address_is_a_field_error() {
        let store = MemoryStore::new();
        let err = subscribe(&store, "not-an-email", SubscriberSource::Footer).await.unwrap_err();
        assert!(err.to_json()["field_errors"]["email"].is_string());
    }
}
