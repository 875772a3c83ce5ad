use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use super::newsletter::unsubscribe_url;
use super::{is_http_url, non_blank};
use crate::database::models::{Campaign, CampaignInput, CampaignOutcome};
use crate::database::{Store, StoreError};
use crate::error::{ApiError, ValidationErrors};
use crate::notify::{templates, Notifier, NotifyError, PushMessage};
use crate::types::{CampaignChannel, CampaignStatus};

/// Deliveries in flight at once while broadcasting.
pub const SEND_CONCURRENCY: usize = 8;

pub const MAX_TITLE: usize = 150;
pub const MAX_PUSH_BODY: usize = 240;

pub async fn create_campaign(store: &dyn Store, input: CampaignInput) -> Result<Campaign, ApiError> {
    let title = input.title.trim().to_string();
    let body = input.body.trim().to_string();
    let url = non_blank(input.url.as_deref());

    let mut errors = ValidationErrors::new();
    errors.check(!title.is_empty(), "title", "Le titre est obligatoire");
    errors.check(title.chars().count() <= MAX_TITLE, "title", "Le titre est trop long");
    errors.check(!body.is_empty(), "body", "Le message est obligatoire");
    if input.channel == CampaignChannel::Push {
        errors.check(
            body.chars().count() <= MAX_PUSH_BODY,
            "body",
            "Une notification push est limitée à 240 caractères",
        );
    }
    if let Some(url) = &url {
        errors.check(is_http_url(url), "url", "Le lien doit être une URL http(s)");
    }
    errors.into_result()?;

    let campaign = Campaign {
        id: Uuid::new_v4(),
        channel: input.channel,
        title,
        body,
        url,
        status: CampaignStatus::Draft,
        recipients: 0,
        delivered: 0,
        failed: 0,
        created_at: Utc::now(),
        sent_at: None,
    };
    Ok(store.insert_campaign(&campaign).await?)
}

/// Broadcasts a draft campaign and records the delivery counters.
///
/// The draft is claimed before anything goes out, so concurrent sends of
/// the same campaign deliver once.
pub async fn send_campaign(
    store: &dyn Store,
    notifier: &Notifier,
    secret: &str,
    id: Uuid,
) -> Result<Campaign, ApiError> {
    let campaign = store.claim_campaign(id).await.map_err(|err| match err {
        StoreError::Conflict(_) => ApiError::conflict("Cette campagne a déjà été envoyée"),
        other => other.into(),
    })?;

    let results: Vec<Result<(), NotifyError>> = match campaign.channel {
        CampaignChannel::Email => {
            let settings = store.get_settings().await?;
            let subscribers = store.list_subscribers(true).await?;
            stream::iter(subscribers)
                .map(|subscriber| {
                    let campaign = &campaign;
                    let store_name = settings.store_name.as_str();
                    async move {
                        let link = unsubscribe_url(notifier.site_url(), secret, &subscriber.email);
                        let message = templates::campaign(campaign, store_name, &subscriber.email, &link)?;
                        notifier.send_email(&message).await
                    }
                })
                .buffer_unordered(SEND_CONCURRENCY)
                .collect()
                .await
        }
        CampaignChannel::Push => {
            let devices = store.list_push_subscriptions(false).await?;
            let message = PushMessage {
                title: campaign.title.clone(),
                body: campaign.body.clone(),
                url: campaign.url.clone(),
            };
            stream::iter(devices)
                .map(|device| {
                    let message = &message;
                    async move { notifier.send_push(&device, message).await }
                })
                .buffer_unordered(SEND_CONCURRENCY)
                .collect()
                .await
        }
    };

    let outcome = tally(&results);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        warn!(campaign = %campaign.id, error = %err, "Campaign delivery failed");
    }
    let recorded = store.record_campaign_outcome(campaign.id, outcome).await?;
    info!(
        campaign = %recorded.id,
        channel = recorded.channel.as_str(),
        recipients = outcome.recipients,
        delivered = outcome.delivered,
        failed = outcome.failed,
        "Campaign sent"
    );
    Ok(recorded)
}

fn tally(results: &[Result<(), NotifyError>]) -> CampaignOutcome {
    let delivered = results.iter().filter(|r| r.is_ok()).count() as i32;
    let recipients = results.len() as i32;
    CampaignOutcome {
        recipients,
        delivered,
        failed: recipients - delivered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{PushSubscription, SubscriberSource};
    use crate::database::MemoryStore;
    use crate::notify::{EmailMessage, EmailSender, LogPushSender, PushSender};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl EmailSender for Outbox {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            if message.to.starts_with("bounce") {
                return Err(NotifyError::Rejected(550));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    /// Holds every delivery long enough for a second send to race the first.
    #[derive(Default)]
    struct SlowOutbox {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmailSender for SlowOutbox {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.sent.lock().unwrap().push(message.to.clone());
            Ok(())
        }
    }

    struct FailingPush;

    #[async_trait]
    impl PushSender for FailingPush {
        async fn send(&self, _: &PushSubscription, _: &PushMessage) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("gateway down".to_string()))
        }
    }

    fn input(channel: CampaignChannel) -> CampaignInput {
        CampaignInput {
            channel,
            title: "Nouvelle collection".to_string(),
            body: "La collection Tabaski est en ligne.\n\nLivraison rapide à Conakry.".to_string(),
            url: Some("https://grandsonproject.com/boutique".to_string()),
        }
    }

    #[tokio::test]
    async fn email_campaign_counts_each_recipient() {
        let store = Arc::new(MemoryStore::new());
        for email in ["aissatou@example.gn", "bounce@example.gn", "sekou@example.gn"] {
            store.subscribe(email, SubscriberSource::Footer).await.unwrap();
        }
        let outbox = Arc::new(Outbox::default());
        let notifier = Notifier::new(outbox.clone(), Arc::new(LogPushSender), store.clone(), None, "https://shop.gn");

        let draft = create_campaign(store.as_ref(), input(CampaignChannel::Email)).await.unwrap();
        let sent = send_campaign(store.as_ref(), &notifier, "secret", draft.id).await.unwrap();

        assert_eq!(sent.status, CampaignStatus::Sent);
        assert_eq!((sent.recipients, sent.delivered, sent.failed), (3, 2, 1));
        assert!(sent.sent_at.is_some());
        let outbox = outbox.sent.lock().unwrap();
        assert!(outbox.iter().all(|m| m.text.contains("desinscription")));
    }

    #[tokio::test]
    async fn campaign_cannot_be_sent_twice() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(
            Arc::new(Outbox::default()),
            Arc::new(LogPushSender),
            store.clone(),
            None,
            "https://shop.gn",
        );
        let draft = create_campaign(store.as_ref(), input(CampaignChannel::Email)).await.unwrap();

        let first = send_campaign(store.as_ref(), &notifier, "secret", draft.id).await.unwrap();
        assert_eq!(first.recipients, 0);
        assert_eq!(first.status, CampaignStatus::Sent);

        let err = send_campaign(store.as_ref(), &notifier, "secret", draft.id).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn concurrent_sends_deliver_once() {
        let store = Arc::new(MemoryStore::new());
        for email in ["mariama@example.gn", "ousmane@example.gn", "fatoumata@example.gn"] {
            store.subscribe(email, SubscriberSource::Footer).await.unwrap();
        }
        let outbox = Arc::new(SlowOutbox::default());
        let notifier = Notifier::new(outbox.clone(), Arc::new(LogPushSender), store.clone(), None, "https://shop.gn");
        let draft = create_campaign(store.as_ref(), input(CampaignChannel::Email)).await.unwrap();

        let (first, second) = tokio::join!(
            send_campaign(store.as_ref(), &notifier, "secret", draft.id),
            send_campaign(store.as_ref(), &notifier, "secret", draft.id),
        );

        let (sent, rejected) = match (first, second) {
            (Ok(sent), Err(err)) | (Err(err), Ok(sent)) => (sent, err),
            other => panic!("expected one send to win, got {:?}", other),
        };
        assert_eq!(rejected.error_code(), "CONFLICT");
        assert_eq!(sent.status, CampaignStatus::Sent);
        assert_eq!(sent.recipients, 3);
        assert_eq!(outbox.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn claim_marks_the_campaign_as_sending() {
        let store = MemoryStore::new();
        let draft = create_campaign(&store, input(CampaignChannel::Email)).await.unwrap();

        let claimed = store.claim_campaign(draft.id).await.unwrap();
        assert_eq!(claimed.status, CampaignStatus::Sending);
        assert!(matches!(store.claim_campaign(draft.id).await, Err(StoreError::Conflict(_))));
        assert!(matches!(store.claim_campaign(Uuid::new_v4()).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn push_campaign_fails_when_nothing_delivered() {
        let store = Arc::new(MemoryStore::new());
        let device = PushSubscription {
            id: Uuid::new_v4(),
            endpoint: "https://push.example/fan".to_string(),
            p256dh: "k".to_string(),
            auth: "a".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        store.save_push_subscription(&device).await.unwrap();
        let notifier = Notifier::new(
            Arc::new(Outbox::default()),
            Arc::new(FailingPush),
            store.clone(),
            None,
            "https://shop.gn",
        );

        let mut short = input(CampaignChannel::Push);
        short.body = "Soldes ce week-end".to_string();
        let draft = create_campaign(store.as_ref(), short).await.unwrap();
        let sent = send_campaign(store.as_ref(), &notifier, "secret", draft.id).await.unwrap();
        assert_eq!(sent.status, CampaignStatus::Failed);
        assert_eq!((sent.recipients, sent.failed), (1, 1));
    }

    #[tokio::test]
    async fn validates_input() {
        let store = MemoryStore::new();
        let mut bad = input(CampaignChannel::Email);
        bad.title = String::new();
        bad.url = Some("javascript:alert(1)".to_string());
        let body = create_campaign(&store, bad).await.unwrap_err().to_json();
        assert!(body["field_errors"]["title"].is_string());
        assert!(body["field_errors"]["url"].is_string());
    }
}
