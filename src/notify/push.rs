use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

use super::{NotifyError, PushMessage, PushSender};
use crate::config::PushConfig;
use crate::database::models::{PushKeys, PushSubscription};

/// Delivers web pushes through an HTTP gateway that holds the VAPID keys.
#[derive(Clone)]
pub struct HttpPushSender {
    client: reqwest::Client,
    gateway_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GatewayRequest<'a> {
    subscription: GatewaySubscription<'a>,
    notification: &'a PushMessage,
}

#[derive(Serialize)]
struct GatewaySubscription<'a> {
    endpoint: &'a str,
    keys: PushKeys,
}

impl HttpPushSender {
    pub fn new(config: &PushConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            gateway_url: config.gateway_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

/// Gateway statuses meaning the browser subscription is gone for good.
fn is_gone(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::GONE
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), NotifyError> {
        let body = GatewayRequest {
            subscription: GatewaySubscription {
                endpoint: &subscription.endpoint,
                keys: PushKeys {
                    p256dh: subscription.p256dh.clone(),
                    auth: subscription.auth.clone(),
                },
            },
            notification: message,
        };

        let mut request = self.client.post(&self.gateway_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if is_gone(status) {
            Err(NotifyError::Gone)
        } else {
            Err(NotifyError::Rejected(status.as_u16()))
        }
    }
}

/// Stand-in used when no push gateway is configured.
#[derive(Debug, Default, Clone)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), NotifyError> {
        tracing::info!(
            endpoint = %subscription.endpoint,
            title = %message.title,
            "Push not sent (gateway disabled)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gone_statuses() {
        assert!(is_gone(StatusCode::GONE));
        assert!(is_gone(StatusCode::NOT_FOUND));
        assert!(!is_gone(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn gateway_payload_shape() {
        let message = PushMessage {
            title: "Nouvelle commande".to_string(),
            body: "GP-20260101-AB12".to_string(),
            url: None,
        };
        let body = GatewayRequest {
            subscription: GatewaySubscription {
                endpoint: "https://push.example/abc",
                keys: PushKeys {
                    p256dh: "key".to_string(),
                    auth: "auth".to_string(),
                },
            },
            notification: &message,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["subscription"]["keys"]["auth"], "auth");
        assert_eq!(json["notification"]["title"], "Nouvelle commande");
        assert!(json["notification"].get("url").is_none());
    }
}
