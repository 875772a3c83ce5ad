use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberSource {
    Checkout,
    Footer,
    Admin,
}

impl SubscriberSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberSource::Checkout => "checkout",
            SubscriberSource::Footer => "footer",
            SubscriberSource::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "checkout" => Some(SubscriberSource::Checkout),
            "footer" => Some(SubscriberSource::Footer),
            "admin" => Some(SubscriberSource::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub source: SubscriberSource,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
    pub token: String,
}
