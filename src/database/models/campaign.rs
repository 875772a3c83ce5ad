use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{CampaignChannel, CampaignStatus};

/// A marketing message broadcast to newsletter subscribers or push devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub channel: CampaignChannel,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
    pub status: CampaignStatus,
    pub recipients: i32,
    pub delivered: i32,
    pub failed: i32,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignInput {
    pub channel: CampaignChannel,
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

/// Delivery counters recorded once a campaign has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampaignOutcome {
    pub recipients: i32,
    pub delivered: i32,
    pub failed: i32,
}

impl CampaignOutcome {
    pub fn status(&self) -> CampaignStatus {
        if self.recipients == 0 || self.delivered > 0 {
            CampaignStatus::Sent
        } else {
            CampaignStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_status() {
        let empty = CampaignOutcome { recipients: 0, delivered: 0, failed: 0 };
        let partial = CampaignOutcome { recipients: 3, delivered: 1, failed: 2 };
        let dead = CampaignOutcome { recipients: 2, delivered: 0, failed: 2 };
        assert_eq!(empty.status(), CampaignStatus::Sent);
        assert_eq!(partial.status(), CampaignStatus::Sent);
        assert_eq!(dead.status(), CampaignStatus::Failed);
    }
}
