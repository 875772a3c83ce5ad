use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::double_option;

/// A named delivery area with a flat fee in Guinean francs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeliveryZone {
    pub id: Uuid,
    pub name: String,
    pub fee: i64,
    pub description: Option<String>,
    pub estimated_delay: Option<String>,
    pub is_active: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl DeliveryZone {
    /// Matches either the zone id or its name, ignoring case and surrounding spaces.
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.trim();
        match Uuid::parse_str(key) {
            Ok(id) => self.id == id,
            Err(_) => self.name.trim().to_lowercase() == key.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryZoneInput {
    pub name: String,
    pub fee: i64,
    pub description: Option<String>,
    pub estimated_delay: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub position: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryZonePatch {
    pub name: Option<String>,
    pub fee: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_delay: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub position: Option<i32>,
}

impl DeliveryZonePatch {
    pub fn apply(self, zone: &mut DeliveryZone) {
        if let Some(name) = self.name {
            zone.name = name;
        }
        if let Some(fee) = self.fee {
            zone.fee = fee;
        }
        if let Some(description) = self.description {
            zone.description = description;
        }
        if let Some(estimated_delay) = self.estimated_delay {
            zone.estimated_delay = estimated_delay;
        }
        if let Some(is_active) = self.is_active {
            zone.is_active = is_active;
        }
        if let Some(position) = self.position {
            zone.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_id_or_case_insensitive_name() {
        let zone = DeliveryZone {
            id: Uuid::new_v4(),
            name: "Ratoma".to_string(),
            fee: 25_000,
            description: None,
            estimated_delay: None,
            is_active: true,
            position: 0,
            created_at: Utc::now(),
        };
        assert!(zone.matches_key(" ratoma "));
        assert!(zone.matches_key(&zone.id.to_string()));
        assert!(!zone.matches_key("Kaloum"));
        assert!(!zone.matches_key(&Uuid::new_v4().to_string()));
    }
}
