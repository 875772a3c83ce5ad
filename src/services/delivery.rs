use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::non_blank;
use crate::database::models::{DeliveryZone, DeliveryZoneInput, DeliveryZonePatch};
use crate::database::{Store, StoreError};
use crate::error::{ApiError, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryQuote {
    pub zone_id: Uuid,
    pub zone_name: String,
    pub fee: i64,
    pub free_delivery: bool,
    pub subtotal: i64,
    pub total: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("La livraison n'est pas disponible pour la zone {0}")]
    InactiveZone(String),

    #[error("Le sous-total ne peut pas être négatif")]
    NegativeSubtotal,

    #[error("Le sous-total est trop élevé")]
    SubtotalTooLarge,
}

/// Largest cart subtotal accepted for a quote, in GNF.
pub const MAX_SUBTOTAL: i64 = 1_000_000_000_000;

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::InactiveZone(_) => ApiError::field("delivery_zone", err.to_string()),
            QuoteError::NegativeSubtotal | QuoteError::SubtotalTooLarge => ApiError::field("subtotal", err.to_string()),
        }
    }
}

/// Flat zone fee, waived once the subtotal reaches the free-delivery threshold.
pub fn quote(zone: &DeliveryZone, subtotal: i64, free_threshold: Option<i64>) -> Result<DeliveryQuote, QuoteError> {
    if !zone.is_active {
        return Err(QuoteError::InactiveZone(zone.name.clone()));
    }
    if subtotal < 0 {
        return Err(QuoteError::NegativeSubtotal);
    }
    if subtotal > MAX_SUBTOTAL {
        return Err(QuoteError::SubtotalTooLarge);
    }

    let free_delivery = free_threshold.is_some_and(|threshold| subtotal >= threshold);
    let fee = if free_delivery { 0 } else { zone.fee };
    let total = subtotal.checked_add(fee).ok_or(QuoteError::SubtotalTooLarge)?;
    Ok(DeliveryQuote {
        zone_id: zone.id,
        zone_name: zone.name.clone(),
        fee,
        free_delivery,
        subtotal,
        total,
    })
}

/// Resolves a zone from its id or its name.
pub async fn find_zone(store: &dyn Store, key: &str) -> Result<Option<DeliveryZone>, StoreError> {
    if let Ok(id) = Uuid::parse_str(key.trim()) {
        return match store.get_zone(id).await {
            Ok(zone) => Ok(Some(zone)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        };
    }
    let zones = store.list_zones(false).await?;
    Ok(zones.into_iter().find(|zone| zone.matches_key(key)))
}

pub async fn quote_for(store: &dyn Store, key: &str, subtotal: i64) -> Result<DeliveryQuote, ApiError> {
    let zone = find_zone(store, key)
        .await?
        .ok_or_else(|| ApiError::field("delivery_zone", "Zone de livraison inconnue"))?;
    let settings = store.get_settings().await?;
    Ok(quote(&zone, subtotal, settings.free_delivery_threshold)?)
}

fn validate_zone(zone: &DeliveryZone) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(!zone.name.trim().is_empty(), "name", "Le nom de la zone est obligatoire");
    errors.check(zone.fee >= 0, "fee", "Les frais de livraison ne peuvent pas être négatifs");
    errors.into_result()
}

fn zone_conflict(err: StoreError) -> ApiError {
    match err {
        StoreError::Conflict(_) => ApiError::field("name", "Une zone porte déjà ce nom"),
        other => other.into(),
    }
}

pub async fn create_zone(store: &dyn Store, input: DeliveryZoneInput) -> Result<DeliveryZone, ApiError> {
    let zone = DeliveryZone {
        id: Uuid::new_v4(),
        name: input.name.trim().to_string(),
        fee: input.fee,
        description: non_blank(input.description.as_deref()),
        estimated_delay: non_blank(input.estimated_delay.as_deref()),
        is_active: input.is_active,
        position: input.position,
        created_at: Utc::now(),
    };
    validate_zone(&zone)?;
    store.insert_zone(&zone).await.map_err(zone_conflict)
}

pub async fn update_zone(store: &dyn Store, id: Uuid, patch: DeliveryZonePatch) -> Result<DeliveryZone, ApiError> {
    let mut zone = store.get_zone(id).await?;
    patch.apply(&mut zone);
    zone.name = zone.name.trim().to_string();
    validate_zone(&zone)?;
    store.update_zone(&zone).await.map_err(zone_conflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn zone(name: &str, fee: i64, is_active: bool) -> DeliveryZone {
        DeliveryZone {
            id: Uuid::new_v4(),
            name: name.to_string(),
            fee,
            description: None,
            estimated_delay: None,
            is_active,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn flat_fee_below_threshold() {
        let q = quote(&zone("Kaloum", 20_000, true), 150_000, Some(1_000_000)).unwrap();
        assert_eq!(q.fee, 20_000);
        assert!(!q.free_delivery);
        assert_eq!(q.total, 170_000);
    }

    #[test]
    fn free_from_threshold_inclusive() {
        let q = quote(&zone("Matoto", 35_000, true), 1_000_000, Some(1_000_000)).unwrap();
        assert_eq!(q.fee, 0);
        assert!(q.free_delivery);
        assert_eq!(q.total, 1_000_000);
    }

    #[test]
    fn no_threshold_never_free() {
        let q = quote(&zone("Ratoma", 30_000, true), 50_000_000, None).unwrap();
        assert_eq!(q.fee, 30_000);
    }

    #[test]
    fn inactive_zone_cannot_be_quoted() {
        assert_eq!(
            quote(&zone("Kindia", 80_000, false), 10_000, None),
            Err(QuoteError::InactiveZone("Kindia".to_string()))
        );
    }

    #[test]
    fn oversized_subtotal_is_rejected() {
        assert_eq!(
            quote(&zone("Kaloum", 20_000, true), i64::MAX, None),
            Err(QuoteError::SubtotalTooLarge)
        );
        assert_eq!(
            quote(&zone("Kaloum", 20_000, true), MAX_SUBTOTAL + 1, None),
            Err(QuoteError::SubtotalTooLarge)
        );
        let q = quote(&zone("Kaloum", 20_000, true), MAX_SUBTOTAL, None).unwrap();
        assert_eq!(q.total, MAX_SUBTOTAL + 20_000);
    }

    #[test]
    fn huge_zone_fee_does_not_overflow() {
        assert_eq!(
            quote(&zone("Lune", i64::MAX, true), 10_000, None),
            Err(QuoteError::SubtotalTooLarge)
        );
    }

    #[tokio::test]
    async fn zones_resolve_by_id_or_name() {
        let store = MemoryStore::demo();
        let by_name = find_zone(&store, "kaloum").await.unwrap().unwrap();
        let by_id = find_zone(&store, &by_name.id.to_string()).await.unwrap().unwrap();
        assert_eq!(by_name.id, by_id.id);
        assert!(find_zone(&store, "Labé").await.unwrap().is_none());
        assert!(find_zone(&store, &Uuid::new_v4().to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zone_names_stay_unique() {
        let store = MemoryStore::demo();
        let input: DeliveryZoneInput = serde_json::from_value(serde_json::json!({
            "name": "KALOUM",
            "fee": 10_000
        }))
        .unwrap();
        let err = create_zone(&store, input).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let negative: DeliveryZoneInput =
            serde_json::from_value(serde_json::json!({ "name": "Labé", "fee": -1 })).unwrap();
        assert!(create_zone(&store, negative).await.is_err());
    }
}
