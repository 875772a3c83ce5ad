use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    AdminUser, Campaign, CampaignOutcome, DashboardStats, DeliveryZone, GalleryImage, NewsletterSubscriber, Order,
    OrderFilter, Product, ProductFilter, PushSubscription, SiteSettings, SubscriberSource,
};
use crate::types::OrderStatus;

/// Errors surfaced by every [`Store`] implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock for {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: Uuid,
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The backing database cannot be reached; callers may fall back to demo data.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record".to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // unique_violation, foreign_key_violation
                Some("23505") | Some("23503") => StoreError::Conflict(db.message().to_string()),
                _ => StoreError::Database(db.to_string()),
            },
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Where the data of a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Database,
    Demo,
}

/// Persistence operations needed by the storefront and the admin dashboard.
///
/// Implemented by the Postgres store, the in-memory demo store and the
/// fallback store that chains them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Source that served (or will serve) the most recent call.
    fn source(&self) -> DataSource;

    async fn health_check(&self) -> StoreResult<()>;

    // Catalog
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
    async fn get_product(&self, id: Uuid) -> StoreResult<Product>;
    async fn get_product_by_slug(&self, slug: &str) -> StoreResult<Product>;
    async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;
    async fn list_categories(&self) -> StoreResult<Vec<String>>;
    async fn insert_product(&self, product: &Product) -> StoreResult<Product>;
    async fn update_product(&self, product: &Product) -> StoreResult<Product>;
    async fn delete_product(&self, id: Uuid) -> StoreResult<()>;

    // Delivery zones
    async fn list_zones(&self, active_only: bool) -> StoreResult<Vec<DeliveryZone>>;
    async fn get_zone(&self, id: Uuid) -> StoreResult<DeliveryZone>;
    async fn insert_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone>;
    async fn update_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone>;
    async fn delete_zone(&self, id: Uuid) -> StoreResult<()>;

    // Orders
    /// Reserves stock for every line and stores the order atomically.
    async fn insert_order(&self, order: &Order) -> StoreResult<Order>;
    async fn get_order(&self, id: Uuid) -> StoreResult<Order>;
    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Order>;
    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;
    /// Applies a validated status transition; cancelling puts the stock back.
    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Order>;

    // Settings
    async fn get_settings(&self) -> StoreResult<SiteSettings>;
    async fn save_settings(&self, settings: &SiteSettings) -> StoreResult<SiteSettings>;

    // Galleries
    async fn list_gallery(&self, gallery: &str, active_only: bool) -> StoreResult<Vec<GalleryImage>>;
    async fn get_gallery_image(&self, id: Uuid) -> StoreResult<GalleryImage>;
    async fn insert_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage>;
    async fn update_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage>;
    async fn delete_gallery_image(&self, id: Uuid) -> StoreResult<()>;
    async fn reorder_gallery(&self, gallery: &str, ids: &[Uuid]) -> StoreResult<Vec<GalleryImage>>;

    // Newsletter
    /// Returns `true` when the address was added or re-activated.
    async fn subscribe(&self, email: &str, source: SubscriberSource) -> StoreResult<bool>;
    async fn unsubscribe(&self, email: &str) -> StoreResult<bool>;
    async fn list_subscribers(&self, active_only: bool) -> StoreResult<Vec<NewsletterSubscriber>>;

    // Push subscriptions
    async fn save_push_subscription(&self, subscription: &PushSubscription) -> StoreResult<PushSubscription>;
    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<bool>;
    async fn list_push_subscriptions(&self, admin: bool) -> StoreResult<Vec<PushSubscription>>;

    // Campaigns
    async fn insert_campaign(&self, campaign: &Campaign) -> StoreResult<Campaign>;
    async fn get_campaign(&self, id: Uuid) -> StoreResult<Campaign>;
    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>>;
    /// Moves a draft to `sending`; fails with `Conflict` when another send already claimed it.
    async fn claim_campaign(&self, id: Uuid) -> StoreResult<Campaign>;
    /// Records the dispatch result of a claimed campaign.
    async fn record_campaign_outcome(&self, id: Uuid, outcome: CampaignOutcome) -> StoreResult<Campaign>;

    // Admin users
    async fn get_admin(&self, id: Uuid) -> StoreResult<AdminUser>;
    async fn get_admin_by_email(&self, email: &str) -> StoreResult<AdminUser>;
    async fn list_admins(&self) -> StoreResult<Vec<AdminUser>>;
    async fn insert_admin(&self, admin: &AdminUser) -> StoreResult<AdminUser>;
    async fn delete_admin(&self, id: Uuid) -> StoreResult<()>;
    async fn touch_admin_login(&self, id: Uuid) -> StoreResult<()>;

    async fn dashboard_stats(&self, low_stock_threshold: i32) -> StoreResult<DashboardStats>;
}

/// Sums requested quantities per product, keeping first-seen order.
pub fn aggregate_quantities(order: &Order) -> Vec<(Uuid, String, i32)> {
    let mut totals: Vec<(Uuid, String, i32)> = Vec::new();
    for item in &order.items {
        match totals.iter_mut().find(|(id, _, _)| *id == item.product_id) {
            Some(entry) => entry.2 += item.quantity,
            None => totals.push((item.product_id, item.product_name.clone(), item.quantity)),
        }
    }
    totals
}
