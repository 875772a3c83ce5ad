use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::demo;
use crate::database::models::{
    AdminUser, Campaign, CampaignOutcome, DashboardStats, DeliveryZone, GalleryImage, LowStockProduct,
    NewsletterSubscriber, Order, OrderFilter, Product, ProductFilter, PushSubscription, SiteSettings, SubscriberSource,
};
use crate::database::store::{aggregate_quantities, DataSource, Store, StoreError, StoreResult};
use crate::types::{CampaignStatus, OrderStatus};

#[derive(Debug, Default)]
struct Collections {
    products: Vec<Product>,
    zones: Vec<DeliveryZone>,
    orders: Vec<Order>,
    settings: SiteSettings,
    gallery: Vec<GalleryImage>,
    subscribers: Vec<NewsletterSubscriber>,
    push: Vec<PushSubscription>,
    campaigns: Vec<Campaign>,
    admins: Vec<AdminUser>,
}

/// In-memory store backing demo mode.
///
/// Mirrors the Postgres store semantics (stock reservation, uniqueness,
/// status transitions) so the storefront behaves the same in both modes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the synthetic demo catalogue.
    pub fn demo() -> Self {
        let seed = demo::seed();
        Self {
            inner: RwLock::new(Collections {
                products: seed.products,
                zones: seed.zones,
                settings: seed.settings,
                gallery: seed.gallery,
                ..Default::default()
            }),
        }
    }
}

fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| b.is_featured.cmp(&a.is_featured).then(b.created_at.cmp(&a.created_at)));
}

fn sort_zones(zones: &mut [DeliveryZone]) {
    zones.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
}

fn sort_gallery(images: &mut [GalleryImage]) {
    images.sort_by(|a, b| a.position.cmp(&b.position).then(a.created_at.cmp(&b.created_at)));
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    items
        .iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    fn source(&self) -> DataSource {
        DataSource::Demo
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let data = self.inner.read().await;
        let mut products: Vec<Product> = data.products.iter().filter(|p| filter.matches(p)).cloned().collect();
        sort_products(&mut products);
        Ok(page(&products, filter.effective_offset(), filter.effective_limit()))
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Product> {
        let data = self.inner.read().await;
        data.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product"))
    }

    async fn get_product_by_slug(&self, slug: &str) -> StoreResult<Product> {
        let data = self.inner.read().await;
        data.products
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product"))
    }

    async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        let data = self.inner.read().await;
        Ok(data.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        let data = self.inner.read().await;
        let mut categories: Vec<String> = data
            .products
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<Product> {
        let mut data = self.inner.write().await;
        if data.products.iter().any(|p| p.slug == product.slug) {
            return Err(StoreError::Conflict(format!("slug '{}' already exists", product.slug)));
        }
        data.products.push(product.clone());
        Ok(product.clone())
    }

    async fn update_product(&self, product: &Product) -> StoreResult<Product> {
        let mut data = self.inner.write().await;
        if data.products.iter().any(|p| p.slug == product.slug && p.id != product.id) {
            return Err(StoreError::Conflict(format!("slug '{}' already exists", product.slug)));
        }
        let existing = data
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| StoreError::not_found("Product"))?;
        *existing = product.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        let referenced = data
            .orders
            .iter()
            .any(|o| o.items.iter().any(|item| item.product_id == id));
        if referenced {
            return Err(StoreError::Conflict("product is referenced by existing orders".to_string()));
        }
        let before = data.products.len();
        data.products.retain(|p| p.id != id);
        if data.products.len() == before {
            return Err(StoreError::not_found("Product"));
        }
        Ok(())
    }

    async fn list_zones(&self, active_only: bool) -> StoreResult<Vec<DeliveryZone>> {
        let data = self.inner.read().await;
        let mut zones: Vec<DeliveryZone> = data
            .zones
            .iter()
            .filter(|z| !active_only || z.is_active)
            .cloned()
            .collect();
        sort_zones(&mut zones);
        Ok(zones)
    }

    async fn get_zone(&self, id: Uuid) -> StoreResult<DeliveryZone> {
        let data = self.inner.read().await;
        data.zones
            .iter()
            .find(|z| z.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Delivery zone"))
    }

    async fn insert_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone> {
        let mut data = self.inner.write().await;
        if data.zones.iter().any(|z| z.name.to_lowercase() == zone.name.to_lowercase()) {
            return Err(StoreError::Conflict(format!("zone '{}' already exists", zone.name)));
        }
        data.zones.push(zone.clone());
        Ok(zone.clone())
    }

    async fn update_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone> {
        let mut data = self.inner.write().await;
        if data
            .zones
            .iter()
            .any(|z| z.id != zone.id && z.name.to_lowercase() == zone.name.to_lowercase())
        {
            return Err(StoreError::Conflict(format!("zone '{}' already exists", zone.name)));
        }
        let existing = data
            .zones
            .iter_mut()
            .find(|z| z.id == zone.id)
            .ok_or_else(|| StoreError::not_found("Delivery zone"))?;
        *existing = zone.clone();
        Ok(zone.clone())
    }

    async fn delete_zone(&self, id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        let before = data.zones.len();
        data.zones.retain(|z| z.id != id);
        if data.zones.len() == before {
            return Err(StoreError::not_found("Delivery zone"));
        }
        // Orders keep their zone name; the reference is cleared like ON DELETE SET NULL.
        for order in data.orders.iter_mut().filter(|o| o.delivery_zone_id == Some(id)) {
            order.delivery_zone_id = None;
        }
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<Order> {
        let mut data = self.inner.write().await;
        if data.orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(StoreError::Conflict(format!("order number {} already exists", order.order_number)));
        }

        let wanted = aggregate_quantities(order);
        // Check every line before touching stock so a failure leaves nothing reserved.
        for (product_id, name, quantity) in &wanted {
            let product = data
                .products
                .iter()
                .find(|p| p.id == *product_id)
                .ok_or_else(|| StoreError::NotFound(format!("Product {}", name)))?;
            if !product.is_active || product.stock < *quantity {
                return Err(StoreError::InsufficientStock {
                    product_id: *product_id,
                    product: product.name.clone(),
                    available: if product.is_active { product.stock } else { 0 },
                    requested: *quantity,
                });
            }
        }

        let now = Utc::now();
        for (product_id, _, quantity) in &wanted {
            if let Some(product) = data.products.iter_mut().find(|p| p.id == *product_id) {
                product.stock -= quantity;
                product.updated_at = now;
            }
        }
        data.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Order> {
        let data = self.inner.read().await;
        data.orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order"))
    }

    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Order> {
        let data = self.inner.read().await;
        data.orders
            .iter()
            .find(|o| o.order_number.eq_ignore_ascii_case(order_number))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Order"))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let data = self.inner.read().await;
        let mut orders: Vec<Order> = data.orders.iter().filter(|o| filter.matches(o)).cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(&orders, filter.effective_offset(), filter.effective_limit()))
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Order> {
        let mut data = self.inner.write().await;
        let now = Utc::now();
        let order = data
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("Order"))?;
        if !order.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition { from: order.status, to: status });
        }
        order.status = status;
        order.updated_at = now;
        let updated = order.clone();

        if status == OrderStatus::Cancelled {
            for (product_id, _, quantity) in aggregate_quantities(&updated) {
                if let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) {
                    product.stock += quantity;
                    product.updated_at = now;
                }
            }
        }
        Ok(updated)
    }

    async fn get_settings(&self) -> StoreResult<SiteSettings> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &SiteSettings) -> StoreResult<SiteSettings> {
        self.inner.write().await.settings = settings.clone();
        Ok(settings.clone())
    }

    async fn list_gallery(&self, gallery: &str, active_only: bool) -> StoreResult<Vec<GalleryImage>> {
        let data = self.inner.read().await;
        let mut images: Vec<GalleryImage> = data
            .gallery
            .iter()
            .filter(|img| img.gallery == gallery && (!active_only || img.is_active))
            .cloned()
            .collect();
        sort_gallery(&mut images);
        Ok(images)
    }

    async fn get_gallery_image(&self, id: Uuid) -> StoreResult<GalleryImage> {
        let data = self.inner.read().await;
        data.gallery
            .iter()
            .find(|img| img.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Gallery image"))
    }

    async fn insert_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage> {
        self.inner.write().await.gallery.push(image.clone());
        Ok(image.clone())
    }

    async fn update_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage> {
        let mut data = self.inner.write().await;
        let existing = data
            .gallery
            .iter_mut()
            .find(|img| img.id == image.id)
            .ok_or_else(|| StoreError::not_found("Gallery image"))?;
        *existing = image.clone();
        Ok(image.clone())
    }

    async fn delete_gallery_image(&self, id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        let before = data.gallery.len();
        data.gallery.retain(|img| img.id != id);
        if data.gallery.len() == before {
            return Err(StoreError::not_found("Gallery image"));
        }
        Ok(())
    }

    async fn reorder_gallery(&self, gallery: &str, ids: &[Uuid]) -> StoreResult<Vec<GalleryImage>> {
        {
            let mut data = self.inner.write().await;
            let all_known = ids
                .iter()
                .all(|id| data.gallery.iter().any(|img| img.id == *id && img.gallery == gallery));
            if !all_known {
                return Err(StoreError::not_found("Gallery image"));
            }
            for (position, id) in ids.iter().enumerate() {
                if let Some(img) = data.gallery.iter_mut().find(|img| img.id == *id) {
                    img.position = i32::try_from(position).unwrap_or(i32::MAX);
                }
            }
        }
        self.list_gallery(gallery, false).await
    }

    async fn subscribe(&self, email: &str, source: SubscriberSource) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        if let Some(existing) = data.subscribers.iter_mut().find(|s| s.email == email) {
            if existing.is_active {
                return Ok(false);
            }
            existing.is_active = true;
            return Ok(true);
        }
        data.subscribers.push(NewsletterSubscriber {
            id: Uuid::new_v4(),
            email: email.to_string(),
            source,
            is_active: true,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn unsubscribe(&self, email: &str) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        match data.subscribers.iter_mut().find(|s| s.email == email && s.is_active) {
            Some(subscriber) => {
                subscriber.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_subscribers(&self, active_only: bool) -> StoreResult<Vec<NewsletterSubscriber>> {
        let data = self.inner.read().await;
        let mut subscribers: Vec<NewsletterSubscriber> = data
            .subscribers
            .iter()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect();
        subscribers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subscribers)
    }

    async fn save_push_subscription(&self, subscription: &PushSubscription) -> StoreResult<PushSubscription> {
        let mut data = self.inner.write().await;
        if let Some(existing) = data.push.iter_mut().find(|s| s.endpoint == subscription.endpoint) {
            existing.p256dh = subscription.p256dh.clone();
            existing.auth = subscription.auth.clone();
            existing.is_admin = existing.is_admin || subscription.is_admin;
            return Ok(existing.clone());
        }
        data.push.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        let before = data.push.len();
        data.push.retain(|s| s.endpoint != endpoint);
        Ok(data.push.len() != before)
    }

    async fn list_push_subscriptions(&self, admin: bool) -> StoreResult<Vec<PushSubscription>> {
        let data = self.inner.read().await;
        Ok(data.push.iter().filter(|s| s.is_admin == admin).cloned().collect())
    }

    async fn insert_campaign(&self, campaign: &Campaign) -> StoreResult<Campaign> {
        self.inner.write().await.campaigns.push(campaign.clone());
        Ok(campaign.clone())
    }

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Campaign> {
        let data = self.inner.read().await;
        data.campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Campaign"))
    }

    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        let data = self.inner.read().await;
        let mut campaigns = data.campaigns.clone();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    async fn claim_campaign(&self, id: Uuid) -> StoreResult<Campaign> {
        let mut data = self.inner.write().await;
        let campaign = data
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("Campaign"))?;
        if campaign.status != CampaignStatus::Draft {
            return Err(StoreError::Conflict("campaign has already been sent".to_string()));
        }
        campaign.status = CampaignStatus::Sending;
        Ok(campaign.clone())
    }

    async fn record_campaign_outcome(&self, id: Uuid, outcome: CampaignOutcome) -> StoreResult<Campaign> {
        let mut data = self.inner.write().await;
        let campaign = data
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::not_found("Campaign"))?;
        if campaign.status != CampaignStatus::Sending {
            return Err(StoreError::Conflict("campaign is not being sent".to_string()));
        }
        campaign.status = outcome.status();
        campaign.recipients = outcome.recipients;
        campaign.delivered = outcome.delivered;
        campaign.failed = outcome.failed;
        campaign.sent_at = Some(Utc::now());
        Ok(campaign.clone())
    }

    async fn get_admin(&self, id: Uuid) -> StoreResult<AdminUser> {
        let data = self.inner.read().await;
        data.admins
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Admin"))
    }

    async fn get_admin_by_email(&self, email: &str) -> StoreResult<AdminUser> {
        let data = self.inner.read().await;
        data.admins
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Admin"))
    }

    async fn list_admins(&self) -> StoreResult<Vec<AdminUser>> {
        let data = self.inner.read().await;
        let mut admins = data.admins.clone();
        admins.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(admins)
    }

    async fn insert_admin(&self, admin: &AdminUser) -> StoreResult<AdminUser> {
        let mut data = self.inner.write().await;
        if data.admins.iter().any(|a| a.email.eq_ignore_ascii_case(&admin.email)) {
            return Err(StoreError::Conflict(format!("admin '{}' already exists", admin.email)));
        }
        data.admins.push(admin.clone());
        Ok(admin.clone())
    }

    async fn delete_admin(&self, id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        let before = data.admins.len();
        data.admins.retain(|a| a.id != id);
        if data.admins.len() == before {
            return Err(StoreError::not_found("Admin"));
        }
        Ok(())
    }

    async fn touch_admin_login(&self, id: Uuid) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        let admin = data
            .admins
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::not_found("Admin"))?;
        admin.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn dashboard_stats(&self, low_stock_threshold: i32) -> StoreResult<DashboardStats> {
        let data = self.inner.read().await;

        let mut orders_by_status: BTreeMap<String, i64> = BTreeMap::new();
        let mut revenue = 0;
        for order in &data.orders {
            *orders_by_status.entry(order.status.as_str().to_string()).or_default() += 1;
            if order.status.counts_as_revenue() {
                revenue += order.total;
            }
        }

        let mut low_stock: Vec<LowStockProduct> = data
            .products
            .iter()
            .filter(|p| p.is_active && p.stock <= low_stock_threshold)
            .map(|p| LowStockProduct { id: p.id, name: p.name.clone(), stock: p.stock })
            .collect();
        low_stock.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));
        low_stock.truncate(10);

        let mut recent_orders = data.orders.clone();
        recent_orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_orders.truncate(5);

        Ok(DashboardStats {
            orders_total: data.orders.len() as i64,
            orders_by_status,
            revenue,
            products_total: data.products.len() as i64,
            products_active: data.products.iter().filter(|p| p.is_active).count() as i64,
            low_stock,
            subscribers: data.subscribers.iter().filter(|s| s.is_active).count() as i64,
            recent_orders,
        })
    }
}
