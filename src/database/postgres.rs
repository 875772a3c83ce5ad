use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::database::models::{
    AdminUser, Campaign, CampaignOutcome, DashboardStats, DeliveryZone, GalleryImage, LowStockProduct,
    NewsletterSubscriber, Order, OrderFilter, OrderItem, Product, ProductFilter, PushSubscription, SiteSettings,
    SubscriberSource,
};
use crate::database::store::{aggregate_quantities, DataSource, Store, StoreError, StoreResult};
use crate::types::{AdminRole, CampaignChannel, CampaignStatus, OrderStatus, PaymentMethod};

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, size, color, unit_price, quantity, line_total";

/// Postgres-backed store (the Supabase database).
///
/// Enum-like columns are stored as TEXT; the private row types below convert
/// them into domain enums and reject unknown values.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Vec<OrderItem>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let items: Vec<OrderItem> = sqlx::query_as(&format!(
            "SELECT {} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
            ORDER_ITEM_COLUMNS
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(grouped)
    }

    async fn hydrate_orders(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    async fn fetch_order(&self, column: &str, value: &str) -> StoreResult<Order> {
        let row: OrderRow = sqlx::query_as(&format!("SELECT * FROM orders WHERE {} = $1", column))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Order"))?;
        let mut orders = self.hydrate_orders(vec![row]).await?;
        orders.pop().ok_or_else(|| StoreError::not_found("Order"))
    }
}

fn invalid_column(column: &str, value: &str) -> StoreError {
    StoreError::Database(format!("unexpected {} value '{}'", column, value))
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    delivery_zone_id: Option<Uuid>,
    delivery_zone_name: String,
    delivery_address: String,
    notes: Option<String>,
    payment_method: String,
    subtotal: i64,
    delivery_fee: i64,
    total: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> StoreResult<Order> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| invalid_column("status", &self.status))?;
        let payment_method = PaymentMethod::parse(&self.payment_method)
            .ok_or_else(|| invalid_column("payment_method", &self.payment_method))?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            delivery_zone_id: self.delivery_zone_id,
            delivery_zone_name: self.delivery_zone_name,
            delivery_address: self.delivery_address,
            notes: self.notes,
            payment_method,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            status,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AdminRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<AdminRow> for AdminUser {
    type Error = StoreError;

    fn try_from(row: AdminRow) -> StoreResult<Self> {
        let role = AdminRole::parse(&row.role).ok_or_else(|| invalid_column("role", &row.role))?;
        Ok(AdminUser {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CampaignRow {
    id: Uuid,
    channel: String,
    title: String,
    body: String,
    url: Option<String>,
    status: String,
    recipients: i32,
    delivered: i32,
    failed: i32,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = StoreError;

    fn try_from(row: CampaignRow) -> StoreResult<Self> {
        let channel = CampaignChannel::parse(&row.channel).ok_or_else(|| invalid_column("channel", &row.channel))?;
        let status = CampaignStatus::parse(&row.status).ok_or_else(|| invalid_column("status", &row.status))?;
        Ok(Campaign {
            id: row.id,
            channel,
            title: row.title,
            body: row.body,
            url: row.url,
            status,
            recipients: row.recipients,
            delivered: row.delivered,
            failed: row.failed,
            created_at: row.created_at,
            sent_at: row.sent_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    source: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriberRow> for NewsletterSubscriber {
    type Error = StoreError;

    fn try_from(row: SubscriberRow) -> StoreResult<Self> {
        let source = SubscriberSource::parse(&row.source).ok_or_else(|| invalid_column("source", &row.source))?;
        Ok(NewsletterSubscriber {
            id: row.id,
            email: row.email,
            source,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    fn source(&self) -> DataSource {
        DataSource::Database
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM products WHERE TRUE");
        if filter.active_only {
            qb.push(" AND is_active");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND lower(category) = lower(").push_bind(category.clone()).push(")");
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND is_featured = ").push_bind(featured);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_"));
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY is_featured DESC, created_at DESC LIMIT ")
            .push_bind(filter.effective_limit())
            .push(" OFFSET ")
            .push_bind(filter.effective_offset());

        Ok(qb.build_query_as::<Product>().fetch_all(&self.pool).await?)
    }

    async fn get_product(&self, id: Uuid) -> StoreResult<Product> {
        sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Product"))
    }

    async fn get_product_by_slug(&self, slug: &str) -> StoreResult<Product> {
        sqlx::query_as("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Product"))
    }

    async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        Ok(sqlx::query_as("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<String>> {
        Ok(
            sqlx::query_scalar("SELECT DISTINCT category FROM products WHERE is_active ORDER BY category")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_product(&self, product: &Product) -> StoreResult<Product> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO products (id, slug, name, description, price, compare_at_price, category,
                                  sizes, colors, images, stock, is_active, is_featured, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_at_price)
        .bind(&product.category)
        .bind(&product.sizes)
        .bind(&product.colors)
        .bind(&product.images)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_product(&self, product: &Product) -> StoreResult<Product> {
        sqlx::query_as(
            r#"
            UPDATE products
               SET slug = $2, name = $3, description = $4, price = $5, compare_at_price = $6,
                   category = $7, sizes = $8, colors = $9, images = $10, stock = $11,
                   is_active = $12, is_featured = $13, updated_at = $14
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.compare_at_price)
        .bind(&product.category)
        .bind(&product.sizes)
        .bind(&product.colors)
        .bind(&product.images)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Product"))
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| match StoreError::from(err) {
                StoreError::Conflict(_) => StoreError::Conflict("product is referenced by existing orders".to_string()),
                other => other,
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product"));
        }
        Ok(())
    }

    async fn list_zones(&self, active_only: bool) -> StoreResult<Vec<DeliveryZone>> {
        Ok(sqlx::query_as(
            "SELECT * FROM delivery_zones WHERE ($1 = FALSE OR is_active) ORDER BY position, name",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_zone(&self, id: Uuid) -> StoreResult<DeliveryZone> {
        sqlx::query_as("SELECT * FROM delivery_zones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Delivery zone"))
    }

    async fn insert_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO delivery_zones (id, name, fee, description, estimated_delay, is_active, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(zone.id)
        .bind(&zone.name)
        .bind(zone.fee)
        .bind(&zone.description)
        .bind(&zone.estimated_delay)
        .bind(zone.is_active)
        .bind(zone.position)
        .bind(zone.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_zone(&self, zone: &DeliveryZone) -> StoreResult<DeliveryZone> {
        sqlx::query_as(
            r#"
            UPDATE delivery_zones
               SET name = $2, fee = $3, description = $4, estimated_delay = $5, is_active = $6, position = $7
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(zone.id)
        .bind(&zone.name)
        .bind(zone.fee)
        .bind(&zone.description)
        .bind(&zone.estimated_delay)
        .bind(zone.is_active)
        .bind(zone.position)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Delivery zone"))
    }

    async fn delete_zone(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM delivery_zones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Delivery zone"));
        }
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        // Conditional decrement: a concurrent order cannot push stock below zero.
        for (product_id, name, quantity) in aggregate_quantities(order) {
            let remaining: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE products SET stock = stock - $1, updated_at = now()
                 WHERE id = $2 AND is_active AND stock >= $1
                RETURNING stock
                "#,
            )
            .bind(quantity)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

            if remaining.is_none() {
                let current: Option<(String, i32, bool)> =
                    sqlx::query_as("SELECT name, stock, is_active FROM products WHERE id = $1")
                        .bind(product_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                return Err(match current {
                    None => StoreError::NotFound(format!("Product {}", name)),
                    Some((product, stock, is_active)) => StoreError::InsufficientStock {
                        product_id,
                        product,
                        available: if is_active { stock } else { 0 },
                        requested: quantity,
                    },
                });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, customer_name, customer_phone, customer_email,
                                delivery_zone_id, delivery_zone_name, delivery_address, notes, payment_method,
                                subtotal, delivery_fee, total, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(order.delivery_zone_id)
        .bind(&order.delivery_zone_name)
        .bind(&order.delivery_address)
        .bind(&order.notes)
        .bind(order.payment_method.as_str())
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, product_name, size, color,
                                         unit_price, quantity, line_total, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.size)
            .bind(&item.color)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order.clone())
    }

    async fn get_order(&self, id: Uuid) -> StoreResult<Order> {
        let row: OrderRow = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Order"))?;
        let mut orders = self.hydrate_orders(vec![row]).await?;
        orders.pop().ok_or_else(|| StoreError::not_found("Order"))
    }

    async fn get_order_by_number(&self, order_number: &str) -> StoreResult<Order> {
        self.fetch_order("upper(order_number)", &order_number.to_uppercase()).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM orders WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(phone) = &filter.phone {
            qb.push(" AND customer_phone = ").push_bind(phone.clone());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(filter.effective_limit())
            .push(" OFFSET ")
            .push_bind(filter.effective_offset());

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.hydrate_orders(rows).await
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        let current: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("Order"))?;
        let from = OrderStatus::parse(&current).ok_or_else(|| invalid_column("status", &current))?;
        if !from.can_transition_to(status) {
            return Err(StoreError::InvalidTransition { from, to: status });
        }

        sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;

        if status == OrderStatus::Cancelled {
            sqlx::query(
                r#"
                UPDATE products p
                   SET stock = p.stock + reserved.quantity, updated_at = now()
                  FROM (SELECT product_id, SUM(quantity)::INT AS quantity
                          FROM order_items WHERE order_id = $1
                         GROUP BY product_id) reserved
                 WHERE p.id = reserved.product_id
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get_order(id).await
    }

    async fn get_settings(&self) -> StoreResult<SiteSettings> {
        let stored: Option<Json<SiteSettings>> = sqlx::query_scalar("SELECT data FROM site_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(stored.map(|Json(settings)| settings).unwrap_or_default())
    }

    async fn save_settings(&self, settings: &SiteSettings) -> StoreResult<SiteSettings> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (id, data, updated_at) VALUES (1, $1, now())
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(Json(settings))
        .execute(&self.pool)
        .await?;
        Ok(settings.clone())
    }

    async fn list_gallery(&self, gallery: &str, active_only: bool) -> StoreResult<Vec<GalleryImage>> {
        Ok(sqlx::query_as(
            r#"
            SELECT * FROM gallery_images
             WHERE gallery = $1 AND ($2 = FALSE OR is_active)
             ORDER BY position, created_at
            "#,
        )
        .bind(gallery)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_gallery_image(&self, id: Uuid) -> StoreResult<GalleryImage> {
        sqlx::query_as("SELECT * FROM gallery_images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Gallery image"))
    }

    async fn insert_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO gallery_images (id, gallery, title, image_url, alt, position, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(image.id)
        .bind(&image.gallery)
        .bind(&image.title)
        .bind(&image.image_url)
        .bind(&image.alt)
        .bind(image.position)
        .bind(image.is_active)
        .bind(image.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_gallery_image(&self, image: &GalleryImage) -> StoreResult<GalleryImage> {
        sqlx::query_as(
            r#"
            UPDATE gallery_images
               SET title = $2, image_url = $3, alt = $4, position = $5, is_active = $6
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(image.id)
        .bind(&image.title)
        .bind(&image.image_url)
        .bind(&image.alt)
        .bind(image.position)
        .bind(image.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Gallery image"))
    }

    async fn delete_gallery_image(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Gallery image"));
        }
        Ok(())
    }

    async fn reorder_gallery(&self, gallery: &str, ids: &[Uuid]) -> StoreResult<Vec<GalleryImage>> {
        let mut tx = self.pool.begin().await?;
        for (position, id) in ids.iter().enumerate() {
            let result = sqlx::query("UPDATE gallery_images SET position = $1 WHERE id = $2 AND gallery = $3")
                .bind(position as i32)
                .bind(id)
                .bind(gallery)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Gallery image"));
            }
        }
        tx.commit().await?;
        self.list_gallery(gallery, false).await
    }

    async fn subscribe(&self, email: &str, source: SubscriberSource) -> StoreResult<bool> {
        // RETURNING yields nothing when the address was already active.
        let changed: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO newsletter_subscribers (id, email, source, is_active, created_at)
            VALUES ($1, $2, $3, TRUE, now())
            ON CONFLICT (email) DO UPDATE SET is_active = TRUE
             WHERE newsletter_subscribers.is_active = FALSE
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(source.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(changed.is_some())
    }

    async fn unsubscribe(&self, email: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE newsletter_subscribers SET is_active = FALSE WHERE email = $1 AND is_active")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_subscribers(&self, active_only: bool) -> StoreResult<Vec<NewsletterSubscriber>> {
        let rows: Vec<SubscriberRow> = sqlx::query_as(
            "SELECT * FROM newsletter_subscribers WHERE ($1 = FALSE OR is_active) ORDER BY created_at DESC",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn save_push_subscription(&self, subscription: &PushSubscription) -> StoreResult<PushSubscription> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO push_subscriptions (id, endpoint, p256dh, auth, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (endpoint) DO UPDATE
               SET p256dh = EXCLUDED.p256dh,
                   auth = EXCLUDED.auth,
                   is_admin = push_subscriptions.is_admin OR EXCLUDED.is_admin
            RETURNING *
            "#,
        )
        .bind(subscription.id)
        .bind(&subscription.endpoint)
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .bind(subscription.is_admin)
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_push_subscriptions(&self, admin: bool) -> StoreResult<Vec<PushSubscription>> {
        Ok(
            sqlx::query_as("SELECT * FROM push_subscriptions WHERE is_admin = $1 ORDER BY created_at")
                .bind(admin)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn insert_campaign(&self, campaign: &Campaign) -> StoreResult<Campaign> {
        let row: CampaignRow = sqlx::query_as(
            r#"
            INSERT INTO campaigns (id, channel, title, body, url, status, recipients, delivered, failed,
                                   created_at, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(campaign.id)
        .bind(campaign.channel.as_str())
        .bind(&campaign.title)
        .bind(&campaign.body)
        .bind(&campaign.url)
        .bind(campaign.status.as_str())
        .bind(campaign.recipients)
        .bind(campaign.delivered)
        .bind(campaign.failed)
        .bind(campaign.created_at)
        .bind(campaign.sent_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn get_campaign(&self, id: Uuid) -> StoreResult<Campaign> {
        let row: CampaignRow = sqlx::query_as("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Campaign"))?;
        row.try_into()
    }

    async fn list_campaigns(&self) -> StoreResult<Vec<Campaign>> {
        let rows: Vec<CampaignRow> = sqlx::query_as("SELECT * FROM campaigns ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn claim_campaign(&self, id: Uuid) -> StoreResult<Campaign> {
        let row: Option<CampaignRow> = sqlx::query_as(
            "UPDATE campaigns SET status = 'sending' WHERE id = $1 AND status = 'draft' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                // Distinguish a missing campaign from one that was already claimed.
                self.get_campaign(id).await?;
                Err(StoreError::Conflict("campaign has already been sent".to_string()))
            }
        }
    }

    async fn record_campaign_outcome(&self, id: Uuid, outcome: CampaignOutcome) -> StoreResult<Campaign> {
        let row: Option<CampaignRow> = sqlx::query_as(
            r#"
            UPDATE campaigns
               SET status = $2, recipients = $3, delivered = $4, failed = $5, sent_at = now()
             WHERE id = $1 AND status = 'sending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(outcome.status().as_str())
        .bind(outcome.recipients)
        .bind(outcome.delivered)
        .bind(outcome.failed)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => {
                self.get_campaign(id).await?;
                Err(StoreError::Conflict("campaign is not being sent".to_string()))
            }
        }
    }

    async fn get_admin(&self, id: Uuid) -> StoreResult<AdminUser> {
        let row: AdminRow = sqlx::query_as("SELECT * FROM admin_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Admin"))?;
        row.try_into()
    }

    async fn get_admin_by_email(&self, email: &str) -> StoreResult<AdminUser> {
        let row: AdminRow = sqlx::query_as("SELECT * FROM admin_users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Admin"))?;
        row.try_into()
    }

    async fn list_admins(&self) -> StoreResult<Vec<AdminUser>> {
        let rows: Vec<AdminRow> = sqlx::query_as("SELECT * FROM admin_users ORDER BY email")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn insert_admin(&self, admin: &AdminUser) -> StoreResult<AdminUser> {
        let row: AdminRow = sqlx::query_as(
            r#"
            INSERT INTO admin_users (id, email, name, password_hash, role, created_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(admin.id)
        .bind(&admin.email)
        .bind(&admin.name)
        .bind(&admin.password_hash)
        .bind(admin.role.as_str())
        .bind(admin.created_at)
        .bind(admin.last_login_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn delete_admin(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Admin"));
        }
        Ok(())
    }

    async fn touch_admin_login(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE admin_users SET last_login_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn dashboard_stats(&self, low_stock_threshold: i32) -> StoreResult<DashboardStats> {
        let by_status: Vec<(String, i64)> = sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let orders_by_status: BTreeMap<String, i64> = by_status.into_iter().collect();
        let orders_total = orders_by_status.values().sum();

        let revenue_statuses: Vec<&str> = OrderStatus::ALL
            .iter()
            .filter(|s| s.counts_as_revenue())
            .map(|s| s.as_str())
            .collect();
        let revenue: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders WHERE status = ANY($1)")
                .bind(&revenue_statuses)
                .fetch_one(&self.pool)
                .await?;

        let (products_total, products_active): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM products")
                .fetch_one(&self.pool)
                .await?;

        let low_stock: Vec<(Uuid, String, i32)> = sqlx::query_as(
            "SELECT id, name, stock FROM products WHERE is_active AND stock <= $1 ORDER BY stock, name LIMIT 10",
        )
        .bind(low_stock_threshold)
        .fetch_all(&self.pool)
        .await?;

        let subscribers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active")
            .fetch_one(&self.pool)
            .await?;

        let recent_orders = self
            .list_orders(&OrderFilter { limit: Some(5), ..Default::default() })
            .await?;

        Ok(DashboardStats {
            orders_total,
            orders_by_status,
            revenue,
            products_total,
            products_active,
            low_stock: low_stock
                .into_iter()
                .map(|(id, name, stock)| LowStockProduct { id, name, stock })
                .collect(),
            subscribers,
            recent_orders,
        })
    }
}
