use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use super::delivery::{find_zone, quote};
use super::non_blank;
use crate::config::ShopConfig;
use crate::database::models::{NewOrderRequest, Order, OrderFilter, OrderItem, Product, SubscriberSource};
use crate::database::{Store, StoreError};
use crate::error::{insufficient_stock_message, ApiError, ValidationErrors};
use crate::notify::Notifier;
use crate::types::{Email, OrderStatus, PaymentMethod, Phone};

pub const MAX_CUSTOMER_NAME: usize = 120;
pub const MAX_ADDRESS: usize = 500;
pub const MAX_NOTES: usize = 1000;
pub const MAX_ITEMS: usize = 50;
pub const MAX_QUANTITY: i32 = 20;

const ORDER_NUMBER_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// `<prefix>-YYYYMMDD-XXXX` with a random uppercase suffix.
pub fn generate_order_number(prefix: &str, date: NaiveDate) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| ORDER_NUMBER_ALPHABET[rng.random_range(0..ORDER_NUMBER_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), suffix)
}

/// Checkout, tracking and status changes.
pub struct OrderService<'a> {
    store: &'a dyn Store,
    notifier: &'a Notifier,
    shop: &'a ShopConfig,
}

/// Request fields after validation, ready to be priced.
struct ValidatedOrder {
    customer_name: String,
    phone: Phone,
    email: Option<Email>,
    address: String,
    notes: Option<String>,
    payment_method: PaymentMethod,
}

impl<'a> OrderService<'a> {
    pub fn new(store: &'a dyn Store, notifier: &'a Notifier, shop: &'a ShopConfig) -> Self {
        Self { store, notifier, shop }
    }

    pub async fn place_order(&self, request: NewOrderRequest) -> Result<Order, ApiError> {
        let settings = self.store.get_settings().await?;

        let mut errors = ValidationErrors::new();
        let validated = validate_fields(&request, &mut errors);

        let ids: Vec<Uuid> = request
            .items
            .iter()
            .map(|line| line.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let products: HashMap<Uuid, Product> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_products(&ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };
        validate_lines(&request, &products, &mut errors);

        let zone = if request.delivery_zone.trim().is_empty() {
            None
        } else {
            let zone = find_zone(self.store, &request.delivery_zone).await?;
            match &zone {
                None => errors.add("delivery_zone", "Zone de livraison inconnue"),
                Some(z) if !z.is_active => errors.add(
                    "delivery_zone",
                    format!("La livraison n'est pas disponible pour la zone {}", z.name),
                ),
                Some(_) => {}
            }
            zone
        };

        errors.into_result()?;
        let (Some(fields), Some(zone)) = (validated, zone) else {
            return Err(ApiError::bad_request("Commande invalide"));
        };

        if settings.maintenance_mode {
            return Err(ApiError::service_unavailable(
                "La boutique est en maintenance, les commandes reprendront bientôt",
            ));
        }

        // Stock is checked per product across lines of different sizes.
        let mut requested: HashMap<Uuid, i32> = HashMap::new();
        for line in &request.items {
            *requested.entry(line.product_id).or_default() += line.quantity;
        }
        for (id, quantity) in &requested {
            if let Some(product) = products.get(id) {
                if product.stock < *quantity {
                    return Err(ApiError::InsufficientStock(insufficient_stock_message(
                        &product.name,
                        product.stock,
                        *quantity,
                    )));
                }
            }
        }

        let order_id = Uuid::new_v4();
        let items: Vec<OrderItem> = request
            .items
            .iter()
            .filter_map(|line| {
                let product = products.get(&line.product_id)?;
                Some(OrderItem {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: product.id,
                    product_name: product.name.clone(),
                    size: canonical_option(&product.sizes, line.size.as_deref()),
                    color: canonical_option(&product.colors, line.color.as_deref()),
                    unit_price: product.price,
                    quantity: line.quantity,
                    line_total: product.price.saturating_mul(i64::from(line.quantity)),
                })
            })
            .collect();
        // Saturates so an absurd cart is rejected by the quote instead of wrapping.
        let subtotal = items.iter().fold(0i64, |acc, item| acc.saturating_add(item.line_total));
        let delivery = quote(&zone, subtotal, settings.free_delivery_threshold)?;

        let now = Utc::now();
        let mut order = Order {
            id: order_id,
            order_number: String::new(),
            customer_name: fields.customer_name,
            customer_phone: fields.phone.as_str().to_string(),
            customer_email: fields.email.as_ref().map(|e| e.as_str().to_string()),
            delivery_zone_id: Some(zone.id),
            delivery_zone_name: zone.name.clone(),
            delivery_address: fields.address,
            notes: fields.notes,
            payment_method: fields.payment_method,
            subtotal,
            delivery_fee: delivery.fee,
            total: delivery.total,
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
        };

        let created = self.insert_with_fresh_number(&mut order).await?;
        info!(
            order = %created.order_number,
            total = created.total,
            zone = %created.delivery_zone_name,
            "Order placed"
        );

        if let Some(email) = &fields.email {
            let opted_in = request.subscribe_newsletter.unwrap_or(false) || settings.newsletter_auto_subscribe;
            if opted_in {
                if let Err(err) = self.store.subscribe(email.as_str(), SubscriberSource::Checkout).await {
                    warn!(order = %created.order_number, error = %err, "Newsletter subscription at checkout failed");
                }
            }
        }

        self.notifier.order_placed(created.clone());
        Ok(created)
    }

    async fn insert_with_fresh_number(&self, order: &mut Order) -> Result<Order, ApiError> {
        let today = order.created_at.date_naive();
        let mut last_conflict = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            order.order_number = generate_order_number(&self.shop.order_prefix, today);
            match self.store.insert_order(order).await {
                Ok(created) => return Ok(created),
                Err(StoreError::Conflict(msg)) => {
                    warn!(order = %order.order_number, "Order number collision, retrying");
                    last_conflict = Some(msg);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ApiError::conflict(last_conflict.unwrap_or_else(|| "Order number collision".to_string())))
    }

    /// Public lookup; the phone must match the one used at checkout.
    pub async fn track_order(&self, order_number: &str, phone: &str) -> Result<Order, ApiError> {
        let phone = Phone::parse(phone)?;
        let order = match self.store.get_order_by_number(order_number.trim()).await {
            Ok(order) => order,
            Err(StoreError::NotFound(_)) => return Err(ApiError::not_found("Commande introuvable")),
            Err(err) => return Err(err.into()),
        };
        if order.customer_phone != phone.as_str() {
            return Err(ApiError::not_found("Commande introuvable"));
        }
        Ok(order)
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, ApiError> {
        let order = self.store.update_order_status(id, status).await?;
        info!(order = %order.order_number, status = status.as_str(), "Order status updated");
        self.notifier.order_status_changed(order.clone());
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, ApiError> {
        Ok(self.store.get_order(id).await?)
    }

    pub async fn list_orders(&self, mut filter: OrderFilter) -> Result<Vec<Order>, ApiError> {
        if let Some(phone) = filter.phone.take() {
            filter.phone = Some(Phone::parse(&phone)?.as_str().to_string());
        }
        Ok(self.store.list_orders(&filter).await?)
    }
}

fn validate_fields(request: &NewOrderRequest, errors: &mut ValidationErrors) -> Option<ValidatedOrder> {
    let customer_name = request.customer_name.trim().to_string();
    errors.check(!customer_name.is_empty(), "customer_name", "Le nom est obligatoire");
    errors.check(
        customer_name.chars().count() <= MAX_CUSTOMER_NAME,
        "customer_name",
        "Le nom est trop long",
    );

    let phone = match Phone::parse(&request.customer_phone) {
        Ok(phone) => Some(phone),
        Err(err) => {
            errors.add("customer_phone", err.to_string());
            None
        }
    };

    let email = match non_blank(request.customer_email.as_deref()) {
        None => Some(None),
        Some(raw) => match Email::parse(&raw) {
            Ok(email) => Some(Some(email)),
            Err(err) => {
                errors.add("customer_email", err.to_string());
                None
            }
        },
    };

    let address = request.delivery_address.trim().to_string();
    errors.check(!address.is_empty(), "delivery_address", "L'adresse de livraison est obligatoire");
    errors.check(
        address.chars().count() <= MAX_ADDRESS,
        "delivery_address",
        "L'adresse de livraison est trop longue",
    );

    errors.check(
        !request.delivery_zone.trim().is_empty(),
        "delivery_zone",
        "Choisissez une zone de livraison",
    );

    let notes = non_blank(request.notes.as_deref());
    errors.check(
        notes.as_ref().map_or(true, |n| n.chars().count() <= MAX_NOTES),
        "notes",
        "La note est trop longue",
    );

    let payment_method = match non_blank(request.payment_method.as_deref()) {
        None => Some(PaymentMethod::default()),
        Some(raw) => {
            let parsed = PaymentMethod::parse(&raw);
            if parsed.is_none() {
                errors.add("payment_method", "Mode de paiement inconnu");
            }
            parsed
        }
    };

    Some(ValidatedOrder {
        customer_name,
        phone: phone?,
        email: email?,
        address,
        notes,
        payment_method: payment_method?,
    })
}

fn validate_lines(request: &NewOrderRequest, products: &HashMap<Uuid, Product>, errors: &mut ValidationErrors) {
    if request.items.is_empty() {
        errors.add("items", "Le panier est vide");
        return;
    }
    if request.items.len() > MAX_ITEMS {
        errors.add("items", format!("Une commande ne peut pas dépasser {} articles", MAX_ITEMS));
        return;
    }

    for (index, line) in request.items.iter().enumerate() {
        if !(1..=MAX_QUANTITY).contains(&line.quantity) {
            errors.add(
                format!("items[{}].quantity", index),
                format!("La quantité doit être comprise entre 1 et {}", MAX_QUANTITY),
            );
        }

        let Some(product) = products.get(&line.product_id).filter(|p| p.is_active) else {
            errors.add(format!("items[{}].product_id", index), "Ce produit n'est plus disponible");
            continue;
        };
        let size = non_blank(line.size.as_deref());
        if !product.accepts_size(size.as_deref()) {
            let message = match size {
                None => format!("Choisissez une taille pour « {} »", product.name),
                Some(size) => format!("La taille {} n'existe pas pour « {} »", size, product.name),
            };
            errors.add(format!("items[{}].size", index), message);
        }
        let color = non_blank(line.color.as_deref());
        if !product.accepts_color(color.as_deref()) {
            let message = match color {
                None => format!("Choisissez une couleur pour « {} »", product.name),
                Some(_) => format!("Cette couleur n'existe pas pour « {} »", product.name),
            };
            errors.add(format!("items[{}].color", index), message);
        }
    }
}

/// Stores the catalogue spelling of a size or color rather than the client's.
fn canonical_option(options: &[String], chosen: Option<&str>) -> Option<String> {
    let chosen = chosen.map(str::trim).filter(|c| !c.is_empty())?;
    Some(
        options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(chosen))
            .cloned()
            .unwrap_or_else(|| chosen.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::models::{OrderLineRequest, SettingsPatch};
    use crate::database::MemoryStore;
    use crate::notify::{LogEmailSender, LogPushSender};
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        notifier: Notifier,
        shop: ShopConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::demo());
            let notifier = Notifier::new(
                Arc::new(LogEmailSender),
                Arc::new(LogPushSender),
                store.clone(),
                None,
                "https://shop.gn",
            );
            Self {
                store,
                notifier,
                shop: AppConfig::development().shop,
            }
        }

        fn service(&self) -> OrderService<'_> {
            OrderService::new(self.store.as_ref(), &self.notifier, &self.shop)
        }

        async fn product(&self, slug: &str) -> Product {
            self.store.get_product_by_slug(slug).await.unwrap()
        }
    }

    fn request(lines: Vec<OrderLineRequest>) -> NewOrderRequest {
        NewOrderRequest {
            customer_name: "Mamadou Bah".to_string(),
            customer_phone: "622 12 34 56".to_string(),
            customer_email: Some("Mamadou@Example.gn".to_string()),
            delivery_zone: "Ratoma".to_string(),
            delivery_address: "Kipé, derrière la pharmacie".to_string(),
            notes: None,
            payment_method: Some("orange_money".to_string()),
            items: lines,
            subscribe_newsletter: None,
        }
    }

    fn line(product: &Product, quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product.id,
            quantity,
            size: product.sizes.first().map(|s| s.to_lowercase()),
            color: product.colors.first().cloned(),
        }
    }

    #[test]
    fn order_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let number = generate_order_number("GP", date);
        assert_eq!(number.len(), "GP-20260309-XXXX".len());
        assert!(number.starts_with("GP-20260309-"));
        assert!(number[12..].bytes().all(|b| ORDER_NUMBER_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn places_order_with_server_side_prices() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let stock_before = tee.stock;

        let order = fx.service().place_order(request(vec![line(&tee, 2)])).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_phone, "+224622123456");
        assert_eq!(order.customer_email.as_deref(), Some("mamadou@example.gn"));
        assert_eq!(order.payment_method, PaymentMethod::OrangeMoney);
        assert_eq!(order.subtotal, tee.price * 2);
        assert_eq!(order.delivery_fee, 30_000);
        assert_eq!(order.total, order.subtotal + 30_000);
        assert_eq!(order.items[0].size.as_deref(), tee.sizes.first().map(String::as_str));
        assert!(order.order_number.starts_with("GP-"));
        assert_eq!(fx.product("t-shirt-grandson-classique").await.stock, stock_before - 2);
    }

    #[tokio::test]
    async fn checkout_subscribes_to_newsletter() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        fx.service().place_order(request(vec![line(&tee, 1)])).await.unwrap();

        let subscribers = fx.store.list_subscribers(true).await.unwrap();
        assert!(subscribers.iter().any(|s| s.email == "mamadou@example.gn"));
    }

    async fn disable_auto_subscribe(fx: &Fixture) {
        let mut settings = fx.store.get_settings().await.unwrap();
        settings.newsletter_auto_subscribe = false;
        fx.store.save_settings(&settings).await.unwrap();
    }

    async fn subscribed(fx: &Fixture) -> bool {
        let subscribers = fx.store.list_subscribers(true).await.unwrap();
        subscribers.iter().any(|s| s.email == "mamadou@example.gn")
    }

    #[tokio::test]
    async fn no_subscription_when_settings_disabled_and_no_opt_in() {
        let fx = Fixture::new();
        disable_auto_subscribe(&fx).await;
        let tee = fx.product("t-shirt-grandson-classique").await;
        fx.service().place_order(request(vec![line(&tee, 1)])).await.unwrap();
        assert!(!subscribed(&fx).await);
    }

    #[tokio::test]
    async fn explicit_opt_in_subscribes_when_settings_disabled() {
        let fx = Fixture::new();
        disable_auto_subscribe(&fx).await;
        let tee = fx.product("t-shirt-grandson-classique").await;
        let mut req = request(vec![line(&tee, 1)]);
        req.subscribe_newsletter = Some(true);
        fx.service().place_order(req).await.unwrap();
        assert!(subscribed(&fx).await);
    }

    #[tokio::test]
    async fn auto_subscribe_setting_applies_despite_unchecked_box() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let mut req = request(vec![line(&tee, 1)]);
        req.subscribe_newsletter = Some(false);
        fx.service().place_order(req).await.unwrap();
        assert!(subscribed(&fx).await);
    }

    #[tokio::test]
    async fn absurd_prices_are_rejected_instead_of_wrapping() {
        let fx = Fixture::new();
        let mut tee = fx.product("t-shirt-grandson-classique").await;
        tee.price = i64::MAX / 2;
        tee.compare_at_price = None;
        fx.store.update_product(&tee).await.unwrap();

        let err = fx.service().place_order(request(vec![line(&tee, 3)])).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reports_all_field_errors_together() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let mut bad = request(vec![OrderLineRequest {
            product_id: tee.id,
            quantity: 21,
            size: Some("XXXL".to_string()),
            color: None,
        }]);
        bad.customer_name = " ".to_string();
        bad.customer_phone = "12345".to_string();
        bad.delivery_zone = "Labé".to_string();

        let body = fx.service().place_order(bad).await.unwrap_err().to_json();
        let fields = &body["field_errors"];
        for key in ["customer_name", "customer_phone", "delivery_zone", "items[0].quantity", "items[0].size", "items[0].color"] {
            assert!(fields[key].is_string(), "missing error for {}", key);
        }
    }

    #[tokio::test]
    async fn missing_color_is_rejected_like_missing_size() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let mut no_color = line(&tee, 1);
        no_color.color = Some("  ".to_string());

        let body = fx.service().place_order(request(vec![no_color])).await.unwrap_err().to_json();
        let message = body["field_errors"]["items[0].color"].as_str().unwrap();
        assert!(message.starts_with("Choisissez une couleur"));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let fx = Fixture::new();
        let err = fx.service().place_order(request(vec![])).await.unwrap_err();
        assert!(err.to_json()["field_errors"]["items"].is_string());
    }

    #[tokio::test]
    async fn stock_is_checked_across_lines() {
        let fx = Fixture::new();
        let polo = fx.store.list_products(&Default::default()).await.unwrap();
        let polo = polo.into_iter().find(|p| p.stock == 4).unwrap();

        let lines = vec![line(&polo, 3), line(&polo, 2)];
        let err = fx.service().place_order(request(lines)).await.unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");
        assert_eq!(fx.store.get_product(polo.id).await.unwrap().stock, 4);
    }

    #[tokio::test]
    async fn maintenance_mode_blocks_checkout() {
        let fx = Fixture::new();
        let mut settings = fx.store.get_settings().await.unwrap();
        SettingsPatch { maintenance_mode: Some(true), ..Default::default() }.apply(&mut settings);
        fx.store.save_settings(&settings).await.unwrap();

        let tee = fx.product("t-shirt-grandson-classique").await;
        let err = fx.service().place_order(request(vec![line(&tee, 1)])).await.unwrap_err();
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn tracking_requires_matching_phone() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let order = fx.service().place_order(request(vec![line(&tee, 1)])).await.unwrap();

        let found = fx
            .service()
            .track_order(&order.order_number.to_lowercase(), "+224 622 12 34 56")
            .await
            .unwrap();
        assert_eq!(found.id, order.id);

        let err = fx.service().track_order(&order.order_number, "655000000").await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn cancelling_restores_stock() {
        let fx = Fixture::new();
        let tee = fx.product("t-shirt-grandson-classique").await;
        let order = fx.service().place_order(request(vec![line(&tee, 2)])).await.unwrap();

        fx.service().update_status(order.id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(fx.product("t-shirt-grandson-classique").await.stock, tee.stock);

        let err = fx.service().update_status(order.id, OrderStatus::Confirmed).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    }
}
