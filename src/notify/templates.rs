use askama::Template;

use super::{EmailMessage, NotifyError};
use crate::database::models::{Campaign, Order, SiteSettings};
use crate::types::format_gnf;

/// One order line as shown in emails.
pub struct EmailLine {
    pub name: String,
    pub variant: String,
    pub quantity: i32,
    pub total: String,
}

fn email_lines(order: &Order) -> Vec<EmailLine> {
    order
        .items
        .iter()
        .map(|item| EmailLine {
            name: item.product_name.clone(),
            variant: [item.size.as_deref(), item.color.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" / "),
            quantity: item.quantity,
            total: format_gnf(item.line_total),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    store_name: &'a str,
    contact_phone: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    lines: &'a [EmailLine],
    subtotal: String,
    delivery_fee: String,
    total: String,
    zone_name: &'a str,
    address: &'a str,
    payment_label: &'a str,
    tracking_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    store_name: &'a str,
    contact_phone: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    lines: &'a [EmailLine],
    subtotal: String,
    delivery_fee: String,
    total: String,
    zone_name: &'a str,
    address: &'a str,
    payment_label: &'a str,
    tracking_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    tracking_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusText<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    status_label: &'a str,
    tracking_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/admin_new_order.txt")]
struct AdminNewOrderText<'a> {
    order_number: &'a str,
    customer_name: &'a str,
    customer_phone: &'a str,
    zone_name: &'a str,
    address: &'a str,
    payment_label: &'a str,
    lines: &'a [EmailLine],
    total: String,
}

#[derive(Template)]
#[template(path = "email/campaign.html")]
struct CampaignHtml<'a> {
    store_name: &'a str,
    title: &'a str,
    paragraphs: &'a [&'a str],
    url: Option<&'a str>,
    unsubscribe_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/campaign.txt")]
struct CampaignText<'a> {
    store_name: &'a str,
    title: &'a str,
    paragraphs: &'a [&'a str],
    url: Option<&'a str>,
    unsubscribe_url: &'a str,
}

pub fn tracking_url(site_url: &str, order: &Order) -> String {
    format!("{}/commande/suivi/{}", site_url, order.order_number)
}

/// Customer confirmation; `None` when the order has no email address.
pub fn order_confirmation(
    order: &Order,
    settings: &SiteSettings,
    site_url: &str,
) -> Result<Option<EmailMessage>, NotifyError> {
    let Some(to) = order.customer_email.clone() else {
        return Ok(None);
    };
    let lines = email_lines(order);
    let tracking = tracking_url(site_url, order);

    let html = OrderConfirmationHtml {
        store_name: &settings.store_name,
        contact_phone: &settings.contact_phone,
        customer_name: &order.customer_name,
        order_number: &order.order_number,
        lines: &lines,
        subtotal: format_gnf(order.subtotal),
        delivery_fee: format_gnf(order.delivery_fee),
        total: format_gnf(order.total),
        zone_name: &order.delivery_zone_name,
        address: &order.delivery_address,
        payment_label: order.payment_method.label(),
        tracking_url: &tracking,
    }
    .render()?;
    let text = OrderConfirmationText {
        store_name: &settings.store_name,
        contact_phone: &settings.contact_phone,
        customer_name: &order.customer_name,
        order_number: &order.order_number,
        lines: &lines,
        subtotal: format_gnf(order.subtotal),
        delivery_fee: format_gnf(order.delivery_fee),
        total: format_gnf(order.total),
        zone_name: &order.delivery_zone_name,
        address: &order.delivery_address,
        payment_label: order.payment_method.label(),
        tracking_url: &tracking,
    }
    .render()?;

    Ok(Some(EmailMessage {
        to,
        subject: format!("{} : commande {} reçue", settings.store_name, order.order_number),
        text,
        html: Some(html),
    }))
}

pub fn order_status(order: &Order, settings: &SiteSettings, site_url: &str) -> Result<Option<EmailMessage>, NotifyError> {
    let Some(to) = order.customer_email.clone() else {
        return Ok(None);
    };
    let tracking = tracking_url(site_url, order);
    let status_label = order.status.label();

    let html = OrderStatusHtml {
        store_name: &settings.store_name,
        customer_name: &order.customer_name,
        order_number: &order.order_number,
        status_label,
        tracking_url: &tracking,
    }
    .render()?;
    let text = OrderStatusText {
        store_name: &settings.store_name,
        customer_name: &order.customer_name,
        order_number: &order.order_number,
        status_label,
        tracking_url: &tracking,
    }
    .render()?;

    Ok(Some(EmailMessage {
        to,
        subject: format!("Commande {} : {}", order.order_number, status_label),
        text,
        html: Some(html),
    }))
}

pub fn admin_new_order(order: &Order, to: &str) -> Result<EmailMessage, NotifyError> {
    let lines = email_lines(order);
    let text = AdminNewOrderText {
        order_number: &order.order_number,
        customer_name: &order.customer_name,
        customer_phone: &order.customer_phone,
        zone_name: &order.delivery_zone_name,
        address: &order.delivery_address,
        payment_label: order.payment_method.label(),
        lines: &lines,
        total: format_gnf(order.total),
    }
    .render()?;

    Ok(EmailMessage {
        to: to.to_string(),
        subject: format!("Nouvelle commande {} ({})", order.order_number, format_gnf(order.total)),
        text,
        html: None,
    })
}

pub fn campaign(
    campaign: &Campaign,
    store_name: &str,
    to: &str,
    unsubscribe_url: &str,
) -> Result<EmailMessage, NotifyError> {
    let paragraphs: Vec<&str> = campaign
        .body
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let html = CampaignHtml {
        store_name,
        title: &campaign.title,
        paragraphs: &paragraphs,
        url: campaign.url.as_deref(),
        unsubscribe_url,
    }
    .render()?;
    let text = CampaignText {
        store_name,
        title: &campaign.title,
        paragraphs: &paragraphs,
        url: campaign.url.as_deref(),
        unsubscribe_url,
    }
    .render()?;

    Ok(EmailMessage {
        to: to.to_string(),
        subject: campaign.title.clone(),
        text,
        html: Some(html),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::OrderItem;
    use crate::types::{CampaignChannel, CampaignStatus, OrderStatus, PaymentMethod};
    use chrono::Utc;
    use uuid::Uuid;

    fn order(email: Option<&str>) -> Order {
        let id = Uuid::new_v4();
        Order {
            id,
            order_number: "GP-20260115-K7QZ".to_string(),
            customer_name: "Ibrahima Sow".to_string(),
            customer_phone: "+224622123456".to_string(),
            customer_email: email.map(str::to_string),
            delivery_zone_id: None,
            delivery_zone_name: "Ratoma".to_string(),
            delivery_address: "Kipé, près du rond-point".to_string(),
            notes: None,
            payment_method: PaymentMethod::OrangeMoney,
            subtotal: 300_000,
            delivery_fee: 30_000,
            total: 330_000,
            status: OrderStatus::Shipped,
            items: vec![OrderItem {
                id: Uuid::new_v4(),
                order_id: id,
                product_id: Uuid::new_v4(),
                product_name: "T-shirt Grandson Classique".to_string(),
                size: Some("L".to_string()),
                color: Some("Noir".to_string()),
                unit_price: 150_000,
                quantity: 2,
                line_total: 300_000,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn confirmation_lists_lines_and_totals() {
        let message = order_confirmation(&order(Some("ibrahima@example.gn")), &SiteSettings::default(), "https://shop.gn")
            .unwrap()
            .unwrap();
        assert_eq!(message.to, "ibrahima@example.gn");
        assert!(message.subject.contains("GP-20260115-K7QZ"));
        assert!(message.text.contains("2 x T-shirt Grandson Classique (L / Noir)"));
        assert!(message.text.contains(&format_gnf(330_000)));
        assert!(message.text.contains("https://shop.gn/commande/suivi/GP-20260115-K7QZ"));
        assert!(message.html.unwrap().contains("Kip"));
    }

    #[test]
    fn no_customer_email_means_no_message() {
        assert!(order_confirmation(&order(None), &SiteSettings::default(), "https://shop.gn")
            .unwrap()
            .is_none());
        assert!(order_status(&order(None), &SiteSettings::default(), "https://shop.gn")
            .unwrap()
            .is_none());
    }

    #[test]
    fn status_email_uses_french_label() {
        let message = order_status(&order(Some("a@b.gn")), &SiteSettings::default(), "https://shop.gn")
            .unwrap()
            .unwrap();
        assert!(message.subject.ends_with(OrderStatus::Shipped.label()));
    }

    #[test]
    fn campaign_splits_paragraphs_and_links_unsubscribe() {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            channel: CampaignChannel::Email,
            title: "Soldes de fin d'année".to_string(),
            body: "Jusqu'à -30 %.\n\nLivraison offerte à Kaloum.".to_string(),
            url: Some("https://shop.gn/soldes".to_string()),
            status: CampaignStatus::Draft,
            recipients: 0,
            delivered: 0,
            failed: 0,
            created_at: Utc::now(),
            sent_at: None,
        };
        let message = super::campaign(&campaign, "Grandson Project", "fan@example.gn", "https://shop.gn/u?t=1").unwrap();
        assert!(message.text.contains("Livraison offerte"));
        assert!(message.text.contains("https://shop.gn/soldes"));
        assert!(message.text.contains("https://shop.gn/u?t=1"));
    }
}
