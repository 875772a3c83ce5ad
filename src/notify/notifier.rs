use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use super::{templates, EmailMessage, EmailSender, LogEmailSender, LogPushSender, NotifyError, PushMessage, PushSender};
use super::{HttpPushSender, SmtpEmailSender};
use crate::config::AppConfig;
use crate::database::models::{Order, PushSubscription};
use crate::database::Store;
use crate::types::format_gnf;

/// Dispatches order notifications without blocking the request that triggered them.
#[derive(Clone)]
pub struct Notifier {
    email: Arc<dyn EmailSender>,
    push: Arc<dyn PushSender>,
    store: Arc<dyn Store>,
    admin_email: Option<String>,
    site_url: String,
}

impl Notifier {
    pub fn new(
        email: Arc<dyn EmailSender>,
        push: Arc<dyn PushSender>,
        store: Arc<dyn Store>,
        admin_email: Option<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            email,
            push,
            store,
            admin_email,
            site_url: site_url.into(),
        }
    }

    /// Real providers when configured, logging stand-ins otherwise.
    pub fn from_config(config: &AppConfig, store: Arc<dyn Store>) -> Self {
        let email: Arc<dyn EmailSender> = match &config.email {
            Some(email_config) => match SmtpEmailSender::new(email_config) {
                Ok(sender) => Arc::new(sender),
                Err(err) => {
                    warn!(error = %err, "SMTP misconfigured, emails will only be logged");
                    Arc::new(LogEmailSender)
                }
            },
            None => Arc::new(LogEmailSender),
        };
        let push: Arc<dyn PushSender> = match &config.push {
            Some(push_config) => match HttpPushSender::new(push_config) {
                Ok(sender) => Arc::new(sender),
                Err(err) => {
                    warn!(error = %err, "Push gateway misconfigured, pushes will only be logged");
                    Arc::new(LogPushSender)
                }
            },
            None => Arc::new(LogPushSender),
        };
        let admin_email = config.email.as_ref().and_then(|e| e.admin_address.clone());
        Self::new(email, push, store, admin_email, config.shop.site_url.clone())
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub async fn send_email(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.email.send(message).await
    }

    /// Sends one push; subscriptions reported gone are deleted.
    pub async fn send_push(&self, subscription: &PushSubscription, message: &PushMessage) -> Result<(), NotifyError> {
        match self.push.send(subscription, message).await {
            Err(NotifyError::Gone) => {
                info!(endpoint = %subscription.endpoint, "Removing expired push subscription");
                if let Err(err) = self.store.delete_push_subscription(&subscription.endpoint).await {
                    warn!(error = %err, "Could not remove expired push subscription");
                }
                Err(NotifyError::Gone)
            }
            other => other,
        }
    }

    /// Customer confirmation, admin email and admin push, in the background.
    pub fn order_placed(&self, order: Order) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.deliver_order_placed(&order).await;
        });
    }

    /// Customer email after an admin status change, in the background.
    pub fn order_status_changed(&self, order: Order) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.deliver_status_change(&order).await;
        });
    }

    pub(crate) async fn deliver_order_placed(&self, order: &Order) {
        let settings = self.store.get_settings().await.unwrap_or_default();

        match templates::order_confirmation(order, &settings, &self.site_url) {
            Ok(Some(message)) => self.log_email_result(&message, self.send_email(&message).await),
            Ok(None) => {}
            Err(err) => warn!(order = %order.order_number, error = %err, "Could not render confirmation"),
        }

        if let Some(admin) = &self.admin_email {
            match templates::admin_new_order(order, admin) {
                Ok(message) => self.log_email_result(&message, self.send_email(&message).await),
                Err(err) => warn!(order = %order.order_number, error = %err, "Could not render admin email"),
            }
        }

        let message = PushMessage {
            title: format!("Nouvelle commande {}", order.order_number),
            body: format!("{} · {}", order.customer_name, format_gnf(order.total)),
            url: Some(format!("{}/admin/commandes/{}", self.site_url, order.id)),
        };
        match self.store.list_push_subscriptions(true).await {
            Ok(devices) => {
                let results = join_all(devices.iter().map(|device| self.send_push(device, &message))).await;
                let failed = results.iter().filter(|r| r.is_err()).count();
                if failed > 0 {
                    warn!(order = %order.order_number, failed, "Some admin pushes failed");
                }
            }
            Err(err) => warn!(error = %err, "Could not load admin push subscriptions"),
        }
    }

    pub(crate) async fn deliver_status_change(&self, order: &Order) {
        let settings = self.store.get_settings().await.unwrap_or_default();
        match templates::order_status(order, &settings, &self.site_url) {
            Ok(Some(message)) => self.log_email_result(&message, self.send_email(&message).await),
            Ok(None) => {}
            Err(err) => warn!(order = %order.order_number, error = %err, "Could not render status email"),
        }
    }

    fn log_email_result(&self, message: &EmailMessage, result: Result<(), NotifyError>) {
        if let Err(err) = result {
            warn!(to = %message.to, subject = %message.subject, error = %err, "Email delivery failed");
        }
    }
}
