use serde::{Deserialize, Serialize};

use super::double_option;

/// Store-wide settings edited from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub store_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub whatsapp_number: Option<String>,
    pub free_delivery_threshold: Option<i64>,
    pub announcement: Option<String>,
    pub maintenance_mode: bool,
    pub newsletter_auto_subscribe: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            store_name: "Grandson Project".to_string(),
            contact_phone: "+224 620 00 00 00".to_string(),
            contact_email: "contact@grandsonproject.com".to_string(),
            whatsapp_number: None,
            free_delivery_threshold: None,
            announcement: None,
            maintenance_mode: false,
            newsletter_auto_subscribe: true,
        }
    }
}

/// Subset of the settings the storefront is allowed to see.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSettings {
    pub store_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub whatsapp_number: Option<String>,
    pub free_delivery_threshold: Option<i64>,
    pub announcement: Option<String>,
    pub maintenance_mode: bool,
}

impl From<SiteSettings> for PublicSettings {
    fn from(settings: SiteSettings) -> Self {
        Self {
            store_name: settings.store_name,
            contact_phone: settings.contact_phone,
            contact_email: settings.contact_email,
            whatsapp_number: settings.whatsapp_number,
            free_delivery_threshold: settings.free_delivery_threshold,
            announcement: settings.announcement,
            maintenance_mode: settings.maintenance_mode,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub store_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub whatsapp_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub free_delivery_threshold: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub announcement: Option<Option<String>>,
    pub maintenance_mode: Option<bool>,
    pub newsletter_auto_subscribe: Option<bool>,
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut SiteSettings) {
        if let Some(v) = self.store_name {
            settings.store_name = v;
        }
        if let Some(v) = self.contact_phone {
            settings.contact_phone = v;
        }
        if let Some(v) = self.contact_email {
            settings.contact_email = v;
        }
        if let Some(v) = self.whatsapp_number {
            settings.whatsapp_number = v;
        }
        if let Some(v) = self.free_delivery_threshold {
            settings.free_delivery_threshold = v;
        }
        if let Some(v) = self.announcement {
            settings.announcement = v;
        }
        if let Some(v) = self.maintenance_mode {
            settings.maintenance_mode = v;
        }
        if let Some(v) = self.newsletter_auto_subscribe {
            settings.newsletter_auto_subscribe = v;
        }
    }
}
