pub mod admin_user;
pub mod campaign;
pub mod dashboard;
pub mod delivery_zone;
pub mod gallery;
pub mod newsletter;
pub mod order;
pub mod product;
pub mod push;
pub mod settings;

pub use admin_user::{AdminUser, NewAdminRequest};
pub use campaign::{Campaign, CampaignInput, CampaignOutcome};
pub use dashboard::{DashboardStats, LowStockProduct};
pub use delivery_zone::{DeliveryZone, DeliveryZoneInput, DeliveryZonePatch};
pub use gallery::{GalleryImage, GalleryImageInput, GalleryImagePatch};
pub use newsletter::{NewsletterSubscriber, SubscribeRequest, SubscriberSource, UnsubscribeRequest};
pub use order::{NewOrderRequest, Order, OrderFilter, OrderItem, OrderLineRequest};
pub use product::{Product, ProductFilter, ProductInput, ProductPatch};
pub use push::{PushKeys, PushSubscription, PushSubscriptionInput};
pub use settings::{PublicSettings, SettingsPatch, SiteSettings};

use serde::{Deserialize, Deserializer};

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`)
/// in PATCH-style payloads.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
