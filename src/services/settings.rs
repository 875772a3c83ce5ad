use crate::database::models::{SettingsPatch, SiteSettings};
use crate::database::Store;
use crate::error::{ApiError, ValidationErrors};
use crate::types::{Email, Phone};

pub async fn update(store: &dyn Store, patch: SettingsPatch) -> Result<SiteSettings, ApiError> {
    let mut settings = store.get_settings().await?;
    patch.apply(&mut settings);

    let mut errors = ValidationErrors::new();
    settings.store_name = settings.store_name.trim().to_string();
    errors.check(!settings.store_name.is_empty(), "store_name", "Le nom de la boutique est obligatoire");
    errors.check(
        !settings.contact_phone.trim().is_empty(),
        "contact_phone",
        "Le téléphone de contact est obligatoire",
    );
    match Email::parse(&settings.contact_email) {
        Ok(email) => settings.contact_email = email.into_inner(),
        Err(err) => errors.add("contact_email", err.to_string()),
    }
    if let Some(whatsapp) = settings.whatsapp_number.as_deref().map(str::trim) {
        if whatsapp.is_empty() {
            settings.whatsapp_number = None;
        } else {
            match Phone::parse(whatsapp) {
                Ok(phone) => settings.whatsapp_number = Some(phone.as_str().to_string()),
                Err(err) => errors.add("whatsapp_number", err.to_string()),
            }
        }
    }
    if let Some(threshold) = settings.free_delivery_threshold {
        errors.check(
            threshold > 0,
            "free_delivery_threshold",
            "Le seuil de livraison gratuite doit être positif",
        );
    }
    errors.into_result()?;

    let saved = store.save_settings(&settings).await?;
    tracing::info!(maintenance = saved.maintenance_mode, "Site settings updated");
    Ok(saved)
}
