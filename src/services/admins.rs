use chrono::Utc;
use uuid::Uuid;

use crate::auth::{hash_password, MIN_PASSWORD_LENGTH};
use crate::database::models::{AdminUser, NewAdminRequest};
use crate::database::{Store, StoreError};
use crate::error::{ApiError, ValidationErrors};
use crate::types::Email;

pub async fn create_admin(store: &dyn Store, request: NewAdminRequest) -> Result<AdminUser, ApiError> {
    let mut errors = ValidationErrors::new();
    let email = match Email::parse(&request.email) {
        Ok(email) => Some(email),
        Err(err) => {
            errors.add("email", err.to_string());
            None
        }
    };
    let name = request.name.trim().to_string();
    errors.check(!name.is_empty(), "name", "Le nom est obligatoire");
    errors.check(
        request.password.chars().count() >= MIN_PASSWORD_LENGTH,
        "password",
        &format!("Le mot de passe doit contenir au moins {} caractères", MIN_PASSWORD_LENGTH),
    );
    errors.into_result()?;
    let Some(email) = email else {
        return Err(ApiError::field("email", "L'adresse e-mail est invalide"));
    };

    let admin = AdminUser {
        id: Uuid::new_v4(),
        email: email.into_inner(),
        name,
        password_hash: hash_password(&request.password)?,
        role: request.role,
        created_at: Utc::now(),
        last_login_at: None,
    };
    let created = store.insert_admin(&admin).await.map_err(|err| match err {
        StoreError::Conflict(_) => ApiError::conflict(format!("Un administrateur utilise déjà l'adresse {}", admin.email)),
        other => other.into(),
    })?;
    tracing::info!(admin = %created.email, role = created.role.as_str(), "Admin created");
    Ok(created)
}

/// Removes an admin account; nobody can remove their own.
pub async fn delete_admin(store: &dyn Store, acting: Uuid, id: Uuid) -> Result<(), ApiError> {
    if acting == id {
        return Err(ApiError::forbidden("Vous ne pouvez pas supprimer votre propre compte"));
    }
    store.delete_admin(id).await?;
    tracing::info!(%id, "Admin deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::database::MemoryStore;
    use crate::types::AdminRole;

    fn request(email: &str, password: &str) -> NewAdminRequest {
        NewAdminRequest {
            email: email.to_string(),
            name: "Fatoumata Camara".to_string(),
            password: password.to_string(),
            role: AdminRole::Admin,
        }
    }

    #[tokio::test]
    async fn creates_hashed_admin_once() {
        let store = MemoryStore::new();
        let admin = create_admin(&store, request("Fatou@GrandsonProject.com", "conakry-224")).await.unwrap();
        assert_eq!(admin.email, "fatou@grandsonproject.com");
        assert!(verify_password("conakry-224", &admin.password_hash));

        let dup = create_admin(&store, request("fatou@grandsonproject.com", "conakry-224")).await.unwrap_err();
        assert_eq!(dup.error_code(), "CONFLICT");
        assert!(dup.to_json()["error"].as_str().unwrap().starts_with("Un administrateur"));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let store = MemoryStore::new();
        let err = create_admin(&store, request("a@grandsonproject.com", "short")).await.unwrap_err();
        assert_eq!(
            err.to_json()["field_errors"]["password"],
            "Le mot de passe doit contenir au moins 8 caractères"
        );
    }

    #[tokio::test]
    async fn cannot_delete_self() {
        let store = MemoryStore::new();
        let admin = create_admin(&store, request("b@grandsonproject.com", "password-ok")).await.unwrap();
        let err = delete_admin(&store, admin.id, admin.id).await.unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert_eq!(err.to_json()["error"], "Vous ne pouvez pas supprimer votre propre compte");
        delete_admin(&store, Uuid::new_v4(), admin.id).await.unwrap();
    }
}
