use chrono::Utc;
use uuid::Uuid;

use super::is_http_url;
use crate::database::models::{Product, ProductFilter, ProductInput, ProductPatch};
use crate::database::{Store, StoreError};
use crate::error::{ApiError, ValidationErrors};
use crate::types::slugify;

pub const MAX_NAME_LENGTH: usize = 200;

/// Field rules shared by creation and updates.
pub fn validate_product(product: &Product) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let name = product.name.trim();
    errors.check(!name.is_empty(), "name", "Le nom du produit est obligatoire");
    errors.check(
        name.chars().count() <= MAX_NAME_LENGTH,
        "name",
        "Le nom du produit est trop long",
    );
    errors.check(
        !product.slug.is_empty()
            && product
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "slug",
        "Le slug ne peut contenir que des lettres minuscules, chiffres et tirets",
    );
    errors.check(product.price > 0, "price", "Le prix doit être supérieur à 0");
    if let Some(compare_at) = product.compare_at_price {
        errors.check(
            compare_at > product.price,
            "compare_at_price",
            "Le prix barré doit être supérieur au prix",
        );
    }
    errors.check(product.stock >= 0, "stock", "Le stock ne peut pas être négatif");
    errors.check(
        !product.category.trim().is_empty(),
        "category",
        "La catégorie est obligatoire",
    );
    errors.check(
        product.images.iter().all(|url| is_http_url(url)),
        "images",
        "Chaque image doit être une URL http(s)",
    );
    errors.into_result()
}

async fn slug_taken(store: &dyn Store, slug: &str, except: Option<Uuid>) -> Result<bool, ApiError> {
    match store.get_product_by_slug(slug).await {
        Ok(existing) => Ok(Some(existing.id) != except),
        Err(StoreError::NotFound(_)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Derives a free slug from the name, suffixing `-2`, `-3`... on collisions.
async fn unique_slug(store: &dyn Store, name: &str) -> Result<String, ApiError> {
    let base = slugify(name);
    if base.is_empty() {
        return Ok(base);
    }
    let mut candidate = base.clone();
    let mut n = 2;
    while slug_taken(store, &candidate, None).await? {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    Ok(candidate)
}

pub async fn create_product(store: &dyn Store, input: ProductInput) -> Result<Product, ApiError> {
    let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(explicit) => {
            if slug_taken(store, explicit, None).await? {
                return Err(ApiError::field("slug", "Ce slug est déjà utilisé"));
            }
            explicit.to_string()
        }
        None => unique_slug(store, &input.name).await?,
    };

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        slug,
        name: input.name.trim().to_string(),
        description: input.description.trim().to_string(),
        price: input.price,
        compare_at_price: input.compare_at_price,
        category: input.category.trim().to_string(),
        sizes: input.sizes,
        colors: input.colors,
        images: input.images,
        stock: input.stock,
        is_active: input.is_active,
        is_featured: input.is_featured,
        created_at: now,
        updated_at: now,
    };
    validate_product(&product)?;

    let created = store.insert_product(&product).await?;
    tracing::info!(product = %created.slug, "Product created");
    Ok(created)
}

pub async fn update_product(store: &dyn Store, id: Uuid, patch: ProductPatch) -> Result<Product, ApiError> {
    let mut product = store.get_product(id).await?;
    let previous_slug = product.slug.clone();
    patch.apply(&mut product);
    product.name = product.name.trim().to_string();
    product.slug = product.slug.trim().to_string();
    validate_product(&product)?;

    if product.slug != previous_slug && slug_taken(store, &product.slug, Some(id)).await? {
        return Err(ApiError::field("slug", "Ce slug est déjà utilisé"));
    }
    product.updated_at = Utc::now();
    Ok(store.update_product(&product).await?)
}

pub async fn delete_product(store: &dyn Store, id: Uuid) -> Result<(), ApiError> {
    store.delete_product(id).await.map_err(|err| match err {
        StoreError::Conflict(_) => ApiError::conflict(
            "Ce produit figure dans des commandes ; désactivez-le plutôt que de le supprimer",
        ),
        other => other.into(),
    })?;
    tracing::info!(%id, "Product deleted");
    Ok(())
}

/// Storefront listing: inactive products are never shown.
pub async fn public_products(store: &dyn Store, mut filter: ProductFilter) -> Result<Vec<Product>, ApiError> {
    filter.active_only = true;
    Ok(store.list_products(&filter).await?)
}

pub async fn public_product(store: &dyn Store, slug: &str) -> Result<Product, ApiError> {
    let product = store.get_product_by_slug(slug).await?;
    if !product.is_active {
        return Err(ApiError::not_found("Produit introuvable"));
    }
    Ok(product)
}
