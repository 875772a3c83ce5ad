use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::double_option;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Price in Guinean francs.
    pub price: i64,
    pub compare_at_price: Option<i64>,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub images: Vec<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn accepts_size(&self, size: Option<&str>) -> bool {
        match size {
            Some(size) => self.sizes.is_empty() || self.sizes.iter().any(|s| s.eq_ignore_ascii_case(size)),
            None => self.sizes.is_empty(),
        }
    }

    pub fn accepts_color(&self, color: Option<&str>) -> bool {
        match color {
            Some(color) => self.colors.is_empty() || self.colors.iter().any(|c| c.eq_ignore_ascii_case(color)),
            None => self.colors.is_empty(),
        }
    }
}

/// Admin payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub compare_at_price: Option<i64>,
    pub category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_true() -> bool {
    true
}

/// Admin payload for a partial product update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub compare_at_price: Option<Option<i64>>,
    pub category: Option<String>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(slug) = self.slug {
            product.slug = slug;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(compare_at_price) = self.compare_at_price {
            product.compare_at_price = compare_at_price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        if let Some(colors) = self.colors {
            product.colors = colors;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
        if let Some(is_featured) = self.is_featured {
            product.is_featured = is_featured;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub active_only: bool,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn public() -> Self {
        Self {
            active_only: true,
            ..Default::default()
        }
    }

    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// In-memory equivalent of the SQL predicate used by the Postgres store.
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active {
            return false;
        }
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !product.name.to_lowercase().contains(&needle) && !product.description.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(name: &str, price: i64, stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            slug: crate::types::slugify(name),
            name: name.to_string(),
            description: String::new(),
            price,
            compare_at_price: None,
            category: "t-shirts".to_string(),
            sizes: vec!["M".to_string(), "L".to_string()],
            colors: vec![],
            images: vec![],
            stock,
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn filter_matches_search_category_and_activity() {
        let mut tee = product("T-shirt Grandson Noir", 150_000, 4);
        let filter = ProductFilter {
            category: Some("T-Shirts".to_string()),
            search: Some("noir".to_string()),
            active_only: true,
            ..Default::default()
        };
        assert!(filter.matches(&tee));

        tee.is_active = false;
        assert!(!filter.matches(&tee));
        assert!(!ProductFilter { search: Some("hoodie".into()), ..Default::default() }.matches(&tee));
    }

    #[test]
    fn size_rules_follow_product_options() {
        let mut tee = product("Tee", 100_000, 1);
        assert!(tee.accepts_size(Some("m")));
        assert!(!tee.accepts_size(Some("XXL")));
        assert!(!tee.accepts_size(None));

        tee.sizes.clear();
        assert!(tee.accepts_size(None));
        assert!(tee.accepts_color(Some("rouge")));
    }

    #[test]
    fn color_rules_mirror_size_rules() {
        let mut tee = product("Tee", 100_000, 1);
        tee.colors = vec!["Noir".to_string(), "Blanc".to_string()];
        assert!(tee.accepts_color(Some("noir")));
        assert!(!tee.accepts_color(Some("Rouge")));
        assert!(!tee.accepts_color(None));

        tee.colors.clear();
        assert!(tee.accepts_color(None));
    }

    #[test]
    fn patch_can_clear_compare_at_price() {
        let mut tee = product("Tee", 100_000, 1);
        tee.compare_at_price = Some(120_000);
        let patch: ProductPatch = serde_json::from_str(r#"{"compare_at_price": null, "stock": 9}"#).unwrap();
        patch.apply(&mut tee);
        assert_eq!(tee.compare_at_price, None);
        assert_eq!(tee.stock, 9);
    }

    #[test]
    fn limits_are_clamped() {
        let filter = ProductFilter { limit: Some(10_000), offset: Some(-4), ..Default::default() };
        assert_eq!(filter.effective_limit(), ProductFilter::MAX_LIMIT);
        assert_eq!(filter.effective_offset(), 0);
    }
}
