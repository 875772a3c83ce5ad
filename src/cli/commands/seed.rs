use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::utils::{connect_store, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{DeliveryZoneInput, ProductInput};
use crate::database::{demo, Store, StoreError};
use crate::services::{catalog, delivery};
use crate::types::slugify;

/// YAML catalog accepted by `grandson seed --file`.
///
/// ```yaml
/// products:
///   - name: T-shirt Grandson
///     price: 150000
///     category: t-shirts
///     sizes: [S, M, L]
///     stock: 20
/// zones:
///   - name: Kaloum
///     fee: 20000
///     estimated_delay: 24h
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub products: Vec<ProductInput>,
    #[serde(default)]
    pub zones: Vec<DeliveryZoneInput>,
}

impl CatalogFile {
    pub fn parse(source: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("invalid catalog in {}", path.display()))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub products: usize,
    pub zones: usize,
    pub skipped: usize,
}

pub async fn handle(file: Option<PathBuf>, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = connect_store(config).await?;
    let report = match &file {
        Some(path) => seed_file(&store, CatalogFile::load(path)?).await?,
        None => seed_demo(&store).await?,
    };

    let origin = file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "demo catalog".to_string());
    output_success(
        &output_format,
        &format!(
            "Seeded {} products and {} zones from {} ({} skipped)",
            report.products, report.zones, origin, report.skipped
        ),
        Some(json!({
            "products": report.products,
            "zones": report.zones,
            "skipped": report.skipped,
        })),
    )
}

/// Entries go through the same validation as the admin API. Duplicates are skipped.
pub async fn seed_file(store: &dyn Store, file: CatalogFile) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for input in file.products {
        let slug = input.slug.clone().unwrap_or_else(|| slugify(&input.name));
        match store.get_product_by_slug(&slug).await {
            Ok(_) => {
                warn!(%slug, "Product already exists, skipping");
                report.skipped += 1;
                continue;
            }
            Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let name = input.name.clone();
        let product = catalog::create_product(store, input)
            .await
            .with_context(|| format!("product '{}'", name))?;
        info!(slug = %product.slug, "Seeded product");
        report.products += 1;
    }

    let existing = store.list_zones(false).await?;
    for input in file.zones {
        if existing.iter().any(|z| z.matches_key(&input.name)) {
            warn!(zone = %input.name, "Zone already exists, skipping");
            report.skipped += 1;
            continue;
        }
        let name = input.name.clone();
        delivery::create_zone(store, input)
            .await
            .with_context(|| format!("zone '{}'", name))?;
        report.zones += 1;
    }

    Ok(report)
}

/// Re-running is harmless: rows that already exist are counted as skipped.
pub async fn seed_demo(store: &dyn Store) -> anyhow::Result<SeedReport> {
    let catalog = demo::seed();
    let mut report = SeedReport::default();

    for product in &catalog.products {
        match store.insert_product(product).await {
            Ok(_) => report.products += 1,
            Err(StoreError::Conflict(_)) => report.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }
    for zone in &catalog.zones {
        match store.insert_zone(zone).await {
            Ok(_) => report.zones += 1,
            Err(StoreError::Conflict(_)) => report.skipped += 1,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProductFilter;
    use crate::database::MemoryStore;

    const CATALOG: &str = r#"
products:
  - name: Casquette Grandson
    price: 90000
    category: accessoires
    stock: 15
  - name: Sweat Conakry
    slug: sweat-conakry
    price: 320000
    compare_at_price: 380000
    category: sweats
    sizes: [M, L, XL]
    colors: [Noir]
    stock: 6
zones:
  - name: Kaloum
    fee: 20000
  - name: Lambanyi
    fee: 30000
    estimated_delay: 24 à 48h
"#;

    #[test]
    fn parses_yaml_catalog() {
        let file = CatalogFile::parse(CATALOG).unwrap();
        assert_eq!(file.products.len(), 2);
        assert_eq!(file.products[1].sizes, vec!["M", "L", "XL"]);
        assert!(file.products[0].is_active);
        assert_eq!(file.zones[1].estimated_delay.as_deref(), Some("24 à 48h"));
    }

    #[test]
    fn empty_document_sections_default() {
        let file = CatalogFile::parse("products: []\n").unwrap();
        assert!(file.products.is_empty());
        assert!(file.zones.is_empty());
    }

    #[tokio::test]
    async fn seeds_file_into_store_and_skips_known_zones() {
        let store = MemoryStore::demo();
        let before = store.list_products(&ProductFilter::default()).await.unwrap().len();

        let report = seed_file(&store, CatalogFile::parse(CATALOG).unwrap()).await.unwrap();
        assert_eq!(report, SeedReport { products: 2, zones: 1, skipped: 1 });

        let after = store.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(after.len(), before + 2);
        assert!(after.iter().any(|p| p.slug == "casquette-grandson"));
        assert!(store.list_zones(false).await.unwrap().iter().any(|z| z.name == "Lambanyi"));
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let store = MemoryStore::new();
        seed_file(&store, CatalogFile::parse(CATALOG).unwrap()).await.unwrap();
        let report = seed_file(&store, CatalogFile::parse(CATALOG).unwrap()).await.unwrap();
        assert_eq!(report, SeedReport { products: 0, zones: 0, skipped: 4 });
    }

    #[tokio::test]
    async fn invalid_product_aborts_with_its_name() {
        let store = MemoryStore::new();
        let file = CatalogFile::parse("products:\n  - name: Gratuit\n    price: 0\n    category: t-shirts\n").unwrap();
        let err = seed_file(&store, file).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Gratuit"));
    }

    #[tokio::test]
    async fn demo_seed_fills_empty_store() {
        let store = MemoryStore::new();
        let report = seed_demo(&store).await.unwrap();
        assert!(report.products > 0);
        assert!(report.zones > 0);
        assert_eq!(report.skipped, 0);
    }
}
