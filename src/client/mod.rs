//! Catalog access for operators, with the same fallback chain as the
//! storefront: running backend, then the database directly, then demo data.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{AppConfig, DatabaseConfig};
use crate::database::models::{Product, ProductFilter};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered {0}")]
    Status(u16),

    #[error("Backend reported failure: {0}")]
    Backend(String),
}

/// Which link of the chain served the products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Backend,
    Database,
    Demo,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Backend => "backend",
            Source::Database => "database",
            Source::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogListing {
    pub source: Source,
    pub products: Vec<Product>,
}

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    data: Option<Vec<Product>>,
    error: Option<String>,
}

pub struct CatalogClient {
    http: reqwest::Client,
    backend_url: String,
    database: Option<DatabaseConfig>,
}

impl CatalogClient {
    pub fn new(backend_url: impl Into<String>, timeout: Duration, database: Option<DatabaseConfig>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            database: database.filter(|db| db.url.is_some()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            config.client.backend_url.clone(),
            Duration::from_millis(config.client.fetch_timeout_ms),
            Some(config.database.clone()),
        )
    }

    /// Never fails: the demo catalog is the last resort.
    pub async fn products(&self, filter: &ProductFilter) -> CatalogListing {
        match self.from_backend(filter).await {
            Ok(products) => return CatalogListing { source: Source::Backend, products },
            Err(err) => warn!(backend = %self.backend_url, error = %err, "Backend unreachable, trying database"),
        }

        if let Some(database) = &self.database {
            match self.from_database(database, filter).await {
                Ok(products) => return CatalogListing { source: Source::Database, products },
                Err(err) => warn!(error = %err, "Database unreachable, using demo catalog"),
            }
        }

        let products = match MemoryStore::demo().list_products(filter).await {
            Ok(products) => products,
            Err(err) => {
                warn!(error = %err, "Demo catalog failed");
                Vec::new()
            }
        };
        CatalogListing { source: Source::Demo, products }
    }

    async fn from_backend(&self, filter: &ProductFilter) -> Result<Vec<Product>, ClientError> {
        let url = format!("{}/api/products", self.backend_url);
        let mut query: Vec<(&str, String)> = vec![("limit", filter.effective_limit().to_string())];
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        if let Some(featured) = filter.featured {
            query.push(("featured", featured.to_string()));
        }

        debug!(%url, "Fetching products from backend");
        let response = self.http.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }
        let envelope: Envelope = response.json().await?;
        match (envelope.success, envelope.data) {
            (true, Some(products)) => Ok(products),
            _ => Err(ClientError::Backend(envelope.error.unwrap_or_else(|| "no data".to_string()))),
        }
    }

    async fn from_database(&self, database: &DatabaseConfig, filter: &ProductFilter) -> anyhow::Result<Vec<Product>> {
        let pool = DatabaseManager::pool(database)?;
        let store = PgStore::new(pool);
        let filter = ProductFilter {
            active_only: true,
            ..filter.clone()
        };
        Ok(store.list_products(&filter).await?)
    }
}
