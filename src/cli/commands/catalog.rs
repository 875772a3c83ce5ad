use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_empty_collection;
use crate::cli::OutputFormat;
use crate::client::CatalogClient;
use crate::config::AppConfig;
use crate::database::models::ProductFilter;
use crate::types::format_gnf;

#[derive(Subcommand)]
pub enum CatalogCommands {
    #[command(about = "List active products and report where they came from")]
    List {
        #[arg(long, help = "Only this category")]
        category: Option<String>,
        #[arg(long, help = "Search in names and descriptions")]
        search: Option<String>,
        #[arg(long, help = "Only featured products")]
        featured: bool,
        #[arg(long, help = "Maximum number of products")]
        limit: Option<i64>,
    },
}

pub async fn handle(cmd: CatalogCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CatalogCommands::List {
            category,
            search,
            featured,
            limit,
        } => {
            let filter = ProductFilter {
                category,
                search,
                featured: featured.then_some(true),
                limit,
                ..ProductFilter::public()
            };
            let listing = CatalogClient::from_config(config)?.products(&filter).await;

            if listing.products.is_empty() {
                return output_empty_collection(&output_format, "products", "No products");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "source": listing.source,
                        "products": listing.products,
                    }))?);
                }
                OutputFormat::Text => {
                    println!("Source: {}", listing.source.as_str());
                    for product in &listing.products {
                        let stock = if product.stock > 0 {
                            format!("{} en stock", product.stock)
                        } else {
                            "rupture".to_string()
                        };
                        println!(
                            "{:<36}  {:>14}  {:<14}  {}",
                            product.slug,
                            format_gnf(product.price),
                            product.category,
                            stock
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
