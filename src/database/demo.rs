use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::database::models::{DeliveryZone, GalleryImage, Product, SiteSettings};
use crate::types::slugify;

/// Synthetic catalogue served when the database is unreachable.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    pub products: Vec<Product>,
    pub zones: Vec<DeliveryZone>,
    pub settings: SiteSettings,
    pub gallery: Vec<GalleryImage>,
}

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price: i64,
    compare_at_price: Option<i64>,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    stock: i32,
    featured: bool,
}

const APPAREL_SIZES: &[&str] = &["S", "M", "L", "XL", "XXL"];

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "T-shirt Grandson Classique",
        category: "t-shirts",
        description: "T-shirt en coton épais, logo Grandson brodé sur la poitrine.",
        price: 150_000,
        compare_at_price: Some(180_000),
        sizes: APPAREL_SIZES,
        colors: &["Noir", "Blanc"],
        stock: 40,
        featured: true,
    },
    DemoProduct {
        name: "T-shirt Conakry by Night",
        category: "t-shirts",
        description: "Sérigraphie de la corniche de Conakry, coupe oversize.",
        price: 175_000,
        compare_at_price: None,
        sizes: APPAREL_SIZES,
        colors: &["Noir"],
        stock: 25,
        featured: false,
    },
    DemoProduct {
        name: "Hoodie Grandson Héritage",
        category: "sweats",
        description: "Sweat à capuche molletonné, broderie ton sur ton.",
        price: 350_000,
        compare_at_price: Some(400_000),
        sizes: APPAREL_SIZES,
        colors: &["Gris chiné", "Bordeaux"],
        stock: 15,
        featured: true,
    },
    DemoProduct {
        name: "Casquette Brodée GP",
        category: "accessoires",
        description: "Casquette six panneaux, monogramme GP brodé.",
        price: 90_000,
        compare_at_price: None,
        sizes: &[],
        colors: &["Noir", "Beige"],
        stock: 30,
        featured: false,
    },
    DemoProduct {
        name: "Tote Bag Kaloum",
        category: "accessoires",
        description: "Sac en toile résistante, imprimé Kaloum.",
        price: 60_000,
        compare_at_price: None,
        sizes: &[],
        colors: &[],
        stock: 50,
        featured: false,
    },
    DemoProduct {
        name: "Polo Grandson Signature",
        category: "polos",
        description: "Polo piqué, col côtelé, logo signature.",
        price: 200_000,
        compare_at_price: None,
        sizes: APPAREL_SIZES,
        colors: &["Blanc", "Vert forêt"],
        stock: 4,
        featured: true,
    },
    DemoProduct {
        name: "Jogging Grandson Street",
        category: "pantalons",
        description: "Pantalon de jogging coupe droite, bandes latérales.",
        price: 275_000,
        compare_at_price: None,
        sizes: APPAREL_SIZES,
        colors: &["Noir"],
        stock: 12,
        featured: false,
    },
    DemoProduct {
        name: "Bob Grandson Wax",
        category: "accessoires",
        description: "Bob réversible en tissu wax.",
        price: 80_000,
        compare_at_price: Some(95_000),
        sizes: &[],
        colors: &[],
        stock: 0,
        featured: false,
    },
];

/// (name, fee, delay, active)
const ZONES: &[(&str, i64, &str, bool)] = &[
    ("Kaloum", 20_000, "24h", true),
    ("Dixinn", 25_000, "24h", true),
    ("Matam", 25_000, "24h", true),
    ("Ratoma", 30_000, "24 à 48h", true),
    ("Matoto", 35_000, "24 à 48h", true),
    ("Coyah / Dubréka", 50_000, "48 à 72h", true),
    ("Kindia", 80_000, "3 à 5 jours", false),
];

const HERO_IMAGES: &[(&str, &str)] = &[
    ("Nouvelle collection", "https://images.grandsonproject.com/hero/collection.jpg"),
    ("Made in Conakry", "https://images.grandsonproject.com/hero/conakry.jpg"),
    ("Livraison rapide", "https://images.grandsonproject.com/hero/livraison.jpg"),
];

/// Builds a fresh demo catalogue with new ids.
pub fn seed() -> DemoCatalog {
    let now = Utc::now();

    let products = PRODUCTS
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let slug = slugify(p.name);
            // Spread creation dates so "newest first" ordering is stable.
            let created_at = now - Duration::days(i as i64);
            Product {
                id: Uuid::new_v4(),
                images: vec![format!("https://images.grandsonproject.com/products/{}.jpg", slug)],
                slug,
                name: p.name.to_string(),
                description: p.description.to_string(),
                price: p.price,
                compare_at_price: p.compare_at_price,
                category: p.category.to_string(),
                sizes: p.sizes.iter().map(|s| s.to_string()).collect(),
                colors: p.colors.iter().map(|c| c.to_string()).collect(),
                stock: p.stock,
                is_active: true,
                is_featured: p.featured,
                created_at,
                updated_at: created_at,
            }
        })
        .collect();

    let zones = ZONES
        .iter()
        .enumerate()
        .map(|(i, (name, fee, delay, active))| DeliveryZone {
            id: Uuid::new_v4(),
            name: name.to_string(),
            fee: *fee,
            description: None,
            estimated_delay: Some(delay.to_string()),
            is_active: *active,
            position: i as i32,
            created_at: now,
        })
        .collect();

    let gallery = HERO_IMAGES
        .iter()
        .enumerate()
        .map(|(i, (title, url))| GalleryImage {
            id: Uuid::new_v4(),
            gallery: "hero".to_string(),
            title: Some(title.to_string()),
            image_url: url.to_string(),
            alt: Some(title.to_string()),
            position: i as i32,
            is_active: true,
            created_at: now,
        })
        .collect();

    let settings = SiteSettings {
        whatsapp_number: Some("+224622000000".to_string()),
        free_delivery_threshold: Some(1_000_000),
        announcement: Some("Mode démo : les commandes ne sont pas expédiées.".to_string()),
        ..SiteSettings::default()
    };

    DemoCatalog { products, zones, settings, gallery }
}
