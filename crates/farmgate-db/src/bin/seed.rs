//! # Seed Data Generator
//!
//! Populates the database with farm produce listings for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p farmgate-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p farmgate-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p farmgate-db --bin seed -- --db ./data/farmgate.db
//! ```
//!
//! Each product gets a price and stock level derived deterministically from
//! its index, so repeated runs against a fresh database produce the same
//! catalog.

use chrono::Utc;
use farmgate_core::Product;
use farmgate_db::{Database, DbConfig};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Produce categories with per-unit base prices in paise.
const CATEGORIES: &[(&str, i64, &[&str])] = &[
    (
        "Vegetables",
        2000,
        &[
            "Tomatoes 1kg",
            "Onions 1kg",
            "Potatoes 1kg",
            "Spinach 500g",
            "Okra 500g",
            "Carrots 1kg",
            "Cauliflower",
            "Cabbage",
            "Green Chillies 250g",
            "Coriander Bunch",
            "Bitter Gourd 500g",
            "Bottle Gourd",
            "Brinjal 500g",
            "Capsicum 500g",
            "Ginger 250g",
            "Garlic 250g",
        ],
    ),
    (
        "Fruits",
        6000,
        &[
            "Alphonso Mangoes 1kg",
            "Bananas Dozen",
            "Apples 1kg",
            "Oranges 1kg",
            "Papaya",
            "Guava 500g",
            "Pomegranate 500g",
            "Grapes 500g",
            "Watermelon",
            "Sweet Lime 1kg",
            "Custard Apple 500g",
            "Chikoo 500g",
        ],
    ),
    (
        "Dairy",
        5000,
        &[
            "Cow Milk 1L",
            "Buffalo Milk 1L",
            "Fresh Paneer 250g",
            "Curd 500g",
            "Ghee 500ml",
            "White Butter 200g",
            "Buttermilk 1L",
        ],
    ),
    (
        "Grains",
        8000,
        &[
            "Basmati Rice 1kg",
            "Wheat Flour 5kg",
            "Toor Dal 1kg",
            "Moong Dal 1kg",
            "Chana Dal 1kg",
            "Jowar Flour 1kg",
            "Bajra Flour 1kg",
            "Poha 500g",
        ],
    ),
    (
        "Extras",
        15000,
        &[
            "Raw Honey 500g",
            "Jaggery 1kg",
            "Turmeric Powder 250g",
            "Red Chilli Powder 250g",
            "Groundnut Oil 1L",
            "Sesame Oil 500ml",
            "Pickle Jar 400g",
        ],
    ),
];

const FARMERS: &[&str] = &[
    "farmer-green-valley",
    "farmer-sunrise-fields",
    "farmer-riverbend",
    "farmer-hilltop-organics",
    "farmer-lakeview",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./farmgate_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("FarmGate Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./farmgate_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 FarmGate Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category, base_price, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for batch in 0..4 {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + name_idx * 10 + batch;
                let product = generate_product(category, name, *base_price, seed);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let active = db.products().count().await?;
    println!("  Active products in catalog: {}", active);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with data derived from its seed index.
fn generate_product(category: &str, name: &str, base_price: i64, seed: usize) -> Product {
    let now = Utc::now();
    let seed = seed as i64;

    // Spread prices around the category base and leave a few items sold out.
    let price_paise = base_price + (seed % 7) * 500;
    let quantity_available = if seed % 11 == 0 { 0 } else { 5 + seed % 40 };

    Product {
        id: Uuid::new_v4().to_string(),
        farmer_id: FARMERS[seed as usize % FARMERS.len()].to_string(),
        name: name.to_string(),
        description: Some(format!("{category}, fresh from the farm")),
        price_paise,
        quantity_available,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
