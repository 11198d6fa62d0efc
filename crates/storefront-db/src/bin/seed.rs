//! # Seed Data Generator
//!
//! Populates a database with shipping methods and demo products.
//!
//! ## Usage
//! ```bash
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! Products are tile and flooring lines sold by the box, each in a few
//! colors with a unique SKU `{LINE}-{COLOR}`.

use std::env;
use storefront_core::Money;
use storefront_db::{Database, DbConfig, NewProduct};

/// (name, price in cents)
const SHIPPING_METHODS: &[(&str, i64)] = &[
    ("Collect in store", 0),
    ("Standard delivery", 499),
    ("Next day delivery", 999),
];

/// (sku code, name, box price in cents)
const PRODUCT_LINES: &[(&str, &str, i64)] = &[
    ("SLT", "Slate Floor Tile", 3499),
    ("MET", "Metro Wall Tile", 1899),
    ("HEX", "Hexagon Mosaic", 4250),
    ("OAK", "Oak Laminate Plank", 2999),
    ("TER", "Terrazzo Floor Tile", 5499),
    ("POR", "Polished Porcelain", 3999),
];

const COLORS: &[&str] = &["White", "Grey", "Charcoal", "Sand"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    for (name, price_cents) in SHIPPING_METHODS {
        let method = db
            .shipping_methods()
            .insert(name, Money::from_cents(*price_cents))
            .await?;
        println!("  shipping #{}: {} ({})", method.id, method.name, method.price());
    }

    let mut generated = 0;
    for (code, name, price_cents) in PRODUCT_LINES {
        for color in COLORS {
            let product = NewProduct {
                name: format!("{} - {}", name, color),
                sku: Some(format!("{}-{}", code, color.to_uppercase())),
                color: Some(color.to_string()),
                box_price: Money::from_cents(*price_cents),
            };

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }
            generated += 1;
        }
    }

    println!();
    println!("✓ Seeded {} shipping methods and {} products", SHIPPING_METHODS.len(), generated);

    db.close().await;
    Ok(())
}
