//! # Seed Data Generator
//!
//! Populates the database with demo warung products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p warung-db --bin seed
//!
//! # Limit the number of products
//! cargo run -p warung-db --bin seed -- --count 10
//!
//! # Specify database path
//! cargo run -p warung-db --bin seed -- --db ./data/warung.db
//! ```
//!
//! Each product gets a unique code, a realistic rupiah price, a cost
//! basis below the price, and an opening stock level. Seeding is
//! skipped when the catalog already has data.

use std::env;

use warung_db::{NewProduct, Store, StoreConfig};

/// Demo catalog: (code, name, price_minor, cost_minor, stock).
/// Prices are whole rupiah.
const DEMO_PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("MIE-GORENG", "Indomie Goreng 85g", 3500, 2800, 40),
    ("MIE-SOTO", "Indomie Soto 70g", 3000, 2400, 36),
    ("AQUA-600", "Aqua Botol 600ml", 4000, 3000, 48),
    ("TEH-BOTOL", "Teh Botol Sosro 450ml", 5000, 3800, 24),
    ("KOPI-KAPAL", "Kopi Kapal Api Sachet", 2000, 1500, 60),
    ("GULA-1KG", "Gula Pasir 1kg", 16000, 14000, 15),
    ("BERAS-5KG", "Beras Premium 5kg", 72000, 65000, 8),
    ("MINYAK-1L", "Minyak Goreng 1L", 18000, 16000, 12),
    ("TELUR-1KG", "Telur Ayam 1kg", 28000, 25000, 10),
    ("SABUN-LIFE", "Sabun Lifebuoy 85g", 4500, 3500, 30),
    ("SHAMPO-SACHET", "Shampoo Sachet", 1000, 700, 100),
    ("ROKOK-SURYA", "Gudang Garam Surya 12", 32000, 29500, 20),
    ("CHITATO", "Chitato Sapi Panggang 68g", 11000, 9000, 18),
    ("BISKUIT-ROMA", "Roma Kelapa 300g", 12000, 10000, 14),
    ("SUSU-UHT", "Ultra Milk Cokelat 250ml", 6500, 5200, 22),
    ("KECAP-ABC", "Kecap Manis ABC 135ml", 9000, 7500, 16),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = DEMO_PRODUCTS.len();
    let mut db_path = String::from("./warung_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEMO_PRODUCTS.len());
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
                println!("Warung POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to seed (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./warung_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Warung POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let store = Store::new(StoreConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = store.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");

    let mut seeded = 0;
    for (code, name, price_minor, cost_minor, stock) in DEMO_PRODUCTS.iter().take(count) {
        let new = NewProduct {
            code: code.to_string(),
            name: name.to_string(),
            price_minor: *price_minor,
            cost_minor: *cost_minor,
            stock: *stock,
        };

        if let Err(e) = store.catalog().upsert(&new).await {
            eprintln!("Failed to seed {}: {}", code, e);
            continue;
        }

        seeded += 1;
    }

    println!("✓ Seeded {} products", seeded);

    let total = store.catalog().count().await?;
    println!("  Catalog now holds {} active products", total);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
