//! Demo catalog.

use bigdecimal::BigDecimal;

use crate::domain::Product;
use crate::ports::{ProductRepository, RepositoryResult};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    stock: i32,
    image_url: &'static str,
}

const CATALOG: [SeedProduct; 8] = [
    SeedProduct {
        name: "Wireless Headphones",
        description: "Noise cancelling wireless headphones",
        price: 250_000,
        stock: 10,
        image_url: "https://picsum.photos/id/0/5000/3333",
    },
    SeedProduct {
        name: "Smart Watch",
        description: "Fitness tracking smart watch",
        price: 180_000,
        stock: 15,
        image_url: "https://picsum.photos/id/10/2500/1667",
    },
    SeedProduct {
        name: "Mechanical Keyboard",
        description: "RGB mechanical keyboard",
        price: 320_000,
        stock: 5,
        image_url: "https://picsum.photos/id/20/3670/2462",
    },
    SeedProduct {
        name: "Gaming Mouse",
        description: "High precision gaming mouse",
        price: 120_000,
        stock: 20,
        image_url: "https://picsum.photos/id/26/4209/2769",
    },
    SeedProduct {
        name: "Laptop Stand",
        description: "Ergonomic aluminum laptop stand",
        price: 90_000,
        stock: 12,
        image_url: "https://picsum.photos/id/27/3264/1836",
    },
    SeedProduct {
        name: "Bluetooth Speaker",
        description: "Portable bluetooth speaker",
        price: 150_000,
        stock: 8,
        image_url: "https://picsum.photos/id/28/4928/3264",
    },
    SeedProduct {
        name: "USB-C Hub",
        description: "Multiport USB-C hub",
        price: 110_000,
        stock: 25,
        image_url: "https://picsum.photos/id/29/4000/2670",
    },
    SeedProduct {
        name: "Noise Cancelling Earbuds",
        description: "In-ear noise cancelling earbuds",
        price: 200_000,
        stock: 18,
        image_url: "https://picsum.photos/id/5/5000/3334",
    },
];

/// Inserts the demo catalog unless the store already has products.
/// Returns how many products were inserted.
pub async fn seed_catalog(products: &dyn ProductRepository) -> RepositoryResult<usize> {
    if !products.find_all().await?.is_empty() {
        tracing::info!("Products already seeded");
        return Ok(0);
    }

    for seed in CATALOG.iter() {
        let product = Product::new(
            seed.name,
            Some(seed.description.to_string()),
            BigDecimal::from(seed.price),
            seed.stock,
            Some(seed.image_url.to_string()),
        )?;
        products.create(&product).await?;
    }

    tracing::info!(count = CATALOG.len(), "Seeded demo catalog");
    Ok(CATALOG.len())
}
