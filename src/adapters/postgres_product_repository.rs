//! Postgres implementation of ProductRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Product, ProductRecord};
use crate::ports::{ProductRepository, RepositoryError, RepositoryResult};

const COLUMNS: &str =
    "id, name, description, price, stock_quantity, image_url, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(&self, product: &Product) -> RepositoryResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        ))
        .bind(product.id())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock_quantity())
        .bind(product.image_url())
        .bind(product.is_active())
        .bind(product.created_at())
        .bind(product.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(ProductRow::into_domain).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    async fn find_all_available(&self) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products \
             WHERE is_active = TRUE AND stock_quantity > 0 \
             ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $2, description = $3, price = $4, stock_quantity = $5, \
             image_url = $6, is_active = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(product.id())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.stock_quantity())
        .bind(product.image_url())
        .bind(product.is_active())
        .bind(product.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("product {}", product.id())))?
            .into_domain()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: BigDecimal,
    stock_quantity: i32,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> RepositoryResult<Product> {
        Ok(Product::restore(ProductRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            image_url: self.image_url,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })?)
    }
}
