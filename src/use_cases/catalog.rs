//! Product catalog use cases.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde::Serialize;
use uuid::Uuid;

use super::error::{UseCaseError, UseCaseResult};
use crate::domain::Product;
use crate::ports::ProductRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            name: product.name().to_string(),
            description: product.description().map(str::to_string),
            price: product.price().clone(),
            stock_quantity: product.stock_quantity(),
            image_url: product.image_url().map(str::to_string),
        }
    }
}

/// Lists products that are active and in stock.
pub struct ListProducts {
    products: Arc<dyn ProductRepository>,
}

impl ListProducts {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn execute(&self) -> UseCaseResult<Vec<ProductView>> {
        let products = self.products.find_all_available().await?;
        Ok(products.iter().map(ProductView::from).collect())
    }
}

pub struct GetProduct {
    products: Arc<dyn ProductRepository>,
}

impl GetProduct {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn execute(&self, product_id: Uuid) -> UseCaseResult<ProductView> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or(UseCaseError::ProductNotFound)?;

        if !product.is_active() {
            return Err(UseCaseError::ProductInactive);
        }

        Ok(ProductView::from(&product))
    }
}
