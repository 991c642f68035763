mod common;

use bigdecimal::BigDecimal;
use checkout_core::domain::TransactionStatus;
use checkout_core::ports::{DeliveryRepository, GatewayStatus, ProductRepository};
use checkout_core::use_cases::UseCaseError;
use common::{order, FakeGateway, TestContext};
use std::sync::atomic::Ordering;
use uuid::Uuid;

#[tokio::test]
async fn test_pending_transaction_with_fee_breakdown() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(100_000, 10).await;

    let output = ctx
        .create_transaction()
        .execute(order("buyer@example.com", product.id(), 2))
        .await
        .unwrap();

    assert_eq!(output.status, TransactionStatus::Pending);
    assert_eq!(output.total_amount, BigDecimal::from(215_000));
    assert!(output.transaction_no.starts_with("TXN-"));

    let stored = ctx.transaction(output.transaction_id).await;
    assert_eq!(stored.amount(), &BigDecimal::from(200_000));
    assert_eq!(stored.base_fee(), &BigDecimal::from(5_000));
    assert_eq!(stored.delivery_fee(), &BigDecimal::from(10_000));
    assert_eq!(stored.version(), 0);

    let delivery = ctx
        .repos
        .deliveries
        .find_by_transaction_id(output.transaction_id)
        .await
        .unwrap()
        .expect("delivery stored with the transaction");
    assert_eq!(delivery.city(), "Bogota");

    // creating an order never touches stock
    assert_eq!(ctx.product(product.id()).await.stock_quantity(), 10);
}

#[tokio::test]
async fn test_returning_customer_with_same_details_is_not_rewritten() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(50_000, 10).await;
    let create = ctx.create_transaction();

    create
        .execute(order("buyer@example.com", product.id(), 1))
        .await
        .unwrap();
    assert_eq!(ctx.customers.creates.load(Ordering::SeqCst), 1);

    create
        .execute(order("buyer@example.com", product.id(), 1))
        .await
        .unwrap();

    assert_eq!(ctx.customers.creates.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.customers.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_returning_customer_with_new_name_is_updated_once() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(50_000, 10).await;
    let create = ctx.create_transaction();

    create
        .execute(order("buyer@example.com", product.id(), 1))
        .await
        .unwrap();

    let mut renamed = order("buyer@example.com", product.id(), 1);
    renamed.customer_full_name = "Ana Maria Gomez".to_string();
    create.execute(renamed).await.unwrap();

    assert_eq!(ctx.customers.creates.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.customers.updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_product() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));

    let err = ctx
        .create_transaction()
        .execute(order("buyer@example.com", Uuid::new_v4(), 1))
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::ProductNotFound));
    assert_eq!(err.to_string(), "Product not found");
}

#[tokio::test]
async fn test_inactive_product_is_not_available() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let mut product = ctx.add_product(50_000, 10).await;
    product.deactivate();
    ctx.repos.products.update(&product).await.unwrap();

    let err = ctx
        .create_transaction()
        .execute(order("buyer@example.com", product.id(), 1))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Product not available");
}

#[tokio::test]
async fn test_quantity_above_stock() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(50_000, 3).await;

    let err = ctx
        .create_transaction()
        .execute(order("buyer@example.com", product.id(), 4))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Insufficient stock");
    assert_eq!(ctx.product(product.id()).await.stock_quantity(), 3);
}

#[tokio::test]
async fn test_invalid_customer_email_is_rejected() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(50_000, 3).await;

    let err = ctx
        .create_transaction()
        .execute(order("not-an-email", product.id(), 1))
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::Invalid(_)));
    assert_eq!(err.to_string(), "Customer email is invalid");
}
