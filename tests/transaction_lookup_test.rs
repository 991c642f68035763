mod common;

use std::time::Duration;

use checkout_core::domain::TransactionStatus;
use checkout_core::ports::{DeliveryRepository, GatewayStatus};
use checkout_core::use_cases::UseCaseError;
use checkout_core::AppState;
use common::{order, FakeGateway, TestContext, GATEWAY_TX_ID};
use uuid::Uuid;

fn lookups(ctx: &TestContext) -> AppState {
    ctx.app_state()
}

#[tokio::test]
async fn test_recover_returns_most_recent_pending() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(80_000, 10).await;

    let older = ctx.pending_order(&product, 1).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = ctx.pending_order(&product, 2).await;

    let recovered = lookups(&ctx)
        .recover_transaction()
        .execute("buyer@example.com")
        .await
        .unwrap();

    assert_ne!(recovered.transaction.id, older.transaction_id);
    assert_eq!(recovered.transaction.id, newer.transaction_id);
    assert_eq!(recovered.transaction.status, TransactionStatus::Pending);
    assert_eq!(recovered.product.name, "Wireless Headphones");
    assert_eq!(recovered.delivery.city, "Bogota");
    assert_eq!(recovered.delivery.address, "Calle 123 #45-67");
}

#[tokio::test]
async fn test_recover_skips_settled_transactions() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(80_000, 10).await;

    let pending = ctx.pending_order(&product, 1).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let paid = ctx.pending_order(&product, 1).await;
    ctx.pay(paid.transaction_id).await.unwrap();

    let recovered = lookups(&ctx)
        .recover_transaction()
        .execute("buyer@example.com")
        .await
        .unwrap();

    assert_eq!(recovered.transaction.id, pending.transaction_id);
}

#[tokio::test]
async fn test_recover_without_pending_transactions() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(80_000, 10).await;
    let paid = ctx.pending_order(&product, 1).await;
    ctx.pay(paid.transaction_id).await.unwrap();

    let state = lookups(&ctx);

    let err = state
        .recover_transaction()
        .execute("buyer@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, UseCaseError::NoPendingTransaction));
    assert_eq!(err.to_string(), "No pending transactions found for this email");

    let err = state
        .recover_transaction()
        .execute("stranger@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, UseCaseError::NoPendingTransaction));
}

#[tokio::test]
async fn test_recover_without_delivery() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(80_000, 10).await;
    let pending = ctx.pending_order(&product, 1).await;

    let delivery = ctx
        .repos
        .deliveries
        .find_by_transaction_id(pending.transaction_id)
        .await
        .unwrap()
        .unwrap();
    ctx.repos.deliveries.delete(delivery.id()).await.unwrap();

    let err = lookups(&ctx)
        .recover_transaction()
        .execute("buyer@example.com")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Delivery not found");
}

#[tokio::test]
async fn test_detail_of_pending_transaction_has_no_payment() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(100_000, 10).await;
    let pending = ctx
        .create_transaction()
        .execute(order("buyer@example.com", product.id(), 2))
        .await
        .unwrap();

    let detail = lookups(&ctx)
        .get_transaction()
        .execute(pending.transaction_id)
        .await
        .unwrap();

    assert_eq!(detail.transaction.transaction_no, pending.transaction_no);
    assert_eq!(detail.transaction.total_amount, pending.total_amount);
    assert_eq!(detail.customer.email, "buyer@example.com");
    assert_eq!(detail.product.id, product.id());
    assert_eq!(detail.delivery.postal_code.as_deref(), Some("110111"));
    assert!(detail.payment.is_none());
}

#[tokio::test]
async fn test_detail_of_approved_transaction_has_payment() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));
    let product = ctx.add_product(100_000, 10).await;
    let pending = ctx.pending_order(&product, 1).await;
    ctx.pay(pending.transaction_id).await.unwrap();

    let detail = lookups(&ctx)
        .get_transaction()
        .execute(pending.transaction_id)
        .await
        .unwrap();

    let payment = detail.payment.expect("payment section for a charged card");
    assert_eq!(payment.card_brand, "VISA");
    assert_eq!(payment.card_last_four, "4242");
    assert_eq!(payment.gateway_transaction_id, GATEWAY_TX_ID);
    assert_eq!(payment.gateway_reference, "gw-ref-001");
    assert_eq!(detail.transaction.status, TransactionStatus::Approved);
}

#[tokio::test]
async fn test_detail_of_unknown_transaction() {
    let ctx = TestContext::new(FakeGateway::settling(GatewayStatus::Approved));

    let err = lookups(&ctx)
        .get_transaction()
        .execute(Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, UseCaseError::TransactionNotFound));
}
