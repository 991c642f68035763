//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::postgres_delivery_repository::{insert_delivery, DeliveryRow};
use crate::domain::{Delivery, Transaction, TransactionRecord, TransactionStatus};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

const COLUMNS: &str = "id, transaction_no, product_id, customer_id, status, amount, base_fee, \
    delivery_fee, total_amount, gateway_transaction_id, gateway_reference, card_brand, \
    card_last_four, version, created_at, updated_at";

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, bind: Option<Uuid>) -> RepositoryResult<Vec<Transaction>> {
        let mut query = sqlx::query_as::<_, TransactionRow>(sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn create_with_delivery(
        &self,
        transaction: &Transaction,
        delivery: &Delivery,
    ) -> RepositoryResult<(Transaction, Delivery)> {
        let mut db_tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transactions ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {COLUMNS}"
        ))
        .bind(transaction.id())
        .bind(transaction.transaction_no())
        .bind(transaction.product_id())
        .bind(transaction.customer_id())
        .bind(transaction.status().as_str())
        .bind(transaction.amount())
        .bind(transaction.base_fee())
        .bind(transaction.delivery_fee())
        .bind(transaction.total_amount())
        .bind(transaction.gateway_transaction_id())
        .bind(transaction.gateway_reference())
        .bind(transaction.card_brand())
        .bind(transaction.card_last_four())
        .bind(transaction.version())
        .bind(transaction.created_at())
        .bind(transaction.updated_at())
        .fetch_one(&mut *db_tx)
        .await
        .map_err(RepositoryError::from)?;

        let delivery_row: DeliveryRow = insert_delivery(&mut db_tx, delivery).await?;

        // Dropping `db_tx` on an early return rolls both inserts back.
        db_tx.commit().await.map_err(RepositoryError::from)?;

        Ok((row.into_domain()?, delivery_row.into_domain()?))
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn find_by_transaction_no(
        &self,
        number: &str,
    ) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM transactions WHERE transaction_no = $1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(TransactionRow::into_domain).transpose()
    }

    async fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        self.fetch_many(
            &format!(
                "SELECT {COLUMNS} FROM transactions WHERE customer_id = $1 \
                 ORDER BY created_at DESC"
            ),
            Some(customer_id),
        )
        .await
    }

    async fn find_pending_by_customer_id(
        &self,
        customer_id: Uuid,
    ) -> RepositoryResult<Vec<Transaction>> {
        self.fetch_many(
            &format!(
                "SELECT {COLUMNS} FROM transactions WHERE customer_id = $1 AND status = 'PENDING' \
                 ORDER BY created_at DESC"
            ),
            Some(customer_id),
        )
        .await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Transaction>> {
        self.fetch_many(
            &format!("SELECT {COLUMNS} FROM transactions ORDER BY created_at DESC"),
            None,
        )
        .await
    }

    async fn update(&self, transaction: &Transaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions SET status = $3, gateway_transaction_id = $4, \
             gateway_reference = $5, card_brand = $6, card_last_four = $7, updated_at = $8, \
             version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {COLUMNS}"
        ))
        .bind(transaction.id())
        .bind(transaction.version())
        .bind(transaction.status().as_str())
        .bind(transaction.gateway_transaction_id())
        .bind(transaction.gateway_reference())
        .bind(transaction.card_brand())
        .bind(transaction.card_last_four())
        .bind(transaction.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if let Some(row) = row {
            return row.into_domain();
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
                .bind(transaction.id())
                .fetch_one(&self.pool)
                .await
                .map_err(RepositoryError::from)?;

        if exists {
            Err(RepositoryError::Conflict(format!("transaction {}", transaction.id())))
        } else {
            Err(RepositoryError::NotFound(format!("transaction {}", transaction.id())))
        }
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    transaction_no: String,
    product_id: Uuid,
    customer_id: Uuid,
    status: String,
    amount: BigDecimal,
    base_fee: BigDecimal,
    delivery_fee: BigDecimal,
    total_amount: BigDecimal,
    gateway_transaction_id: Option<String>,
    gateway_reference: Option<String>,
    card_brand: Option<String>,
    card_last_four: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let status: TransactionStatus = self.status.parse()?;
        Ok(Transaction::restore(TransactionRecord {
            id: self.id,
            transaction_no: self.transaction_no,
            product_id: self.product_id,
            customer_id: self.customer_id,
            status,
            amount: self.amount,
            base_fee: self.base_fee,
            delivery_fee: self.delivery_fee,
            total_amount: self.total_amount,
            gateway_transaction_id: self.gateway_transaction_id,
            gateway_reference: self.gateway_reference,
            card_brand: self.card_brand,
            card_last_four: self.card_last_four,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })?)
    }
}
