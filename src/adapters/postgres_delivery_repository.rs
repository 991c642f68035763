//! Postgres implementation of DeliveryRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::{Delivery, DeliveryDetails, DeliveryRecord};
use crate::ports::{DeliveryRepository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, transaction_id, full_name, phone, address, city, state, postal_code, \
    created_at, updated_at";

#[derive(Clone)]
pub struct PostgresDeliveryRepository {
    pool: PgPool,
}

impl PostgresDeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Inserts a delivery inside an open SQL transaction. Used by the
/// transaction repository so both rows commit together.
pub(crate) async fn insert_delivery(
    db_tx: &mut sqlx::Transaction<'_, Postgres>,
    delivery: &Delivery,
) -> RepositoryResult<DeliveryRow> {
    sqlx::query_as::<_, DeliveryRow>(&format!(
        "INSERT INTO deliveries ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {COLUMNS}"
    ))
    .bind(delivery.id())
    .bind(delivery.transaction_id())
    .bind(delivery.full_name())
    .bind(delivery.phone())
    .bind(delivery.address())
    .bind(delivery.city())
    .bind(delivery.state())
    .bind(delivery.postal_code())
    .bind(delivery.created_at())
    .bind(delivery.updated_at())
    .fetch_one(&mut **db_tx)
    .await
    .map_err(RepositoryError::from)
}

#[async_trait]
impl DeliveryRepository for PostgresDeliveryRepository {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Delivery>> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {COLUMNS} FROM deliveries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(DeliveryRow::into_domain).transpose()
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: Uuid,
    ) -> RepositoryResult<Option<Delivery>> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {COLUMNS} FROM deliveries WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(DeliveryRow::into_domain).transpose()
    }

    async fn update(&self, delivery: &Delivery) -> RepositoryResult<Delivery> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "UPDATE deliveries SET full_name = $2, phone = $3, address = $4, city = $5, \
             state = $6, postal_code = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(delivery.id())
        .bind(delivery.full_name())
        .bind(delivery.phone())
        .bind(delivery.address())
        .bind(delivery.city())
        .bind(delivery.state())
        .bind(delivery.postal_code())
        .bind(delivery.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("delivery {}", delivery.id())))?
            .into_domain()
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM deliveries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("delivery {}", id)));
        }
        Ok(())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapters.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DeliveryRow {
    id: Uuid,
    transaction_id: Uuid,
    full_name: String,
    phone: String,
    address: String,
    city: String,
    state: String,
    postal_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeliveryRow {
    pub(crate) fn into_domain(self) -> RepositoryResult<Delivery> {
        Ok(Delivery::restore(DeliveryRecord {
            id: self.id,
            transaction_id: self.transaction_id,
            details: DeliveryDetails {
                full_name: self.full_name,
                phone: self.phone,
                address: self.address,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })?)
    }
}
