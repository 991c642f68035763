//! Postgres implementation of CustomerRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Customer, CustomerRecord};
use crate::ports::{CustomerRepository, RepositoryError, RepositoryResult};

const COLUMNS: &str = "id, email, full_name, phone, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn create(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO customers ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        ))
        .bind(customer.id())
        .bind(customer.email())
        .bind(customer.full_name())
        .bind(customer.phone())
        .bind(customer.created_at())
        .bind(customer.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(CustomerRow::into_domain).transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(CustomerRow::into_domain).transpose()
    }

    async fn update(&self, customer: &Customer) -> RepositoryResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "UPDATE customers SET full_name = $2, phone = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(customer.id())
        .bind(customer.full_name())
        .bind(customer.phone())
        .bind(customer.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("customer {}", customer.id())))?
            .into_domain()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    email: String,
    full_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_domain(self) -> RepositoryResult<Customer> {
        Ok(Customer::restore(CustomerRecord {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })?)
    }
}
