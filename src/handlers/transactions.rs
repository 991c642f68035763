use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::DeliveryDetails;
use crate::error::AppError;
use crate::ports::CardData;
use crate::use_cases::{CreateTransactionInput, ProcessPaymentInput};
use crate::validation::{
    sanitize_string, validate_card_number, validate_cvc, validate_email, validate_exp_month,
    validate_exp_year, validate_len_between, validate_max_len, validate_min, validate_required,
    ValidationResult,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub customer_email: String,
    pub customer_full_name: String,
    pub customer_phone: Option<String>,
    pub product_id: Uuid,
    pub quantity: i32,
    pub delivery_full_name: String,
    pub delivery_phone: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_state: String,
    pub delivery_postal_code: Option<String>,
}

impl CreateTransactionRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_email("customerEmail", &self.customer_email)?;
        validate_len_between("customerFullName", &self.customer_full_name, 3, 100)?;
        if let Some(phone) = &self.customer_phone {
            validate_len_between("customerPhone", phone, 7, 20)?;
        }
        validate_min("quantity", self.quantity, 1)?;
        validate_len_between("deliveryFullName", &self.delivery_full_name, 3, 100)?;
        validate_len_between("deliveryPhone", &self.delivery_phone, 7, 20)?;
        validate_len_between("deliveryAddress", &self.delivery_address, 10, 200)?;
        validate_len_between("deliveryCity", &self.delivery_city, 3, 50)?;
        validate_len_between("deliveryState", &self.delivery_state, 3, 50)?;
        if let Some(postal_code) = &self.delivery_postal_code {
            validate_max_len("deliveryPostalCode", postal_code.trim(), 10)?;
        }
        Ok(())
    }

    fn into_input(self) -> CreateTransactionInput {
        CreateTransactionInput {
            customer_email: self.customer_email.trim().to_string(),
            customer_full_name: sanitize_string(&self.customer_full_name),
            customer_phone: self.customer_phone.map(|phone| sanitize_string(&phone)),
            product_id: self.product_id,
            quantity: self.quantity,
            delivery: DeliveryDetails {
                full_name: sanitize_string(&self.delivery_full_name),
                phone: sanitize_string(&self.delivery_phone),
                address: sanitize_string(&self.delivery_address),
                city: sanitize_string(&self.delivery_city),
                state: sanitize_string(&self.delivery_state),
                postal_code: self
                    .delivery_postal_code
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty()),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub card_number: String,
    pub card_exp_month: String,
    pub card_exp_year: String,
    pub card_cvc: String,
    pub card_holder: String,
}

impl ProcessPaymentRequest {
    pub fn validate(&self) -> ValidationResult {
        validate_card_number(&self.card_number)?;
        validate_exp_month(&self.card_exp_month)?;
        validate_exp_year(&self.card_exp_year)?;
        validate_cvc(&self.card_cvc)?;
        validate_required("cardHolder", &self.card_holder)?;
        Ok(())
    }

    fn into_card(self) -> CardData {
        CardData {
            number: self.card_number,
            exp_month: self.card_exp_month,
            exp_year: self.card_exp_year,
            cvc: self.card_cvc,
            card_holder: self.card_holder,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecoverQuery {
    pub email: String,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    request.validate()?;

    tracing::info!(customer_email = %request.customer_email, "Creating transaction");

    let output = state
        .create_transaction()
        .execute(request.into_input())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create transaction");
            e
        })?;

    tracing::info!(transaction_no = %output.transaction_no, "Transaction created");

    Ok((StatusCode::CREATED, Json(output)))
}

pub async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    request.validate()?;

    let input = ProcessPaymentInput {
        transaction_id: id,
        card: request.into_card(),
    };

    let output = state.process_payment().execute(input).await.map_err(|e| {
        tracing::error!(transaction_id = %id, error = %e, "Payment processing failed");
        e
    })?;

    Ok(Json(output))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.get_transaction().execute(id).await?;
    Ok(Json(detail))
}

pub async fn recover_transaction(
    State(state): State<AppState>,
    Query(query): Query<RecoverQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_email("email", &query.email)?;

    let recovered = state
        .recover_transaction()
        .execute(query.email.trim())
        .await?;

    Ok(Json(recovered))
}
