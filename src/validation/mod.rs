use std::fmt;

use crate::domain::customer::is_valid_email;

pub const CARD_NUMBER_MIN_LEN: usize = 13;
pub const CARD_NUMBER_MAX_LEN: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Required text whose sanitized length lies in `min..=max`.
pub fn validate_len_between(
    field: &'static str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> ValidationResult {
    let value = sanitize_string(value);
    validate_required(field, &value)?;

    if value.chars().count() < min_len {
        return Err(ValidationError::new(
            field,
            format!("must be at least {} characters", min_len),
        ));
    }

    validate_max_len(field, &value, max_len)
}

pub fn validate_email(field: &'static str, value: &str) -> ValidationResult {
    validate_required(field, value)?;

    if !is_valid_email(value.trim()) {
        return Err(ValidationError::new(field, "must be a valid email address"));
    }

    Ok(())
}

pub fn validate_min(field: &'static str, value: i32, min: i32) -> ValidationResult {
    if value < min {
        return Err(ValidationError::new(field, format!("must be at least {}", min)));
    }

    Ok(())
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

/// Accepts grouped numbers such as `4242 4242 4242 4242`.
pub fn validate_card_number(value: &str) -> ValidationResult {
    let digits: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();

    if !all_digits(&digits) {
        return Err(ValidationError::new("cardNumber", "must contain only digits"));
    }

    if !(CARD_NUMBER_MIN_LEN..=CARD_NUMBER_MAX_LEN).contains(&digits.len()) {
        return Err(ValidationError::new(
            "cardNumber",
            format!(
                "must have between {} and {} digits",
                CARD_NUMBER_MIN_LEN, CARD_NUMBER_MAX_LEN
            ),
        ));
    }

    Ok(())
}

pub fn validate_exp_month(value: &str) -> ValidationResult {
    let value = value.trim();
    let month = if all_digits(value) && value.len() <= 2 {
        value.parse::<u8>().ok()
    } else {
        None
    };

    match month {
        Some(1..=12) => Ok(()),
        _ => Err(ValidationError::new("cardExpMonth", "must be between 01 and 12")),
    }
}

pub fn validate_exp_year(value: &str) -> ValidationResult {
    let value = value.trim();
    if value.len() != 2 || !all_digits(value) {
        return Err(ValidationError::new("cardExpYear", "must be two digits"));
    }

    Ok(())
}

pub fn validate_cvc(value: &str) -> ValidationResult {
    let value = value.trim();
    if !(3..=4).contains(&value.len()) || !all_digits(value) {
        return Err(ValidationError::new("cardCvc", "must be 3 or 4 digits"));
    }

    Ok(())
}
