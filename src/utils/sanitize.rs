use serde_json::Value;

/// Masks card data, tokens and keys in JSON payloads before they are logged.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(key, val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .collect::<String>()
        .to_lowercase()
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        normalize(key).as_str(),
        "number"
            | "cardnumber"
            | "cvc"
            | "cardcvc"
            | "cvv"
            | "token"
            | "acceptancetoken"
            | "publickey"
            | "privatekey"
            | "integritykey"
            | "signature"
            | "password"
            | "authorization"
    )
}

/// Card numbers keep their last four digits; everything else is fully masked.
fn mask_value(key: &str, value: &Value) -> Value {
    let is_card_number = matches!(normalize(key).as_str(), "number" | "cardnumber");
    match value {
        Value::String(s) if is_card_number && s.len() > 4 => {
            let digits: String = s.chars().filter(|ch| !ch.is_whitespace()).collect();
            let last_four: String = digits.chars().skip(digits.chars().count().saturating_sub(4)).collect();
            Value::String(format!("****{}", last_four))
        }
        _ => Value::String("****".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_card_payload() {
        let input = json!({
            "transactionId": "5b1f6e0c",
            "cardData": {
                "number": "4242 4242 4242 4242",
                "cvc": "123",
                "expMonth": "08",
                "cardHolder": "Pedro Perez"
            }
        });

        let sanitized = sanitize_json(&input);

        assert_eq!(sanitized["cardData"]["number"], "****4242");
        assert_eq!(sanitized["cardData"]["cvc"], "****");
        assert_eq!(sanitized["cardData"]["expMonth"], "08");
        assert_eq!(sanitized["cardData"]["cardHolder"], "Pedro Perez");
        assert_eq!(sanitized["transactionId"], "5b1f6e0c");
    }

    #[test]
    fn test_sanitize_keys_and_tokens() {
        let input = json!({
            "acceptance_token": "eyJhbGciOiJIUzI1NiJ9.payload.sig",
            "private-key": "prv_test_abc",
            "items": [{ "token": "tok_test_123" }]
        });

        let sanitized = sanitize_json(&input);

        assert_eq!(sanitized["acceptance_token"], "****");
        assert_eq!(sanitized["private-key"], "****");
        assert_eq!(sanitized["items"][0]["token"], "****");
    }

    #[test]
    fn test_sanitize_flat_payment_request() {
        let input = json!({
            "cardNumber": "4242424242424242",
            "cardCvc": "123",
            "cardHolder": "Ana Gomez"
        });

        let sanitized = sanitize_json(&input);

        assert_eq!(sanitized["cardNumber"], "****4242");
        assert_eq!(sanitized["cardCvc"], "****");
        assert_eq!(sanitized["cardHolder"], "Ana Gomez");
    }

    #[test]
    fn test_short_card_number_is_fully_masked() {
        let sanitized = sanitize_json(&json!({ "number": "42" }));
        assert_eq!(sanitized["number"], "****");
    }
}
