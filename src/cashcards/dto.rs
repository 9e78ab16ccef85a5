use rust_decimal::Decimal;
use serde::Deserialize;

/// Body of `POST /cashcards` and `PUT /cashcards/{id}`. `id` and `owner`
/// are accepted so full records can be posted back, but never used.
#[derive(Debug, Deserialize)]
pub struct CashCardRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub owner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_amount_only() {
        let body: CashCardRequest = serde_json::from_str(r#"{"amount":200.00}"#).unwrap();
        assert_eq!(body.amount, Decimal::new(200, 0));
        assert!(body.id.is_none());
        assert!(body.owner.is_none());
    }

    #[test]
    fn accepts_full_record() {
        let body: CashCardRequest =
            serde_json::from_str(r#"{"id":7,"amount":-1.5,"owner":"mallory"}"#).unwrap();
        assert_eq!(body.id, Some(7));
        assert_eq!(body.amount, Decimal::new(-15, 1));
        assert_eq!(body.owner.as_deref(), Some("mallory"));
    }

    #[test]
    fn rejects_missing_amount() {
        assert!(serde_json::from_str::<CashCardRequest>(r#"{"owner":"x"}"#).is_err());
    }
}
