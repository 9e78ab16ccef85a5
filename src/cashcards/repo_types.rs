use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Cash card row, also the JSON shape returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CashCard {
    pub id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub owner: String,
}

/// A card that has not been stored yet; the store picks the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashCard {
    pub amount: Decimal,
    pub owner: String,
}
