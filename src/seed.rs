use rust_decimal::Decimal;
use tracing::info;

use crate::{auth::password::hash_password, cashcards::NewCashCard, state::AppState};

const DEMO_USERS: [(&str, &str); 2] = [("sarah1", "abc123"), ("kumar2", "xyz789")];

/// (owner, amount in cents)
const DEMO_CARDS: [(&str, i64); 4] = [
    ("sarah1", 12345),
    ("sarah1", 100),
    ("sarah1", 15000),
    ("kumar2", 20000),
];

/// Inserts the demo users and cards unless `sarah1` already exists.
pub async fn seed_demo_data(state: &AppState) -> anyhow::Result<bool> {
    if state.users.find_by_username(DEMO_USERS[0].0).await?.is_some() {
        info!("demo data already present");
        return Ok(false);
    }

    for (username, password) in DEMO_USERS {
        let hash = hash_password(password)?;
        state.users.create(username, &hash).await?;
    }

    for (owner, cents) in DEMO_CARDS {
        state
            .cards
            .create(NewCashCard {
                amount: Decimal::new(cents, 2),
                owner: owner.to_string(),
            })
            .await?;
    }

    info!(users = DEMO_USERS.len(), cards = DEMO_CARDS.len(), "demo data seeded");
    Ok(true)
}
