use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    paging::PageRequest,
    repo_types::{CashCard, NewCashCard},
};

/// Persistent storage for cash cards.
///
/// Only `find_by_id_and_owner`, `exists_by_id_and_owner` and an owner-scoped
/// `find_page` enforce ownership. `find_by_id` and `delete_by_id` are
/// primary-key primitives, so callers must check ownership first.
#[async_trait]
pub trait CashCardStore: Send + Sync {
    async fn create(&self, card: NewCashCard) -> anyhow::Result<CashCard>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<CashCard>>;
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<Option<CashCard>>;
    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<bool>;
    /// Replaces the amount of `card.id`. Returns false when no such row exists.
    async fn update(&self, card: &CashCard) -> anyhow::Result<bool>;
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool>;
    /// One page of cards; `owner = None` spans every owner.
    async fn find_page(
        &self,
        owner: Option<&str>,
        page: &PageRequest,
    ) -> anyhow::Result<Vec<CashCard>>;
}

#[derive(Clone)]
pub struct PgCashCardStore {
    db: PgPool,
}

impl PgCashCardStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CashCardStore for PgCashCardStore {
    async fn create(&self, card: NewCashCard) -> anyhow::Result<CashCard> {
        let row = sqlx::query_as::<_, CashCard>(
            r#"
            INSERT INTO cash_cards (amount, owner)
            VALUES ($1, $2)
            RETURNING id, amount, owner
            "#,
        )
        .bind(card.amount)
        .bind(&card.owner)
        .fetch_one(&self.db)
        .await
        .context("insert cash card")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<CashCard>> {
        let row = sqlx::query_as::<_, CashCard>(
            r#"
            SELECT id, amount, owner
              FROM cash_cards
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find cash card by id")?;
        Ok(row)
    }

    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<Option<CashCard>> {
        let row = sqlx::query_as::<_, CashCard>(
            r#"
            SELECT id, amount, owner
              FROM cash_cards
             WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("find cash card by id and owner")?;
        Ok(row)
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS (SELECT 1 FROM cash_cards WHERE id = $1 AND owner = $2)"#,
        )
        .bind(id)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .context("check cash card ownership")?;
        Ok(exists)
    }

    async fn update(&self, card: &CashCard) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"UPDATE cash_cards SET amount = $2 WHERE id = $1"#)
            .bind(card.id)
            .bind(card.amount)
            .execute(&self.db)
            .await
            .context("update cash card")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM cash_cards WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete cash card")?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_page(
        &self,
        owner: Option<&str>,
        page: &PageRequest,
    ) -> anyhow::Result<Vec<CashCard>> {
        // ORDER BY cannot be bound; the clause only contains whitelisted columns.
        let sql = format!(
            r#"
            SELECT id, amount, owner
              FROM cash_cards
             WHERE ($1::TEXT IS NULL OR owner = $1)
             ORDER BY {}
             LIMIT $2 OFFSET $3
            "#,
            page.order_by_clause()
        );
        let rows = sqlx::query_as::<_, CashCard>(&sql)
            .bind(owner)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.db)
            .await
            .context("list cash cards")?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cashcards::paging::PageParams, config::PagingConfig};
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    async fn store() -> PgCashCardStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to database");
        sqlx::migrate!("./migrations").run(&db).await.expect("migrations");
        PgCashCardStore::new(db)
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn crud_is_scoped_by_owner() {
        let store = store().await;
        let owner = format!("pg-test-{}", std::process::id());

        let card = store
            .create(NewCashCard {
                amount: Decimal::new(12345, 2),
                owner: owner.clone(),
            })
            .await
            .unwrap();
        assert_eq!(card.amount, Decimal::new(12345, 2));

        assert!(store.find_by_id_and_owner(card.id, &owner).await.unwrap().is_some());
        assert!(store.find_by_id_and_owner(card.id, "someone-else").await.unwrap().is_none());
        assert!(store.exists_by_id_and_owner(card.id, &owner).await.unwrap());

        let updated = CashCard {
            amount: Decimal::new(100000, 2),
            ..card.clone()
        };
        assert!(store.update(&updated).await.unwrap());
        assert_eq!(store.find_by_id(card.id).await.unwrap(), Some(updated));

        let page = PageRequest::from_params(&PageParams::default(), &PagingConfig::default()).unwrap();
        let rows = store.find_page(Some(&owner), &page).await.unwrap();
        assert_eq!(rows.len(), 1);

        assert!(store.delete_by_id(card.id).await.unwrap());
        assert!(!store.delete_by_id(card.id).await.unwrap());
    }
}
