use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    paging::{compare_cards, PageRequest},
    repo::CashCardStore,
    repo_types::{CashCard, NewCashCard},
};

#[derive(Default)]
struct Inner {
    last_id: i64,
    cards: BTreeMap<i64, CashCard>,
}

/// Process-local store used by `STORE_BACKEND=memory` and the tests.
/// Ids come from a counter that deletes never rewind.
#[derive(Default)]
pub struct MemoryCashCardStore {
    inner: RwLock<Inner>,
}

impl MemoryCashCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CashCardStore for MemoryCashCardStore {
    async fn create(&self, card: NewCashCard) -> anyhow::Result<CashCard> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let stored = CashCard {
            id: inner.last_id,
            amount: card.amount,
            owner: card.owner,
        };
        inner.cards.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<CashCard>> {
        Ok(self.inner.read().await.cards.get(&id).cloned())
    }

    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<Option<CashCard>> {
        let inner = self.inner.read().await;
        Ok(inner.cards.get(&id).filter(|c| c.owner == owner).cloned())
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> anyhow::Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.cards.get(&id).is_some_and(|c| c.owner == owner))
    }

    async fn update(&self, card: &CashCard) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.cards.get_mut(&card.id) {
            Some(stored) => {
                stored.amount = card.amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.write().await.cards.remove(&id).is_some())
    }

    async fn find_page(
        &self,
        owner: Option<&str>,
        page: &PageRequest,
    ) -> anyhow::Result<Vec<CashCard>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<CashCard> = inner
            .cards
            .values()
            .filter(|c| owner.map_or(true, |o| c.owner == o))
            .cloned()
            .collect();
        let orders = page.effective_sort();
        rows.sort_by(|a, b| compare_cards(&orders, a, b));

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(0);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }
}
