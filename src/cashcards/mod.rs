mod dto;
pub mod handlers;
pub mod memory;
pub mod paging;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryCashCardStore;
pub use repo::{CashCardStore, PgCashCardStore};
pub use repo_types::NewCashCard;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
