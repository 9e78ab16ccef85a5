use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::{
    dto::CashCardRequest,
    paging::{PageParams, PageRequest},
    repo_types::{CashCard, NewCashCard},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashcards", get(list_cash_cards).post(create_cash_card))
        .route(
            "/cashcards/:id",
            get(get_cash_card)
                .put(update_cash_card)
                .delete(delete_cash_card),
        )
}

#[instrument(skip(state))]
pub async fn get_cash_card(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<CashCard>> {
    match state.cards.find_by_id_and_owner(id, &owner).await? {
        Some(card) => Ok(Json(card)),
        None => {
            debug!(%owner, id, "cash card not found for owner");
            Err(ApiError::NotFound)
        }
    }
}

#[instrument(skip(state, body))]
pub async fn create_cash_card(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Json(body): Json<CashCardRequest>,
) -> ApiResult<Json<CashCard>> {
    if body.id.is_some() || body.owner.is_some() {
        debug!(%owner, "ignoring client supplied id/owner on create");
    }

    let card = state
        .cards
        .create(NewCashCard {
            amount: body.amount,
            owner,
        })
        .await?;

    info!(owner = %card.owner, id = card.id, "cash card created");
    Ok(Json(card))
}

#[instrument(skip(state))]
pub async fn list_cash_cards(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<CashCard>>> {
    let params = PageParams::from_pairs(query);
    let page = PageRequest::from_params(&params, &state.config.paging)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cards = state.cards.find_page(Some(&owner), &page).await?;
    Ok(Json(cards))
}

#[instrument(skip(state, body))]
pub async fn update_cash_card(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<CashCardRequest>,
) -> ApiResult<StatusCode> {
    let Some(existing) = state.cards.find_by_id_and_owner(id, &owner).await? else {
        debug!(%owner, id, "update target not found for owner");
        return Err(ApiError::NotFound);
    };

    let updated = CashCard {
        id: existing.id,
        amount: body.amount,
        owner: existing.owner,
    };
    // Deleted between lookup and write: same answer as a missing card.
    if !state.cards.update(&updated).await? {
        return Err(ApiError::NotFound);
    }

    info!(%owner, id, "cash card updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_cash_card(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.cards.exists_by_id_and_owner(id, &owner).await? {
        debug!(%owner, id, "delete target not found for owner");
        return Err(ApiError::NotFound);
    }

    if !state.cards.delete_by_id(id).await? {
        return Err(ApiError::NotFound);
    }

    info!(%owner, id, "cash card deleted");
    Ok(StatusCode::NO_CONTENT)
}
