use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    ranking,
    storage::{ItemTally, Storage, StorageRead},
    types::{FavoriteOutcome, LedgerError},
};

use super::{
    auth::require_admin,
    models::{
        AddItemsRequest, AddItemsResponse, ConflictResponse, ErrorResponse, ExportResponse,
        FavoriteResponse, FavoriteStatus, GalleryQuery, GalleryResponse, HealthResponse,
        ItemResponse, ItemsResponse, LeaderboardQuery, LeaderboardResponse, LikeResponse,
        RankedItemResponse, RemovedResponse, SetFavoriteRequest, SetFavoriteResponse,
        SwitchFavoriteRequest, VoteRowResponse, VoterTallyResponse,
    },
    AppState,
};

fn ledger_error_response(context: &str, err: LedgerError) -> Response {
    match err {
        LedgerError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                message: format!("unknown item: {id}"),
            }),
        )
            .into_response(),
        LedgerError::Conflict { current } => (
            StatusCode::CONFLICT,
            Json(ConflictResponse {
                message: "favorite changed since the confirmation was issued".to_string(),
                current_item_id: current,
            }),
        )
            .into_response(),
        LedgerError::EmptyVoterKey
        | LedgerError::EmptyReference
        | LedgerError::InvalidReference(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: err.to_string(),
            }),
        )
            .into_response(),
        LedgerError::Storage(msg) => {
            log::error!("{}: storage failure: {}", context, msg);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn ranked_to_response(tally: &ItemTally) -> RankedItemResponse {
    RankedItemResponse {
        item_id: tally.item_id,
        reference: tally.reference.clone(),
        favorite_count: tally.favorite_count,
        like_count: tally.like_count,
    }
}

pub async fn health<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn list_items<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    match state.catalog.list_items() {
        Ok(items) => Json(ItemsResponse {
            items: items
                .into_iter()
                .map(|item| ItemResponse {
                    id: item.id,
                    reference: item.reference,
                })
                .collect(),
        })
        .into_response(),
        Err(err) => ledger_error_response("list items", err),
    }
}

pub async fn add_items<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(req): Json<AddItemsRequest>,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    match state.catalog.add_references(&req.references) {
        Ok(ids) => {
            log::info!("Added {} catalog items", ids.len());
            (StatusCode::CREATED, Json(AddItemsResponse { ids })).into_response()
        }
        Err(err) => ledger_error_response("add items", err),
    }
}

pub async fn delete_item<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(item_id): Path<i64>,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    match state.catalog.remove_item(item_id) {
        Ok(true) => {
            log::info!("Deleted catalog item {}", item_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => ledger_error_response("delete item", err),
    }
}

pub async fn wipe_items<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    match state.catalog.wipe() {
        Ok(()) => {
            log::info!("Wiped catalog and votes");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => ledger_error_response("wipe catalog", err),
    }
}

pub async fn toggle_like<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path((voter_key, item_id)): Path<(String, i64)>,
) -> Response {
    match state.ledger.toggle_like(&voter_key, item_id) {
        Ok(liked) => Json(LikeResponse { item_id, liked }).into_response(),
        Err(err) => ledger_error_response("toggle like", err),
    }
}

pub async fn get_favorite<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(voter_key): Path<String>,
) -> Response {
    match state.ledger.get_favorite(&voter_key) {
        Ok(item_id) => Json(FavoriteResponse { item_id }).into_response(),
        Err(err) => ledger_error_response("get favorite", err),
    }
}

pub async fn set_favorite<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(voter_key): Path<String>,
    Json(req): Json<SetFavoriteRequest>,
) -> Response {
    match state.ledger.set_favorite(&voter_key, req.item_id) {
        Ok(FavoriteOutcome::Favorited) => Json(SetFavoriteResponse {
            status: FavoriteStatus::Favorited,
            current_item_id: None,
        })
        .into_response(),
        Ok(FavoriteOutcome::Unfavorited) => Json(SetFavoriteResponse {
            status: FavoriteStatus::Unfavorited,
            current_item_id: None,
        })
        .into_response(),
        Ok(FavoriteOutcome::NeedsConfirmation { current }) => Json(SetFavoriteResponse {
            status: FavoriteStatus::NeedsConfirmation,
            current_item_id: Some(current),
        })
        .into_response(),
        Err(err) => ledger_error_response("set favorite", err),
    }
}

pub async fn switch_favorite<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(voter_key): Path<String>,
    Json(req): Json<SwitchFavoriteRequest>,
) -> Response {
    match state
        .ledger
        .confirm_switch_favorite(&voter_key, req.new_item_id, req.old_item_id)
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ledger_error_response("switch favorite", err),
    }
}

pub async fn remove_voter<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(voter_key): Path<String>,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    match state.ledger.remove_voter(&voter_key) {
        Ok(removed) => {
            log::info!("Removed {} vote rows for voter {}", removed, voter_key);
            Json(RemovedResponse { removed }).into_response()
        }
        Err(err) => ledger_error_response("remove voter", err),
    }
}

pub async fn clear_votes<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    match state.ledger.clear_all() {
        Ok(()) => {
            log::info!("Cleared every vote row");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => ledger_error_response("clear votes", err),
    }
}

pub async fn gallery<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<GalleryQuery>,
) -> Response {
    let tallies = match state.storage.tally_items() {
        Ok(tallies) => tallies,
        Err(err) => {
            log::error!("Failed to tally items for gallery: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let ranked = ranking::rank(tallies);
    let (page, slice) = ranking::page(&ranked, query.page.unwrap_or(0), state.page_size);
    Json(GalleryResponse {
        page,
        page_count: ranking::page_count(ranked.len(), state.page_size),
        items: slice.iter().map(ranked_to_response).collect(),
    })
    .into_response()
}

pub async fn leaderboard<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<LeaderboardQuery>,
) -> Response {
    let tallies = match state.storage.tally_items() {
        Ok(tallies) => tallies,
        Err(err) => {
            log::error!("Failed to tally items for leaderboard: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let ranked = ranking::rank(tallies);
    let top = ranking::top_n(&ranked, query.limit.unwrap_or(10));
    Json(LeaderboardResponse {
        items: top.iter().map(ranked_to_response).collect(),
    })
    .into_response()
}

pub async fn export<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    if let Err(err) = require_admin(&state.admin_secret, &headers) {
        return err.into_response();
    }
    let voters = match state.storage.tally_voters() {
        Ok(voters) => voters,
        Err(err) => {
            log::error!("Failed to tally voters for export: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let votes = match state.storage.list_votes() {
        Ok(votes) => votes,
        Err(err) => {
            log::error!("Failed to list votes for export: {:?}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    Json(ExportResponse {
        voters: voters
            .into_iter()
            .map(|v| VoterTallyResponse {
                voter_key: v.voter_key,
                liked_count: v.liked_count,
                favorite_count: v.favorite_count,
            })
            .collect(),
        votes: votes
            .into_iter()
            .map(|v| VoteRowResponse {
                voter_key: v.voter_key,
                item_id: v.item_id,
                liked: v.liked,
                is_favorite: v.is_favorite,
            })
            .collect(),
    })
    .into_response()
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "no such route".to_string(),
        }),
    )
}
