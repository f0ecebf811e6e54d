// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::{AppError, Result};
use crate::listing::commands::{
    self, AddCommentCommand, CreateListingCommand, PlaceBidCommand, ToggleWatchCommand,
};
use crate::query;
use crate::wiki::{render_markdown, EntryStore, FsEntryStore, SearchOutcome};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 라우터 공유 상태
pub type AppState = (Arc<DatabaseManager>, Arc<FsEntryStore>);

// region:    --- Commerce Command Handlers

/// 상품 등록 요청 처리
pub async fn handle_create_listing(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<CreateListingCommand>,
) -> Result<Response> {
    info!("{:<12} --> 상품 등록 요청 처리 시작: {:?}", "Command", cmd);
    let listing = commands::handle_create_listing(cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(listing)).into_response())
}

/// 입찰 요청 처리
pub async fn handle_bid(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Response> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let amount = cmd.amount;
    let updated = commands::handle_place_bid(cmd, &db_manager).await?;
    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "current_bid": updated.current_bid,
        "amount": amount
    }))
    .into_response())
}

/// 관심 목록 토글 요청 처리
pub async fn handle_toggle_watch(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<ToggleWatchCommand>,
) -> Result<Response> {
    info!(
        "{:<12} --> 관심 목록 토글 요청 처리 시작: {:?}",
        "Command", cmd
    );
    let watched = commands::handle_toggle_watch(cmd, &db_manager).await?;
    Ok(Json(serde_json::json!({ "watched": watched })).into_response())
}

/// 경매 종료 요청 처리
pub async fn handle_close_listing(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response> {
    info!(
        "{:<12} --> 경매 종료 요청 처리 시작 id: {}",
        "Command", listing_id
    );
    let (listing, winner) = commands::handle_close_listing(listing_id, &db_manager).await?;
    Ok(Json(serde_json::json!({
        "listing": listing,
        "winner": winner
    }))
    .into_response())
}

/// 댓글 등록 요청 처리
pub async fn handle_add_comment(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
    Json(cmd): Json<AddCommentCommand>,
) -> Result<Response> {
    info!(
        "{:<12} --> 댓글 등록 요청 처리 시작 id: {}",
        "Command", listing_id
    );
    let comment = commands::handle_add_comment(listing_id, cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

// endregion: --- Commerce Command Handlers

// region:    --- Commerce Query Handlers

/// 모든 상품 조회
pub async fn handle_get_listings(State((db_manager, _)): State<AppState>) -> Result<Response> {
    info!("{:<12} --> 모든 상품 조회", "HandlerQuery");
    let listings = query::handlers::get_all_listings(&db_manager).await?;
    Ok(Json(listings).into_response())
}

/// 상품 조회
pub async fn handle_get_listing(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response> {
    info!("{:<12} --> 상품 조회 id: {}", "HandlerQuery", listing_id);
    let listing = query::handlers::get_listing(&db_manager, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("상품 {listing_id}")))?;
    let bid_count = query::handlers::get_bid_count(&db_manager, listing_id).await?;
    Ok(Json(serde_json::json!({
        "listing": listing,
        "bid_count": bid_count
    }))
    .into_response())
}

/// 상품 입찰 이력 조회
pub async fn handle_get_listing_bids(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response> {
    info!(
        "{:<12} --> 상품 입찰 이력 조회 id: {}",
        "HandlerQuery", listing_id
    );
    let (bids, count) = commands::bid_history_with_count(&db_manager, listing_id).await?;
    Ok(Json(serde_json::json!({
        "bids": bids,
        "count": count
    }))
    .into_response())
}

/// 상품 댓글 조회
pub async fn handle_get_comments(
    State((db_manager, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<Response> {
    info!(
        "{:<12} --> 상품 댓글 조회 id: {}",
        "HandlerQuery", listing_id
    );
    let comments = query::handlers::get_comments(&db_manager, listing_id).await?;
    Ok(Json(comments).into_response())
}

/// 사용자 관심 목록 조회
pub async fn handle_get_watchlist(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Response> {
    info!(
        "{:<12} --> 사용자 관심 목록 조회 id: {}",
        "HandlerQuery", user_id
    );
    let watchlist = query::handlers::get_watchlist(&db_manager, user_id).await?;
    Ok(Json(serde_json::json!({
        "count": watchlist.len(),
        "watchlist": watchlist
    }))
    .into_response())
}

// endregion: --- Commerce Query Handlers

// region:    --- Wiki Handlers

/// 새 문서 생성 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub title: String,
    pub content: String,
}

/// 문서 편집 요청 본문
#[derive(Debug, Deserialize)]
pub struct SaveEntryRequest {
    pub content: String,
}

/// 검색 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// 문서 제목 목록 조회
pub async fn handle_list_entries(State((_, store)): State<AppState>) -> Result<Response> {
    info!("{:<12} --> 문서 목록 조회", "HandlerQuery");
    let entries = store.list_entries().await?;
    Ok(Json(serde_json::json!({ "entries": entries })).into_response())
}

/// 문서 조회 (원문과 렌더링된 HTML을 함께 반환)
pub async fn handle_get_entry(
    State((_, store)): State<AppState>,
    Path(title): Path<String>,
) -> Result<Response> {
    info!("{:<12} --> 문서 조회: {}", "HandlerQuery", title);
    let content = store
        .get_entry(&title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("문서 '{title}'")))?;
    let rendered = render_markdown(&content);
    Ok(Json(serde_json::json!({
        "title": title,
        "content": content,
        "rendered": rendered
    }))
    .into_response())
}

/// 새 문서 생성. 동일 제목이 이미 있으면 409.
pub async fn handle_create_entry(
    State((_, store)): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Response> {
    info!("{:<12} --> 문서 생성: {}", "Command", req.title);
    if store.get_entry(&req.title).await?.is_some() {
        return Err(AppError::AlreadyExists(req.title));
    }
    store.save_entry(&req.title, &req.content).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "title": req.title })),
    )
        .into_response())
}

/// 문서 편집 (무조건 덮어쓰기)
pub async fn handle_save_entry(
    State((_, store)): State<AppState>,
    Path(title): Path<String>,
    Json(req): Json<SaveEntryRequest>,
) -> Result<Response> {
    info!("{:<12} --> 문서 편집: {}", "Command", title);
    store.save_entry(&title, &req.content).await?;
    Ok(Json(serde_json::json!({ "title": title })).into_response())
}

/// 문서 검색. 제목이 정확히 일치하면 해당 문서로 리다이렉트.
pub async fn handle_search(
    State((_, store)): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    info!("{:<12} --> 문서 검색: {}", "HandlerQuery", params.q);
    match store.search(&params.q).await? {
        SearchOutcome::Exact(title) => Ok(redirect_to_entry(&title).into_response()),
        SearchOutcome::Matches(matches) => Ok(Json(serde_json::json!({
            "query": params.q,
            "matches": matches
        }))
        .into_response()),
    }
}

/// 임의 문서로 리다이렉트
pub async fn handle_random_entry(State((_, store)): State<AppState>) -> Result<Response> {
    info!("{:<12} --> 임의 문서 조회", "HandlerQuery");
    let title = store.random_entry().await?;
    Ok(redirect_to_entry(&title).into_response())
}

fn redirect_to_entry(title: &str) -> Redirect {
    Redirect::to(&format!("/wiki/{}", urlencoding::encode(title)))
}

// endregion: --- Wiki Handlers
