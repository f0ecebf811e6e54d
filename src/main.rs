// region:    --- Imports
use crate::database::DatabaseManager;
use crate::wiki::FsEntryStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod database;
mod error;
mod handlers;
mod listing;
mod query;
mod wiki;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 위키 문서 저장소 생성
    let entry_store = Arc::new(FsEntryStore::from_env());
    info!(
        "{:<12} --> 위키 저장소 루트: {}",
        "Main",
        entry_store.root().display()
    );

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        // 경매
        .route(
            "/listings",
            post(handlers::handle_create_listing).get(handlers::handle_get_listings),
        )
        .route("/listings/:id", get(handlers::handle_get_listing))
        .route("/listings/:id/bids", get(handlers::handle_get_listing_bids))
        .route("/listings/:id/close", post(handlers::handle_close_listing))
        .route(
            "/listings/:id/comments",
            post(handlers::handle_add_comment).get(handlers::handle_get_comments),
        )
        .route("/bid", post(handlers::handle_bid))
        .route("/watch", post(handlers::handle_toggle_watch))
        .route("/users/:id/watchlist", get(handlers::handle_get_watchlist))
        // 위키
        .route(
            "/wiki",
            get(handlers::handle_list_entries).post(handlers::handle_create_entry),
        )
        .route("/wiki/search", get(handlers::handle_search))
        .route("/wiki/random", get(handlers::handle_random_entry))
        .route(
            "/wiki/:title",
            get(handlers::handle_get_entry).put(handlers::handle_save_entry),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2))
        .with_state((db_manager, entry_store));

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
