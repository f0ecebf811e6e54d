use axum::http::StatusCode;
use commerce_service::database::DatabaseManager;
use commerce_service::listing::model::Listing;
use commerce_service::query;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;

const BASE_URL: &str = "http://localhost:3000";

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    let db_manager = Arc::new(DatabaseManager::new().await);
    db_manager.initialize_database().await.unwrap();
    db_manager
}

/// 테스트용 상품 생성
async fn create_test_listing(
    db_manager: &DatabaseManager,
    title: String,
    description: String,
    starting_bid: i64,
) -> Listing {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(
                    "INSERT INTO listings (title, description, image_url, current_bid, category, seller_id)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at",
                )
                .bind(&title)
                .bind(&description)
                .bind("https://example.com/item.png")
                .bind(starting_bid)
                .bind("Toys")
                .bind(1_i64)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 테스트용 사용자 생성
async fn create_test_user(db_manager: &DatabaseManager, username: &str) -> i64 {
    let username = username.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let row: (i64,) = sqlx::query_as(
                    "INSERT INTO users (username) VALUES ($1)
                     ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
                     RETURNING id",
                )
                .bind(&username)
                .fetch_one(&mut **tx)
                .await?;
                Ok::<_, sqlx::Error>(row.0)
            })
        })
        .await
        .unwrap()
}

/// 입찰 테스트
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_place_bid() {
    let db_manager = setup().await;
    let client = Client::new();

    let bidder_id = create_test_user(&db_manager, "bidder-1").await;
    let listing = create_test_listing(
        &db_manager,
        "입찰 테스트 상품".to_string(),
        "입찰 기능 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    let bid_data = json!({
        "listing_id": listing.id,
        "bidder_id": bidder_id,
        "amount": listing.current_bid + 1_000
    });

    let response = client
        .post(format!("{BASE_URL}/bid"))
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // 데이터베이스에서 업데이트된 상품 확인
    let updated = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current_bid, listing.current_bid + 1_000);
    assert_eq!(updated.winner_id, Some(bidder_id));

    // 입찰 기록 확인
    let bids = query::handlers::get_bid_history(&db_manager, listing.id)
        .await
        .unwrap();
    assert!(bids.iter().any(|b| b.amount == listing.current_bid + 1_000));
}

/// 현재 가격보다 낮은 입찰 거부 테스트
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_low_bid_rejected() {
    let db_manager = setup().await;
    let client = Client::new();

    let bidder_id = create_test_user(&db_manager, "bidder-2").await;
    let listing = create_test_listing(
        &db_manager,
        "저가 입찰 테스트 상품".to_string(),
        "낮은 입찰 거부 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    let bid_data = json!({
        "listing_id": listing.id,
        "bidder_id": bidder_id,
        "amount": listing.current_bid - 1
    });

    let response = client
        .post(format!("{BASE_URL}/bid"))
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_BID");

    // 상품 상태가 변하지 않았는지 확인
    let unchanged = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.current_bid, listing.current_bid);
    assert_eq!(unchanged.winner_id, None);
}

/// 관심 목록 토글 테스트 (두 번 호출하면 원래 상태)
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_toggle_watch_is_its_own_inverse() {
    let db_manager = setup().await;
    let client = Client::new();

    let user_id = create_test_user(&db_manager, "watcher-1").await;
    let listing = create_test_listing(
        &db_manager,
        "관심 목록 테스트 상품".to_string(),
        "관심 목록 토글 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    let watch_data = json!({
        "user_id": user_id,
        "listing_id": listing.id
    });

    // 첫 번째 토글: 추가
    let response = client
        .post(format!("{BASE_URL}/watch"))
        .json(&watch_data)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["watched"], true);
    assert!(query::handlers::is_watched(&db_manager, user_id, listing.id)
        .await
        .unwrap());

    // 두 번째 토글: 제거
    let response = client
        .post(format!("{BASE_URL}/watch"))
        .json(&watch_data)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["watched"], false);
    assert!(!query::handlers::is_watched(&db_manager, user_id, listing.id)
        .await
        .unwrap());
}

/// 경매 종료 테스트 (closed 플래그와 제목 마커의 멱등성)
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_close_listing_idempotent() {
    let db_manager = setup().await;
    let client = Client::new();

    let bidder_id = create_test_user(&db_manager, "bidder-3").await;
    let listing = create_test_listing(
        &db_manager,
        "경매 종료 테스트 상품".to_string(),
        "경매 종료 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    // 낙찰자 확정을 위한 입찰
    let bid_data = json!({
        "listing_id": listing.id,
        "bidder_id": bidder_id,
        "amount": listing.current_bid + 5_000
    });
    client
        .post(format!("{BASE_URL}/bid"))
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    // 첫 번째 종료
    let response = client
        .post(format!("{BASE_URL}/listings/{}/close", listing.id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["listing"]["closed"], true);
    assert_eq!(body["winner"]["username"], "bidder-3");
    let closed_title = body["listing"]["title"].as_str().unwrap().to_string();
    assert!(closed_title.ends_with(" [CLOSED]"));

    // 두 번째 종료: 마커가 다시 추가되지 않는다
    let response = client
        .post(format!("{BASE_URL}/listings/{}/close", listing.id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["listing"]["closed"], true);
    assert_eq!(body["listing"]["title"], closed_title);

    // 종료된 경매에는 입찰할 수 없다
    let late_bid = json!({
        "listing_id": listing.id,
        "bidder_id": bidder_id,
        "amount": listing.current_bid + 50_000
    });
    let response = client
        .post(format!("{BASE_URL}/bid"))
        .json(&late_bid)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST.as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "LISTING_CLOSED");
}

/// 입찰이 없던 경매 종료 테스트 (낙찰자 없이 종료)
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_close_listing_without_bids_has_no_winner() {
    let db_manager = setup().await;
    let client = Client::new();

    let listing = create_test_listing(
        &db_manager,
        "무입찰 종료 테스트 상품".to_string(),
        "입찰 없이 종료되는 경매 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    let response = client
        .post(format!("{BASE_URL}/listings/{}/close", listing.id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["listing"]["closed"], true);
    assert_eq!(body["winner"], Value::Null);

    // 데이터베이스에서도 낙찰자가 없는지 확인
    let closed = query::handlers::get_listing(&db_manager, listing.id)
        .await
        .unwrap()
        .unwrap();
    assert!(closed.closed);
    assert_eq!(closed.winner_id, None);
}

/// 낙찰자 사용자가 없는 경매 종료 테스트
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_close_listing_missing_winner_user() {
    let db_manager = setup().await;
    let client = Client::new();

    let listing = create_test_listing(
        &db_manager,
        "낙찰자 없음 테스트 상품".to_string(),
        "존재하지 않는 낙찰자 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    // users 테이블에 없는 id로 입찰
    let bid_data = json!({
        "listing_id": listing.id,
        "bidder_id": 999_999_999_i64,
        "amount": listing.current_bid + 1_000
    });
    client
        .post(format!("{BASE_URL}/bid"))
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .post(format!("{BASE_URL}/listings/{}/close", listing.id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND.as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

/// 댓글 등록 및 조회 테스트
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_add_and_list_comments() {
    let db_manager = setup().await;
    let client = Client::new();

    let user_id = create_test_user(&db_manager, "commenter-1").await;
    let listing = create_test_listing(
        &db_manager,
        "댓글 테스트 상품".to_string(),
        "댓글 기능 테스트를 위한 상품입니다.".to_string(),
        10_000,
    )
    .await;

    let comment_data = json!({
        "user_id": user_id,
        "body": "상태가 궁금합니다."
    });
    let response = client
        .post(format!("{BASE_URL}/listings/{}/comments", listing.id))
        .json(&comment_data)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED.as_u16());

    let response = client
        .get(format!("{BASE_URL}/listings/{}/comments", listing.id))
        .send()
        .await
        .expect("Failed to send request");
    let comments: Value = response.json().await.unwrap();
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["body"], "상태가 궁금합니다.");
}

/// 위키 문서 생성/조회/중복 방지 테스트
#[tokio::test]
#[ignore = "requires a running server and PostgreSQL"]
async fn test_wiki_entry_lifecycle() {
    let client = Client::new();

    let entry_data = json!({
        "title": "IntegrationTest",
        "content": "# IntegrationTest\n\n통합 테스트 문서입니다."
    });

    // 생성 (이미 있으면 409, 이전 실행이 남긴 상태도 허용)
    let response = client
        .post(format!("{BASE_URL}/wiki"))
        .json(&entry_data)
        .send()
        .await
        .expect("Failed to send request");
    assert!(
        response.status() == StatusCode::CREATED.as_u16()
            || response.status() == StatusCode::CONFLICT.as_u16()
    );

    // 동일 제목 재생성은 409
    let response = client
        .post(format!("{BASE_URL}/wiki"))
        .json(&entry_data)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT.as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_EXISTS");

    // 편집은 덮어쓰기
    let response = client
        .put(format!("{BASE_URL}/wiki/IntegrationTest"))
        .json(&json!({ "content": "수정된 내용" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // 조회: 원문과 렌더링 결과 확인
    let response = client
        .get(format!("{BASE_URL}/wiki/IntegrationTest"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["content"], "수정된 내용");
    assert!(body["rendered"].as_str().unwrap().contains("수정된 내용"));
}
