use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 경매 종료 시 제목에 덧붙이는 마커
pub const CLOSED_MARKER: &str = " [CLOSED]";

/// 이미지 URL이 없는 상품에 사용하는 대체 이미지
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ac/No_image_available.svg/480px-No_image_available.svg.png";

// 상품 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub current_bid: i64,
    pub category: String,
    pub seller_id: i64,
    pub closed: bool,
    pub winner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// 입찰 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub bid_time: DateTime<Utc>,
}

// 댓글 모델
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub listing_id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// 사용자 모델 (계정 관리는 별도 서비스 담당, 여기서는 조회 전용)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}
