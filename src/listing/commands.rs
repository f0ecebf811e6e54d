/// 상품 관련 커맨드 처리
/// 1. 상품 등록
/// 2. 입찰
/// 3. 관심 목록 토글
/// 4. 경매 종료
/// 5. 댓글 등록
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::{AppError, Result};
use crate::listing::model::{Bid, Comment, Listing, User, CLOSED_MARKER, PLACEHOLDER_IMAGE_URL};
use crate::query::handlers as queries;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

/// 상품 등록 명령
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateListingCommand {
    pub title: String,
    pub description: String,
    pub starting_bid: i64,
    pub seller_id: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
}

/// 관심 목록 토글 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToggleWatchCommand {
    pub user_id: i64,
    pub listing_id: i64,
}

/// 댓글 등록 명령
#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentCommand {
    pub user_id: i64,
    pub body: String,
}

// endregion: --- Commands

// region:    --- Validation

/// 입찰 금액 검증. 동일 금액 입찰은 허용된다.
fn validate_bid(listing: &Listing, amount: i64) -> Result<()> {
    if listing.closed {
        return Err(AppError::ListingClosed);
    }
    if amount < listing.current_bid {
        return Err(AppError::InvalidBid {
            current_bid: listing.current_bid,
        });
    }
    Ok(())
}

/// 종료 마커가 없는 제목에만 마커를 덧붙인다.
/// 부분 문자열 검사로 중복 추가를 막는다 (별도 플래그 없음).
fn closed_title(title: &str) -> String {
    if title.contains(CLOSED_MARKER.trim_start()) {
        title.to_string()
    } else {
        format!("{title}{CLOSED_MARKER}")
    }
}

// endregion: --- Validation

// region:    --- Command Handlers

/// 1. 상품 등록
pub async fn handle_create_listing(
    cmd: CreateListingCommand,
    db_manager: &DatabaseManager,
) -> Result<Listing> {
    info!("{:<12} --> 상품 등록 처리 시작: {:?}", "Command", cmd);

    // 이미지 URL이 없으면 대체 이미지 사용
    let image_url = match cmd.image_url {
        Some(url) if !url.is_empty() => url,
        _ => PLACEHOLDER_IMAGE_URL.to_string(),
    };
    let category = cmd.category.unwrap_or_else(|| "Not specified".to_string());

    let listing = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(
                    "INSERT INTO listings (title, description, image_url, current_bid, category, seller_id)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at",
                )
                .bind(&cmd.title)
                .bind(&cmd.description)
                .bind(&image_url)
                .bind(cmd.starting_bid)
                .bind(&category)
                .bind(cmd.seller_id)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;

    Ok(listing)
}

/// 2. 입찰
///
/// 검증 시점의 현재 가격과 갱신 사이에는 잠금이 없다. 동시 입찰은
/// 경합할 수 있으며, 이는 문서화된 알려진 한계다.
pub async fn handle_place_bid(cmd: PlaceBidCommand, db_manager: &DatabaseManager) -> Result<Listing> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);

    // 상품 조회 및 입찰 가능 여부 검증
    let listing = queries::get_listing(db_manager, cmd.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("상품 {}", cmd.listing_id)))?;
    validate_bid(&listing, cmd.amount)?;

    // 현재 가격 갱신과 입찰 기록 추가는 하나의 트랜잭션으로 처리
    let updated = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let updated = sqlx::query_as::<_, Listing>(
                    "UPDATE listings SET current_bid = $1, winner_id = $2 WHERE id = $3
                     RETURNING id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at",
                )
                .bind(cmd.amount)
                .bind(cmd.bidder_id)
                .bind(cmd.listing_id)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    "INSERT INTO bids (listing_id, bidder_id, amount) VALUES ($1, $2, $3)",
                )
                .bind(cmd.listing_id)
                .bind(cmd.bidder_id)
                .bind(cmd.amount)
                .execute(&mut **tx)
                .await?;

                Ok::<_, sqlx::Error>(updated)
            })
        })
        .await?;

    info!(
        "{:<12} --> 입찰 성공: 현재 가격 {}",
        "Command", updated.current_bid
    );
    Ok(updated)
}

/// 3. 관심 목록 토글
///
/// 이미 포함되어 있으면 제거하고, 없으면 추가한다. 반환값은 토글 후의
/// 포함 여부. 두 번 호출하면 원래 상태로 돌아간다.
pub async fn handle_toggle_watch(
    cmd: ToggleWatchCommand,
    db_manager: &DatabaseManager,
) -> Result<bool> {
    info!("{:<12} --> 관심 목록 토글 처리 시작: {:?}", "Command", cmd);

    let watched = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let removed = sqlx::query(
                    "DELETE FROM watchlist WHERE user_id = $1 AND listing_id = $2",
                )
                .bind(cmd.user_id)
                .bind(cmd.listing_id)
                .execute(&mut **tx)
                .await?
                .rows_affected();

                if removed > 0 {
                    return Ok::<_, sqlx::Error>(false);
                }

                sqlx::query("INSERT INTO watchlist (user_id, listing_id) VALUES ($1, $2)")
                    .bind(cmd.user_id)
                    .bind(cmd.listing_id)
                    .execute(&mut **tx)
                    .await?;

                Ok(true)
            })
        })
        .await?;

    Ok(watched)
}

/// 4. 경매 종료
///
/// closed 플래그는 false -> true로 한 번만 전이하고 되돌릴 수 없다.
/// 제목 마커와 플래그 모두 재호출에 대해 멱등하다. 낙찰자는 winner_id로
/// 조회하며, 해당 사용자가 없으면 NotFound를 반환한다. 입찰이 없던
/// 상품은 낙찰자 없이 종료된다.
pub async fn handle_close_listing(
    listing_id: i64,
    db_manager: &DatabaseManager,
) -> Result<(Listing, Option<User>)> {
    info!("{:<12} --> 경매 종료 처리 시작 id: {}", "Command", listing_id);

    let listing = queries::get_listing(db_manager, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("상품 {listing_id}")))?;

    let new_title = closed_title(&listing.title);
    let closed = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(
                    "UPDATE listings SET closed = TRUE, title = $1 WHERE id = $2
                     RETURNING id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at",
                )
                .bind(&new_title)
                .bind(listing_id)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;

    // 낙찰자 조회
    let winner = match closed.winner_id {
        Some(winner_id) => {
            let user = queries::get_user(db_manager, winner_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("사용자 {winner_id}")))?;
            Some(user)
        }
        None => None,
    };

    info!(
        "{:<12} --> 경매 종료 완료 id: {}, 낙찰자: {:?}",
        "Command",
        listing_id,
        winner.as_ref().map(|w| &w.username)
    );
    Ok((closed, winner))
}

/// 5. 댓글 등록
pub async fn handle_add_comment(
    listing_id: i64,
    cmd: AddCommentCommand,
    db_manager: &DatabaseManager,
) -> Result<Comment> {
    info!(
        "{:<12} --> 댓글 등록 처리 시작 listing: {}, user: {}",
        "Command", listing_id, cmd.user_id
    );

    // 대상 상품 존재 확인
    queries::get_listing(db_manager, listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("상품 {listing_id}")))?;

    let comment = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Comment>(
                    "INSERT INTO comments (listing_id, user_id, body) VALUES ($1, $2, $3)
                     RETURNING id, listing_id, user_id, body, created_at",
                )
                .bind(listing_id)
                .bind(cmd.user_id)
                .bind(&cmd.body)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await?;

    Ok(comment)
}

/// 입찰 이력과 입찰 수 조회 (상세 화면용)
pub async fn bid_history_with_count(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<(Vec<Bid>, i64)> {
    let history = queries::get_bid_history(db_manager, listing_id).await?;
    let count = queries::get_bid_count(db_manager, listing_id).await?;
    Ok((history, count))
}

// endregion: --- Command Handlers

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn open_listing(current_bid: i64) -> Listing {
        Listing {
            id: 1,
            title: "만년필".to_string(),
            description: "잉크 포함".to_string(),
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
            current_bid,
            category: "Not specified".to_string(),
            seller_id: 7,
            closed: false,
            winner_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_bid_below_current_price_is_rejected() {
        let listing = open_listing(10_000);
        let err = validate_bid(&listing, 9_999).unwrap_err();
        assert!(matches!(err, AppError::InvalidBid { current_bid: 10_000 }));
    }

    #[test]
    fn test_equal_bid_is_accepted() {
        let listing = open_listing(10_000);
        assert!(validate_bid(&listing, 10_000).is_ok());
        assert!(validate_bid(&listing, 10_001).is_ok());
    }

    #[test]
    fn test_bid_on_closed_listing_is_rejected() {
        let mut listing = open_listing(10_000);
        listing.closed = true;
        let err = validate_bid(&listing, 50_000).unwrap_err();
        assert!(matches!(err, AppError::ListingClosed));
    }

    #[test]
    fn test_closed_marker_appended_once() {
        let once = closed_title("만년필");
        assert_eq!(once, "만년필 [CLOSED]");

        // 이미 마커가 있으면 다시 붙이지 않는다
        let twice = closed_title(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_closed_marker_substring_guard() {
        // 제목 본문에 마커 문자열이 들어 있으면 추가하지 않는다 (의도된 동작)
        let title = "희귀 [CLOSED] 표지판";
        assert_eq!(closed_title(title), title);
    }
}
// endregion: --- Tests
