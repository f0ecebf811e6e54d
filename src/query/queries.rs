/// 상품 조회
pub const GET_LISTING: &str =
    "SELECT id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at FROM listings WHERE id = $1";

/// 모든 상품 조회
pub const GET_ALL_LISTINGS: &str =
    "SELECT id, title, description, image_url, current_bid, category, seller_id, closed, winner_id, created_at FROM listings ORDER BY created_at DESC";

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, listing_id, bidder_id, amount, bid_time
    FROM bids
    WHERE listing_id = $1
    ORDER BY bid_time DESC
"#;

/// 입찰 수 조회
pub const GET_BID_COUNT: &str = "SELECT COUNT(*) as bid_count FROM bids WHERE listing_id = $1";

/// 상품 댓글 조회
pub const GET_COMMENTS: &str = r#"
    SELECT id, listing_id, user_id, body, created_at
    FROM comments
    WHERE listing_id = $1
    ORDER BY created_at ASC
"#;

/// 사용자 조회
pub const GET_USER: &str = "SELECT id, username FROM users WHERE id = $1";

/// 관심 목록 포함 여부 조회
pub const IS_WATCHED: &str =
    "SELECT EXISTS(SELECT 1 FROM watchlist WHERE user_id = $1 AND listing_id = $2) as watched";

/// 사용자 관심 목록 조회
pub const GET_WATCHLIST: &str = r#"
    SELECT l.id, l.title, l.description, l.image_url, l.current_bid, l.category, l.seller_id, l.closed, l.winner_id, l.created_at
    FROM listings l
    JOIN watchlist w ON w.listing_id = l.id
    WHERE w.user_id = $1
    ORDER BY l.created_at DESC
"#;
