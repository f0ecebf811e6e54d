// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error

pub type Result<T> = std::result::Result<T, AppError>;

/// 서비스 전역 에러 타입
#[derive(Debug, Error)]
pub enum AppError {
    /// 입찰 금액이 현재 가격보다 낮은 경우
    #[error("입찰 금액이 현재 가격({current_bid})보다 낮습니다.")]
    InvalidBid { current_bid: i64 },

    /// 종료된 경매에 대한 입찰 시도
    #[error("경매가 이미 종료되었습니다.")]
    ListingClosed,

    /// 상품, 사용자, 위키 문서 등을 찾을 수 없는 경우
    #[error("{0}을(를) 찾을 수 없습니다.")]
    NotFound(String),

    /// 위키 저장소가 비어 랜덤 선택이 불가능한 경우
    #[error("위키 저장소가 비어 있습니다.")]
    EmptyStore,

    /// 동일한 제목의 위키 문서가 이미 존재하는 경우
    #[error("'{0}' 문서가 이미 존재합니다.")]
    AlreadyExists(String),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 클라이언트 식별용 에러 코드
    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidBid { .. } => "INVALID_BID",
            AppError::ListingClosed => "LISTING_CLOSED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::EmptyStore => "EMPTY_STORE",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::Database(_) => "DATABASE",
            AppError::Io(_) => "IO",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBid { .. } | AppError::ListingClosed => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::EmptyStore => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 모든 에러는 재시도 없이 요청자에게 그대로 반환된다.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let AppError::InvalidBid { current_bid } = &self {
            body["current_bid"] = serde_json::json!(current_bid);
        }
        (self.status(), Json(body)).into_response()
    }
}

// endregion: --- Error

// endregion: --- Tests
