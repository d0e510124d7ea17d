use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use swampnotes_core::error::{AppError, error_body};
use swampnotes_domain::points::PointsError;

/// Marketplace service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketServiceError {
    #[error("note not found")]
    NoteNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("note content not found")]
    ContentNotFound,
    #[error("note already owned")]
    AlreadyOwned,
    #[error("insufficient funds")]
    InsufficientFunds { balance: i64, required: i64 },
    #[error("authors cannot purchase their own notes")]
    SelfPurchase,
    #[error("course already exists")]
    CourseAlreadyExists,
    #[error("invalid price")]
    InvalidPrice,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("missing data")]
    MissingData,
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ContentNotFound => "CONTENT_NOT_FOUND",
            Self::AlreadyOwned => "ALREADY_OWNED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::SelfPurchase => "SELF_PURCHASE",
            Self::CourseAlreadyExists => "COURSE_ALREADY_EXISTS",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoteNotFound
            | Self::CourseNotFound
            | Self::UserNotFound
            | Self::ContentNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyOwned | Self::CourseAlreadyExists => StatusCode::CONFLICT,
            Self::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::SelfPurchase
            | Self::InvalidPrice
            | Self::InvalidAmount
            | Self::InvalidUpload(_)
            | Self::MissingData
            | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for MarketServiceError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Unauthorized => Self::Unauthorized,
            AppError::Forbidden => Self::Forbidden,
            AppError::BadRequest(reason) => Self::InvalidQuery(reason),
            AppError::Internal(e) => Self::Internal(e),
        }
    }
}

impl From<PointsError> for MarketServiceError {
    fn from(e: PointsError) -> Self {
        match e {
            PointsError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            PointsError::NegativeAmount | PointsError::Overflow => Self::InvalidAmount,
        }
    }
}

impl IntoResponse for MarketServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = error_body(self.kind(), self.to_string());
        if let Self::InsufficientFunds { balance, required } = self {
            body["balance"] = balance.into();
            body["required"] = required.into();
        }
        (status, axum::Json(body)).into_response()
    }
}
