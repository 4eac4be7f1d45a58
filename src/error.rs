/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error envelope)
 * - token / licence / permission / repo の各エラーを統一的に変換
 * - error.code はバリアント名 ("IntrospectionFailed" など)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::licence::LicenceError;
use crate::services::permission::PermissionError;
use crate::services::token::TokenError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or invalid bearer token")]
    MissingOrInvalidToken,
    #[error("token is not active")]
    TokenInactive,
    #[error("token audience does not include this api")]
    AudienceMismatch,
    #[error("license key header is missing")]
    LicenceHeaderMissing,
    #[error("license not found")]
    LicenceNotFound,
    #[error("token introspection failed")]
    IntrospectionFailed,
    #[error("{0}")]
    InsufficientPermissions(String),
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingOrInvalidToken | Self::TokenInactive | Self::AudienceMismatch => {
                StatusCode::UNAUTHORIZED
            }
            Self::LicenceHeaderMissing
            | Self::LicenceNotFound
            | Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::IntrospectionFailed | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingOrInvalidToken => "MissingOrInvalidToken",
            Self::TokenInactive => "TokenInactive",
            Self::AudienceMismatch => "AudienceMismatch",
            Self::LicenceHeaderMissing => "LicenceHeaderMissing",
            Self::LicenceNotFound => "LicenceNotFound",
            Self::IntrospectionFailed => "IntrospectionFailed",
            Self::InsufficientPermissions(_) => "InsufficientPermissions",
            Self::NotFound { .. } => "NotFound",
            Self::BadRequest(_) => "BadRequest",
            Self::Internal => "Internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error",
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::MissingOrInvalidToken => AppError::MissingOrInvalidToken,
            TokenError::Inactive => AppError::TokenInactive,
            TokenError::AudienceMismatch => AppError::AudienceMismatch,
            TokenError::Introspection(_) => AppError::IntrospectionFailed,
        }
    }
}

impl From<LicenceError> for AppError {
    fn from(e: LicenceError) -> Self {
        match e {
            LicenceError::HeaderMissing => AppError::LicenceHeaderMissing,
            LicenceError::NotFound => AppError::LicenceNotFound,
            LicenceError::Source(e) => e.into(),
        }
    }
}

impl From<PermissionError> for AppError {
    fn from(e: PermissionError) -> Self {
        AppError::InsufficientPermissions(e.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database query failed");
                AppError::Internal
            }
        }
    }
}
