/*
 * Responsibility
 * - 成功時の共通エンベロープ {"status":"success","data":..,"message":..}
 * - エラー側は crate::error::ErrorResponse
 */
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub status: &'static str,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
            message: DEFAULT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
