//! Ingestion 错误类型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 请求体无法解析为 JSON
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// 错误消息
        message: String,
    },

    /// 队列已关闭 (dispatch worker 已退出)
    #[error("ingestion queue is closed")]
    QueueClosed,

    /// 监听 socket 错误
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    /// 创建请求体解析错误
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestionError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            IngestionError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            IngestionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestionError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
