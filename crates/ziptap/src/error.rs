use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;
use ziptap_deliver::{DeliveryError, StrategyKind};

/// Failures reported before any body byte was sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("strategy '{0}' returned no byte source of its kind")]
    UnexpectedSource(StrategyKind),

    #[error("archive stream failed: {0}")]
    Stream(std::io::Error),
}

impl ApiError {
    /// Recovers the delivery error carried by a body stream's I/O error.
    pub fn from_stream(e: std::io::Error) -> Self {
        let kind = e.kind();
        match e.into_inner().map(|inner| inner.downcast::<DeliveryError>()) {
            Some(Ok(delivery)) => Self::Delivery(*delivery),
            Some(Err(other)) => Self::Stream(std::io::Error::new(kind, other)),
            None => Self::Stream(kind.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Delivery(DeliveryError::Storage(_)) => StatusCode::INSUFFICIENT_STORAGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(status = status.as_u16(), error = %self, "download failed");
        (status, self.to_string()).into_response()
    }
}
