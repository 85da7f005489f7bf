use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use ziptap_archive::SourceItem;
use ziptap_deliver::{DeliveryError, StrategyKind};

use crate::AppState;
use crate::body::TempFileStream;
use crate::error::ApiError;

type Result<T> = std::result::Result<T, ApiError>;

/// `GET /download/tmp-file`
pub async fn tmp_file(State(state): State<AppState>) -> Result<Response> {
    let kind = StrategyKind::TmpFile;
    let provider = Arc::clone(&state.provider);
    let deliverer = Arc::clone(&state.deliverer);

    let (stream, len) = tokio::task::spawn_blocking(move || -> Result<_> {
        let items = provider.list().map_err(DeliveryError::from)?;
        let archive = deliverer
            .tmp_file(items)?
            .into_file()
            .ok_or(ApiError::UnexpectedSource(kind))?;
        Ok(TempFileStream::open(archive).map_err(DeliveryError::from)?)
    })
    .await??;

    Ok(attachment(kind, Some(len), Body::from_stream(stream)))
}

/// `GET /download/piped`
pub async fn piped(State(state): State<AppState>) -> Result<Response> {
    let kind = StrategyKind::Piped;
    let items = list_items(&state).await?;
    let reader = state
        .deliverer
        .piped(items)
        .into_pipe()
        .ok_or(ApiError::UnexpectedSource(kind))?;
    Ok(attachment(kind, None, Body::from_stream(ReaderStream::new(reader))))
}

/// `GET /download/streaming`
///
/// The first step runs before the response is built, so a failure to open
/// the first item still gets an error status.
pub async fn streaming(State(state): State<AppState>) -> Result<Response> {
    let kind = StrategyKind::Streaming;
    let items = list_items(&state).await?;
    let mut stream = state.deliverer.direct_stream(items);

    let first = match stream.next().await {
        Some(Err(e)) => return Err(ApiError::from_stream(e)),
        first => first,
    };
    let body = futures_util::stream::iter(first).chain(stream);
    Ok(attachment(kind, None, Body::from_stream(body)))
}

async fn list_items(state: &AppState) -> Result<Vec<SourceItem>> {
    let provider = Arc::clone(&state.provider);
    let items = tokio::task::spawn_blocking(move || provider.list()).await?;
    Ok(items.map_err(DeliveryError::from)?)
}

fn attachment(kind: StrategyKind, len: Option<u64>, body: Body) -> Response {
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename={}", kind.file_name())) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(len) = len {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    response
}
