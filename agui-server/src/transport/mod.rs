//! Wire transports for the AG-UI event stream.
//!
//! Each transport implements [`agui_core::EventSender`] over a bounded channel
//! of encoded chunks; the HTTP response body drains the other end. A client
//! that goes away drops the body, which cancels the request's token even
//! while nothing is being sent.

use std::convert::Infallible;
use std::future::Future;

use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

pub mod sse;

#[cfg(feature = "connect")]
pub mod connect;
#[cfg(feature = "connect")]
pub mod envelope;
#[cfg(feature = "connect")]
pub mod proto;

/// Encoded chunks buffered between a request task and its response body.
pub(crate) const STREAM_BUFFER: usize = 16;

pub(crate) fn chunk_channel() -> (mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>) {
    mpsc::channel(STREAM_BUFFER)
}

/// Streaming response body fed by `rx`.
pub(crate) fn stream_body(rx: mpsc::Receiver<Bytes>) -> Body {
    Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>))
}

/// Drive `work` until it completes or the body fed by `tx` is dropped.
///
/// On disconnect `cancel` fires, `work` is dropped and `None` is returned.
pub(crate) async fn until_disconnect<F>(
    tx: &mpsc::Sender<Bytes>,
    cancel: &CancellationToken,
    work: F,
) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        output = work => Some(output),
        () = tx.closed() => {
            tracing::info!("client disconnected, cancelling request");
            cancel.cancel();
            None
        }
    }
}
