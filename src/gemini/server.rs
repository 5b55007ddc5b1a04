//! Gemini listener
//!
//! Accept loop with one task per connection. Connections carry a single
//! request and a single response. TLS is expected to be terminated in front
//! of this listener.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api::{dispatch, AppState};
use crate::gemini::{Request, Response, MAX_REQUEST_LEN};

/// How long a client may take to send its request line
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Serves connections from `listener` until `shutdown` resolves.
///
/// In-flight connection tasks are not awaited on shutdown.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &state).await {
                                debug!(%peer, error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                }
            }
            _ = &mut shutdown => {
                info!("Gemini listener stopping");
                break;
            }
        }
    }

    Ok(())
}

// == Handle Connection ==
/// Reads one request from `stream`, answers it and closes the stream.
pub async fn handle_connection<S>(mut stream: S, state: &AppState) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match timeout(REQUEST_TIMEOUT, read_request_line(&mut stream)).await {
        Ok(Ok(line)) => match Request::parse(&line) {
            Ok(request) => {
                let response = dispatch(state, &request).await;
                info!(
                    path = request.path(),
                    status = response.status.code(),
                    "request served"
                );
                response
            }
            Err(e) => {
                debug!(error = %e, "rejected malformed request");
                Response::bad_request(e.to_string())
            }
        },
        Ok(Err(e)) => return Err(e),
        Err(_) => Response::bad_request("Request timed out"),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

async fn read_request_line<S>(stream: &mut S) -> io::Result<String>
where
    S: AsyncRead + Unpin,
{
    // One byte past the CRLF allowance so overlong lines are detectable
    let limit = (MAX_REQUEST_LEN + 3) as u64;
    let mut reader = BufReader::new(stream.take(limit));
    let mut buf = Vec::new();
    reader.read_until(b'\n', &mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
