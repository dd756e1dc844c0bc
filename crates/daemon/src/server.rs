// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error};

use crate::lifecycle::DaemonState;
use crate::protocol::{
    self, JobSummary, ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};

/// Handle a single client connection
pub async fn handle_connection<S>(daemon: &mut DaemonState, stream: S) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let response = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => {
            debug!("Received request: {:?}", request);
            handle_request(daemon, request)
        }
        Err(ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(ProtocolError::Json(e)) => Response::Error {
            message: format!("malformed request: {}", e),
        },
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Status => Response::Status {
            uptime_secs: daemon.start_time.elapsed().as_secs(),
            running: daemon.manager.is_running(),
            jobs: daemon
                .manager
                .status()
                .into_iter()
                .map(JobSummary::from)
                .collect(),
        },

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
