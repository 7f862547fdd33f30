//! Outbound connection establishment
//!
//! Opens the two connections the relay pumps between. Both endpoints must
//! have been set up in advance; either failure aborts the whole operation
//! and no half-open pair is ever returned.

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use wirejam_core::Endpoint;

use crate::{RelayError, Result, CONNECT_TIMEOUT};

/// Connect to endpoint A, then endpoint B.
pub async fn connect_pair(a: &Endpoint, b: &Endpoint) -> Result<(TcpStream, TcpStream)> {
    let conn_a = connect_one(a).await?;
    let conn_b = connect_one(b).await?;
    info!("Connected to A at {} and B at {}", a, b);
    Ok((conn_a, conn_b))
}

async fn connect_one(endpoint: &Endpoint) -> Result<TcpStream> {
    let stream = timeout(
        CONNECT_TIMEOUT,
        TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
    )
    .await
    .map_err(|_| RelayError::ConnectTimeout {
        endpoint: endpoint.clone(),
    })?
    .map_err(|source| RelayError::Connect {
        endpoint: endpoint.clone(),
        source,
    })?;
    debug!("Connected to {}", endpoint);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn local_endpoint(listener: &TcpListener) -> Endpoint {
        let addr = listener.local_addr().unwrap();
        Endpoint::new("127.0.0.1", addr.port())
    }

    #[tokio::test]
    async fn connects_to_both_endpoints() {
        let listener_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let listener_b = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let a = local_endpoint(&listener_a).await;
        let b = local_endpoint(&listener_b).await;

        let (conn_a, conn_b) = connect_pair(&a, &b).await.unwrap();
        assert_eq!(conn_a.peer_addr().unwrap().port(), a.port);
        assert_eq!(conn_b.peer_addr().unwrap().port(), b.port);
    }

    #[tokio::test]
    async fn fails_whole_operation_when_second_endpoint_is_down() {
        let listener_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let a = local_endpoint(&listener_a).await;

        // Grab a port that is no longer listening.
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let b = local_endpoint(&dead).await;
        drop(dead);

        let err = connect_pair(&a, &b).await.unwrap_err();
        assert!(matches!(err, RelayError::Connect { .. }));
    }
}
