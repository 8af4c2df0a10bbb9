//! Metrics HTTP server.
//!
//! Every request triggers one device read. The read is tied to the
//! request through a cancellation token whose drop guard lives in the
//! handler, so a client that hangs up aborts the scrape in flight.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use modemex_api::Modem;

use crate::error::CliError;
use crate::metrics::Exposition;

#[derive(Clone)]
pub struct AppState {
    modem: Arc<dyn Modem>,
    exposition: Arc<Exposition>,
}

/// `/metrics`, plus the same handler on every other path.
pub fn router(modem: Arc<dyn Modem>) -> prometheus::Result<Router> {
    let exposition = Arc::new(Exposition::new(modem.info())?);
    Ok(Router::new()
        .route("/metrics", get(handle_metrics))
        .fallback(get(handle_metrics))
        .with_state(AppState { modem, exposition }))
}

async fn handle_metrics(State(state): State<AppState>) -> Response {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let counters = match state.modem.read_counters(&cancel).await {
        Ok(counters) => counters,
        Err(err) => {
            warn!(error = %err, transient = err.is_transient(), "scrape failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };
    debug!(rx_bytes = counters.rx_bytes, tx_bytes = counters.tx_bytes, "scrape ok");

    match state.exposition.render(&counters) {
        Ok(body) => (
            [(header::CONTENT_TYPE, state.exposition.content_type().to_owned())],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "encoding metrics failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Bind `addr` and serve until Ctrl-C or SIGTERM.
pub async fn serve(addr: SocketAddr, modem: Arc<dyn Modem>) -> Result<(), CliError> {
    let app = router(Arc::clone(&modem))?;
    let listener = TcpListener::bind(addr).await?;
    let info = modem.info();
    info!(%addr, vendor = %info.vendor, model = %info.model, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutting down gracefully");
}
