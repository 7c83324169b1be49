//! soundcoin-server/src/server.rs
//!
//! Builds the ServerContext and runs the HTTP API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum_server::{Handle, Server};
use tracing::{error, info};
use soundcoin_core::tasks::{spawn_session_sweep_task, DEFAULT_SWEEP_INTERVAL};
use soundcoin_core::Error;

use crate::api::build_router;
use crate::config::Args;
use crate::context::ServerContext;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub async fn run_server(args: Args) -> Result<(), Error> {
    let addr: SocketAddr = args.server_addr.parse()?;
    let ctx = Arc::new(ServerContext::new(&args).await?);
    let app = build_router(ctx.clone());

    spawn_session_sweep_task(
        ctx.playback.clone(),
        DEFAULT_SWEEP_INTERVAL,
        args.session_idle(),
        ctx.event_bus.shutdown_rx.clone(),
    );

    let handle = Handle::new();
    let shutdown_handle = handle.clone();
    let event_bus = ctx.event_bus.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received; shutting down."),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        event_bus.shutdown();
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    info!("SoundCoin API listening on http://{}", addr);
    Server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!(
        "HTTP server stopped; {} player session(s) dropped.",
        ctx.playback.session_count()
    );
    Ok(())
}
