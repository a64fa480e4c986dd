//! Accepts light requests from the network.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{error, info};

use crate::mapper::Mapper;

pub mod web;

/// Serve the HTTP API for a pre-configured Mapper until Ctrl-C.
///
/// Blocks the calling thread; the API runs on its own tokio runtime.
pub fn serve(addr: &str, mapper: Arc<Mapper>) -> io::Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let runtime = Runtime::new()?;
    runtime.block_on(serve_until(addr, mapper, shutdown_signal()))
}

/// Serve until `signal` resolves.
pub async fn serve_until<S>(addr: SocketAddr, mapper: Arc<Mapper>, signal: S) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(web::routes(mapper))
        .try_bind_with_graceful_shutdown(addr, signal)
        .map_err(|err| io::Error::new(io::ErrorKind::AddrInUse, err))?;

    info!(addr = %bound, "[web] serving light API");
    server.await;
    info!("[web] stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("unable to listen for Ctrl-C: {}", err);
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
