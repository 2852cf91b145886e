// Connection handling module
// Serves one accepted TCP connection with hyper's HTTP/1 implementation

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve a connection on a local task
///
/// Clients get `performance.header_read_timeout` to deliver request headers.
/// Once a request is in, it runs to completion however long handling takes.
pub fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);
        let header_timeout = Duration::from_secs(state.config.performance.header_read_timeout);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(state.config.performance.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(header_timeout);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_debug(&format!(
                    "Connection from {peer_addr} sent no request headers within {} seconds",
                    header_timeout.as_secs()
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
