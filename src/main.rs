//! This file defines the meteopanel binary entry point.

use meteopanel::app;
use meteopanel::app_state::AppState;
use meteopanel::cli;
use meteopanel::metrics;
use meteopanel::server;
use meteopanel::tracing;

use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    metrics::register_metrics();
    let state = Arc::new(AppState::new(&args));
    let service = app::service(state.clone());
    server::serve(&args, service).await;
    state.datastore.close().await;
}
