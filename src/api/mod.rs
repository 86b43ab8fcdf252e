//! HTTP surface
//!
//! JSON over HTTP with bearer-token authentication. Routes without a token
//! run as an anonymous caller; the service decides what that caller may do.

mod error;
mod extract;
mod handlers;

pub use error::{ApiError, ApiResult};
pub use extract::{RequestCaller, TicketIntake};

use crate::error::Result;
use crate::service::TicketService;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room left in a create request for form fields next to the attachments
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the application router
pub fn router(service: TicketService, uploads_dir: &Path, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/register-user", post(handlers::register_employee))
        .route("/login", post(handlers::login))
        .route(
            "/tickets",
            post(handlers::create_ticket)
                .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES)))
                .get(handlers::list_tickets),
        )
        .route("/tickets/freeze-old", post(handlers::freeze_old))
        .route("/tickets/:ticket_no", get(handlers::ticket_detail))
        .route("/tickets/:ticket_no/comment", post(handlers::add_comment))
        .route("/tickets/:ticket_no/status", put(handlers::change_status))
        .route("/my-tickets", get(handlers::my_tickets))
        .route("/manager/tickets", get(handlers::manager_tickets))
        .route("/manager/stats", get(handlers::manager_stats))
        .route(
            "/manager/tickets/:ticket_no/assign",
            put(handlers::assign_ticket),
        )
        .route("/dashboard/stats", get(handlers::dashboard))
        .route("/users", get(handlers::list_users));

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve until Ctrl-C
pub async fn serve(router: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
