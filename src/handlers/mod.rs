pub mod storefront_handlers;

use axum::{routing::get, Router};

pub use storefront_handlers::{browse_page, landing_page, login_page};

/// The storefront's three static pages. Unmatched paths fall through to
/// axum's default 404.
pub fn storefront_router() -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/login", get(login_page))
        .route("/browse", get(browse_page))
}
