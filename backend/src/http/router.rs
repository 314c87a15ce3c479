//! Router configuration for the HTTP API.
//!
//! Paths come from [`crate::routes::Route`], the same table canonical shift
//! URLs are reversed from.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::Route;

/// Request bodies are small JSON records.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; deployments restrict origins at the proxy
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(Route::Health.path(), get(handlers::health_check))
        // Shifts
        .route(
            Route::ListShifts.path(),
            get(handlers::list_shifts).post(handlers::create_shift),
        )
        .route(
            Route::GetShift.path(),
            get(handlers::get_shift).delete(handlers::delete_shift),
        )
        // Sign-ups
        .route(
            Route::SignUp.path(),
            get(handlers::list_helpers).post(handlers::sign_up),
        )
        .route(Route::Withdraw.path(), delete(handlers::withdraw))
        // Organization records
        .route(Route::Contacts.path(), post(handlers::create_contact))
        .route(Route::Facilities.path(), post(handlers::create_facility))
        .route(Route::Workplaces.path(), post(handlers::create_workplace))
        .route(Route::Tasks.path(), post(handlers::create_task))
        .route(Route::Accounts.path(), post(handlers::create_account))
        // Canonical shift URLs land here
        .route(
            Route::PlannerByFacility.path(),
            get(handlers::planner_by_facility),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let _router = create_router(AppState::new(repo));
    }
}
