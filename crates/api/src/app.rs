use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// Build the Axum router: public reads, authenticated player routes, and
/// the admin surface, all sharing one `AppState`.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/tournaments", get(routes::tournaments::list))
        .route("/tournaments/{id}", get(routes::tournaments::get))
        .route("/users/{id}", get(routes::users::profile));

    let authed = Router::new()
        .route(
            "/tournaments/register",
            post(routes::tournaments::register_team),
        )
        .route(
            "/tournaments/{id}/register",
            post(routes::tournaments::register_solo).delete(routes::tournaments::unregister),
        )
        .route(
            "/users/me",
            get(routes::users::me).patch(routes::users::update_me),
        )
        .route(
            "/friends",
            get(routes::friends::list).post(routes::friends::request),
        )
        .route(
            "/notifications",
            get(routes::notifications::list).patch(routes::notifications::mark_all_read),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::jwt_auth,
        ));

    // Admin handlers re-derive the is_admin flag from the database; the
    // token layer here only establishes identity.
    let admin = Router::new()
        .route(
            "/admin/tournaments",
            get(routes::admin::list).post(routes::admin::create),
        )
        .route(
            "/admin/tournaments/{id}",
            get(routes::admin::get)
                .patch(routes::admin::update)
                .delete(routes::admin::delete),
        )
        .route(
            "/admin/tournaments/{id}/registrations",
            get(routes::admin::registrations),
        )
        .route(
            "/admin/tournaments/{id}/results",
            post(routes::admin::record_results),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::jwt_auth,
        ));

    Router::new()
        .merge(public)
        .merge(authed)
        .merge(admin)
        .with_state(state)
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive()) // tighten later
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    infra::db::ping(&state.db).await?;
    Ok("ok")
}
