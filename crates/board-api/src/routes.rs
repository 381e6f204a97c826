use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::messages;
use crate::middleware::require_auth;
use crate::render::render_error_pages;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register));

    let protected_routes = Router::new()
        .route("/", get(messages::list_messages))
        .route("/search", get(messages::search_messages))
        .route("/messages", post(messages::create_message))
        .route("/messages/{id}", get(messages::show_message).post(messages::update_message))
        .route(
            "/messages/{id}/edit",
            get(messages::edit_message).post(messages::update_message),
        )
        .route("/messages/{id}/delete", post(messages::delete_message))
        .route("/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), render_error_pages))
        .with_state(state)
}
