use axum::routing::get;
use axum::Router;

use crate::handlers::preferences;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /{user_id}/notification-preferences -> get_preferences
/// PUT    /{user_id}/notification-preferences -> update_preferences
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{user_id}/notification-preferences",
        get(preferences::get_preferences).put(preferences::update_preferences),
    )
}
