use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use super::RuntimeState;

/// `GET /ping`: the current health snapshot with its status code.
pub(super) async fn ping(State(state): State<RuntimeState>) -> Response {
    let snapshot = state.health.check();
    (snapshot.http_status(), Json(&*snapshot)).into_response()
}
