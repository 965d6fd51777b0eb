use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::session;
use crate::state::AppState;
use crate::template;

pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (_, cookie) = session::resolve(&state.sessions, &headers);
    session::with_cookie(template::render_index().into_response(), cookie)
}
