use tracing::{debug, info_span};

use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

type Family = fn(&mut AppState, &Request) -> Option<serde_json::Value>;

const FAMILIES: &[Family] = &[
    handlers::core::try_handle,
    handlers::auth::try_handle,
    handlers::routes::try_handle,
    handlers::accounts::try_handle,
    handlers::students::try_handle,
    handlers::teachers::try_handle,
    handlers::sections::try_handle,
    handlers::assignments::try_handle,
    handlers::courses::try_handle,
    handlers::grades::try_handle,
    handlers::student_views::try_handle,
    handlers::enrollment::try_handle,
    handlers::payments::try_handle,
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let span = info_span!("request", id = %req.id, method = %req.method);
    let _guard = span.enter();

    for family in FAMILIES {
        if let Some(resp) = family(state, &req) {
            debug!(ok = resp.get("ok").and_then(|v| v.as_bool()), "handled");
            return resp;
        }
    }

    debug!("no handler");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
