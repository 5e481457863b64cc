use serde_json::{json, Value};

use crate::error::PortalResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};

fn handle_login(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let email = required_str(params, "email")?;
    let password = required_str(params, "password")?;
    let (user, redirect) = state.session.login(email, password)?;
    Ok(json!({ "user": user, "redirect": redirect }))
}

fn handle_logout(state: &mut AppState) -> PortalResult<Value> {
    let redirect = state.session.logout()?;
    Ok(json!({ "redirect": redirect }))
}

fn handle_session(state: &mut AppState) -> PortalResult<Value> {
    Ok(json!({
        "authenticated": state.session.is_authenticated(),
        "user": state.session.user(),
    }))
}

/// The auth page's on-load probe: a stored user goes straight to its landing page.
fn handle_check(state: &mut AppState) -> PortalResult<Value> {
    let redirect = state.session.check();
    Ok(json!({
        "authenticated": redirect.is_some(),
        "redirect": redirect,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "auth.login" => handle_login(state, &req.params),
        "auth.logout" => handle_logout(state),
        "auth.session" => handle_session(state),
        "auth.check" => handle_check(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
