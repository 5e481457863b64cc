use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{EnrollmentRequest, EnrollmentStatus, Role};

fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let status = match optional_str(params, "status") {
        None | Some("all") => None,
        Some(raw) => Some(
            EnrollmentStatus::parse(raw)
                .ok_or_else(|| PortalError::bad_params(format!("unknown status {raw:?}")))?,
        ),
    };
    let requests: Vec<&EnrollmentRequest> = state
        .repo
        .enrollment
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .collect();
    let pending = state
        .repo
        .enrollment
        .iter()
        .filter(|r| r.status == EnrollmentStatus::Pending)
        .count();
    Ok(json!({
        "requests": requests,
        "pendingCount": pending,
    }))
}

/// Approving or rejecting only flips the request status.
fn handle_decide(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let decision = match required_str(params, "decision")? {
        "approve" => EnrollmentStatus::Approved,
        "reject" => EnrollmentStatus::Rejected,
        other => {
            return Err(PortalError::bad_params(format!(
                "decision must be approve or reject, got {other:?}"
            )))
        }
    };
    let request = state
        .repo
        .enrollment
        .require_mut(required_str(params, "requestId")?)?;
    if request.status != EnrollmentStatus::Pending {
        return Err(PortalError::conflict("Only pending requests can be decided"));
    }
    request.status = decision;
    info!(id = %request.id, status = ?decision, "enrollment request decided");
    Ok(json!({ "request": request }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "enrollment.list" => handle_list(state, &req.params),
        "enrollment.decide" => handle_decide(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
