use serde_json::{json, Value};

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{Payment, PaymentStatus, Role};

/// Display only; nothing here moves money.
fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let status = match optional_str(params, "status") {
        None | Some("all") => None,
        Some(raw) => Some(
            PaymentStatus::parse(raw)
                .ok_or_else(|| PortalError::bad_params(format!("unknown status {raw:?}")))?,
        ),
    };
    let all: Vec<&Payment> = state.repo.payments.iter().collect();
    let total_of = |s: PaymentStatus| -> i64 {
        all.iter()
            .filter(|p| p.status == s)
            .map(|p| p.amount_cents)
            .sum()
    };
    let totals = json!({
        "paidCents": total_of(PaymentStatus::Paid),
        "pendingCents": total_of(PaymentStatus::Pending),
        "count": all.len(),
    });
    let payments: Vec<&Payment> = all
        .iter()
        .copied()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect();
    Ok(json!({
        "payments": payments,
        "totals": totals,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "payments.list" => handle_list(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
