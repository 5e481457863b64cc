use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{non_blank, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::listing::{self, ListQuery};
use crate::model::{Account, ActiveStatus, Role};
use crate::repo::new_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountForm {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    status: Option<ActiveStatus>,
}

fn required_fields(name: Option<String>, email: Option<String>) -> PortalResult<(String, String)> {
    match (name, email) {
        (Some(n), Some(e)) => Ok((n, e)),
        _ => Err(PortalError::validation("Name and email are required")),
    }
}

fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let query = ListQuery::from_params(params)?;
    let rows = listing::apply(state.repo.accounts.iter(), &query)?;
    Ok(json!({
        "total": state.repo.accounts.len(),
        "users": rows,
    }))
}

fn handle_create(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: AccountForm = parse_params(params)?;
    let (name, email) = required_fields(
        non_blank(form.name.as_deref()),
        non_blank(form.email.as_deref()),
    )?;
    let account = Account {
        id: new_id(),
        name,
        email,
        role: form.role.unwrap_or(Role::Student),
        status: form.status.unwrap_or_default(),
    };
    info!(id = %account.id, role = %account.role, "account created");
    state.repo.accounts.insert(account.clone());
    Ok(json!({ "user": account }))
}

fn handle_update(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: AccountForm = parse_params(params)?;
    let id = form
        .id
        .as_deref()
        .ok_or_else(|| PortalError::bad_params("missing params.id"))?;
    let mut account = state.repo.accounts.require(id)?.clone();

    let (name, email) = required_fields(
        non_blank(form.name.as_deref().or(Some(account.name.as_str()))),
        non_blank(form.email.as_deref().or(Some(account.email.as_str()))),
    )?;
    account.name = name;
    account.email = email;
    if let Some(role) = form.role {
        account.role = role;
    }
    if let Some(status) = form.status {
        account.status = status;
    }
    state.repo.accounts.replace(account.clone())?;
    Ok(json!({ "user": account }))
}

fn handle_delete(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let id = required_str(params, "id")?;
    let removed = state.repo.accounts.remove(id)?;
    info!(id = %removed.id, "account deleted");
    Ok(json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "accounts.list" => handle_list(state, &req.params),
        "accounts.create" => handle_create(state, &req.params),
        "accounts.update" => handle_update(state, &req.params),
        "accounts.delete" => handle_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
