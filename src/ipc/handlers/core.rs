use crate::db;
use crate::error::PortalResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::session::{Session, SqliteStore};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState) -> PortalResult<Value> {
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
        "authenticated": state.session.is_authenticated(),
    }))
}

/// Opens (or creates) the workspace database and re-reads the session from
/// it. Whatever was signed in before is replaced by the stored user.
pub fn select_workspace(state: &mut AppState, path: PathBuf) -> PortalResult<()> {
    let conn = db::open_db(&path)?;
    state.session = Session::restore(Box::new(SqliteStore::new(conn)));
    info!(workspace = %path.display(), "workspace selected");
    state.workspace = Some(path);
    Ok(())
}

fn handle_workspace_select(
    state: &mut AppState,
    params: &Value,
) -> PortalResult<Value> {
    let path = PathBuf::from(required_str(params, "path")?);
    select_workspace(state, path.clone())?;
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "user": state.session.user(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state),
        "workspace.select" => handle_workspace_select(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
