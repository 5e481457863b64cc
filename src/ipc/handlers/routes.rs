use serde_json::{json, Value};

use crate::error::PortalResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::routes::{self, GradeEditorContext, ROUTES};

fn handle_resolve(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let m = routes::resolve(required_str(params, "path")?)?;
    let redirect = routes::redirect_for(&m, state.session.user());
    let grade_editor =
        (m.page == "teacher.grades_edit").then(|| GradeEditorContext::from_query(&m));
    Ok(json!({
        "route": m,
        "allowed": redirect.is_none(),
        "redirect": redirect,
        "gradeEditor": grade_editor,
    }))
}

fn handle_list() -> PortalResult<Value> {
    let rows: Vec<Value> = ROUTES
        .iter()
        .map(|r| {
            json!({
                "pattern": r.pattern,
                "page": r.page,
                "requiredRole": r.role,
            })
        })
        .collect();
    Ok(json!({ "routes": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "routes.resolve" => handle_resolve(state, &req.params),
        "routes.list" => handle_list(),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
