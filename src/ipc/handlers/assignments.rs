use serde_json::{json, Value};

use crate::auth::require_role;
use crate::error::PortalResult;
use crate::ipc::error::respond;
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use crate::model::Role;

/// One row per (teacher, course, section). A course with no sections still
/// gets a row so unstaffed assignments stay visible.
fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let needle = optional_str(params, "search")
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let repo = &state.repo;

    let mut rows = Vec::new();
    for teacher in repo.teachers.iter() {
        let name = teacher.full_name();
        for a in &teacher.assigned_courses {
            let haystack = format!(
                "{} {} {}",
                name,
                a.course,
                a.title.as_deref().unwrap_or("")
            )
            .to_lowercase();
            if !needle.is_empty() && !haystack.contains(&needle) {
                continue;
            }
            let base = json!({
                "teacherId": teacher.id,
                "teacher": name,
                "course": a.course,
                "title": a.title,
                "units": a.units,
            });
            if a.sections.is_empty() {
                let mut row = base.clone();
                row["section"] = Value::Null;
                row["students"] = json!(0);
                rows.push(row);
            }
            for section in &a.sections {
                let mut row = base.clone();
                row["section"] = json!(section);
                row["students"] = json!(repo.section_size(section));
                rows.push(row);
            }
        }
    }
    Ok(json!({ "assignments": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "assignments.list" => handle_list(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
