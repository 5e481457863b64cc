use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::catalog::{self, SECTION_LABELS};
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{non_blank, optional_str, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::listing::{self, ListQuery};
use crate::model::{ActiveStatus, CourseAssignment, Role, Teacher};
use crate::repo::new_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeacherForm {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    employee_id: Option<String>,
    phone: Option<String>,
    status: Option<ActiveStatus>,
    assigned_courses: Option<Vec<CourseAssignment>>,
}

/// Normalizes one assigned-course row: the code is upper-cased, a known
/// catalog code fills in a missing title and unit count, and sections must
/// be real section labels.
fn normalize_assignment(mut a: CourseAssignment) -> PortalResult<CourseAssignment> {
    let code = a.course.trim().to_uppercase();
    if code.is_empty() {
        return Err(PortalError::validation(
            "Each assigned course needs a course code",
        ));
    }
    if let Some(known) = catalog::lookup(&code) {
        a.title = a.title.filter(|t| !t.trim().is_empty()).or(Some(known.title));
        a.units = a.units.or(Some(known.units));
    }
    a.course = code;
    a.sections = a
        .sections
        .iter()
        .filter_map(|s| non_blank(Some(s)))
        .collect();
    for s in &a.sections {
        if !SECTION_LABELS.contains(&s.as_str()) {
            return Err(PortalError::validation(format!(
                "Unknown section {s}; expected one of {}",
                SECTION_LABELS.join(", ")
            )));
        }
    }
    a.sections.sort();
    a.sections.dedup();
    Ok(a)
}

impl TeacherForm {
    fn apply_to(self, mut base: Teacher) -> PortalResult<Teacher> {
        if let Some(v) = self.first_name {
            base.first_name = v.trim().to_string();
        }
        if let Some(v) = self.last_name {
            base.last_name = v.trim().to_string();
        }
        if let Some(v) = self.email {
            base.email = v.trim().to_string();
        }
        if let Some(v) = self.employee_id {
            base.employee_id = v.trim().to_string();
        }
        if [&base.first_name, &base.last_name, &base.email, &base.employee_id]
            .iter()
            .any(|f| f.is_empty())
        {
            return Err(PortalError::validation(
                "First name, last name, email and employee ID are required",
            ));
        }
        if let Some(v) = self.phone {
            base.phone = non_blank(Some(&v));
        }
        if let Some(s) = self.status {
            base.status = s;
        }
        if let Some(rows) = self.assigned_courses {
            base.assigned_courses = rows
                .into_iter()
                .map(normalize_assignment)
                .collect::<PortalResult<Vec<_>>>()?;
        }
        Ok(base)
    }
}

fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let query = ListQuery::from_params(params)?;
    let rows = listing::apply(state.repo.teachers.iter(), &query)?;
    Ok(json!({
        "total": state.repo.teachers.len(),
        "teachers": rows,
    }))
}

fn handle_get(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let teacher = state.repo.teachers.require(required_str(params, "id")?)?;
    Ok(json!({ "teacher": teacher }))
}

fn handle_create(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: TeacherForm = parse_params(params)?;
    let blank = Teacher {
        id: new_id(),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        employee_id: String::new(),
        phone: None,
        status: ActiveStatus::Active,
        assigned_courses: Vec::new(),
    };
    let teacher = form.apply_to(blank)?;
    info!(id = %teacher.id, employee_id = %teacher.employee_id, "teacher created");
    state.repo.teachers.insert(teacher.clone());
    Ok(json!({ "teacher": teacher }))
}

fn handle_update(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: TeacherForm = parse_params(params)?;
    let id = form
        .id
        .clone()
        .ok_or_else(|| PortalError::bad_params("missing params.id"))?;
    let current = state.repo.teachers.require(&id)?.clone();
    let teacher = form.apply_to(current)?;
    state.repo.teachers.replace(teacher.clone())?;
    Ok(json!({ "teacher": teacher }))
}

fn handle_delete(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let removed = state.repo.teachers.remove(required_str(params, "id")?)?;
    info!(id = %removed.id, "teacher deleted");
    Ok(json!({ "ok": true }))
}

fn handle_suggest(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let query = optional_str(params, "query").unwrap_or("");
    Ok(json!({
        "suggestions": catalog::suggest(query),
        "sections": SECTION_LABELS,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "teachers.list" => handle_list(state, &req.params),
        "teachers.get" => handle_get(state, &req.params),
        "teachers.create" => handle_create(state, &req.params),
        "teachers.update" => handle_update(state, &req.params),
        "teachers.delete" => handle_delete(state, &req.params),
        "catalog.suggest" => handle_suggest(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
