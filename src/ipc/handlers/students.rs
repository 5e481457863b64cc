use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{non_blank, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::listing::{self, ListQuery};
use crate::model::{ParentContact, Role, Student, StudentStatus};
use crate::repo::{new_id, Repository};

const DEFAULT_SECTION: &str = "A";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentForm {
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    student_id: Option<String>,
    year_level: Option<u8>,
    section: Option<String>,
    phone: Option<String>,
    parent_contact: Option<ParentContact>,
    status: Option<StudentStatus>,
    enrolled_courses: Option<Vec<String>>,
}

impl StudentForm {
    /// Overlays the form on `base`; blank text fields keep nothing.
    fn apply_to(self, mut base: Student) -> PortalResult<Student> {
        if let Some(v) = self.name {
            base.name = v.trim().to_string();
        }
        if let Some(v) = self.email {
            base.email = v.trim().to_string();
        }
        if let Some(v) = self.student_id {
            base.student_id = v.trim().to_string();
        }
        if base.name.is_empty() || base.email.is_empty() || base.student_id.is_empty() {
            return Err(PortalError::validation(
                "Name, email and student ID are required",
            ));
        }
        if let Some(y) = self.year_level {
            base.year_level = y;
        }
        if !(1..=4).contains(&base.year_level) {
            return Err(PortalError::validation("Year level must be between 1 and 4"));
        }
        if let Some(v) = self.section {
            base.section = non_blank(Some(&v)).unwrap_or_else(|| DEFAULT_SECTION.to_string());
        }
        if let Some(v) = self.phone {
            base.phone = non_blank(Some(&v));
        }
        if let Some(pc) = self.parent_contact {
            base.parent_contact = match (non_blank(Some(&pc.name)), non_blank(Some(&pc.phone))) {
                (None, None) => None,
                (name, phone) => Some(ParentContact {
                    name: name.unwrap_or_default(),
                    phone: phone.unwrap_or_default(),
                }),
            };
        }
        if let Some(s) = self.status {
            base.status = s;
        }
        if let Some(courses) = self.enrolled_courses {
            base.enrolled_courses = courses
                .iter()
                .filter_map(|c| non_blank(Some(c)))
                .collect();
        }
        Ok(base)
    }
}

fn ensure_unique_student_id(repo: &Repository, student: &Student) -> PortalResult<()> {
    let clash = repo
        .students
        .find(|s| s.id != student.id && s.student_id == student.student_id);
    match clash {
        Some(_) => Err(PortalError::conflict(format!(
            "student ID {} is already in use",
            student.student_id
        ))),
        None => Ok(()),
    }
}

fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let query = ListQuery::from_params(params)?;
    let rows = listing::apply(state.repo.students.iter(), &query)?;
    Ok(json!({
        "total": state.repo.students.len(),
        "students": rows,
    }))
}

/// Distinct sections for the filter dropdown.
fn handle_sections(state: &mut AppState) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let sections: BTreeSet<&str> = state
        .repo
        .students
        .iter()
        .map(|s| s.section.as_str())
        .collect();
    Ok(json!({ "sections": sections }))
}

fn handle_get(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let student = state.repo.students.require(required_str(params, "id")?)?;
    Ok(json!({ "student": student }))
}

fn handle_create(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: StudentForm = parse_params(params)?;
    let blank = Student {
        id: new_id(),
        name: String::new(),
        email: String::new(),
        student_id: String::new(),
        year_level: 1,
        section: DEFAULT_SECTION.to_string(),
        phone: None,
        parent_contact: None,
        status: StudentStatus::Active,
        enrolled_courses: Vec::new(),
        user_id: None,
    };
    let student = form.apply_to(blank)?;
    ensure_unique_student_id(&state.repo, &student)?;
    info!(id = %student.id, student_id = %student.student_id, "student created");
    state.repo.students.insert(student.clone());
    Ok(json!({ "student": student }))
}

fn handle_update(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: StudentForm = parse_params(params)?;
    let id = form
        .id
        .clone()
        .ok_or_else(|| PortalError::bad_params("missing params.id"))?;
    let current = state.repo.students.require(&id)?.clone();
    let student = form.apply_to(current)?;
    ensure_unique_student_id(&state.repo, &student)?;
    state.repo.students.replace(student.clone())?;
    Ok(json!({ "student": student }))
}

/// Students are never removed, only marked inactive.
fn handle_delete(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let student = state.repo.students.require_mut(required_str(params, "id")?)?;
    student.status = StudentStatus::Inactive;
    info!(id = %student.id, "student inactivated");
    Ok(json!({ "student": student }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state, &req.params),
        "students.sections" => handle_sections(state),
        "students.get" => handle_get(state, &req.params),
        "students.create" => handle_create(state, &req.params),
        "students.update" => handle_update(state, &req.params),
        "students.delete" => handle_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
