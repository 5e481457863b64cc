use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::catalog;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{non_blank, optional_str, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Activity, Course, CourseStatus, Role, Student, SubmissionStatus, User};
use crate::repo::{new_id, Repository};

const DEFAULT_SEMESTER: &str = "Fall 2024";
const DEFAULT_CREDITS: u32 = 3;

/// Courses are tied to their instructor by display name.
fn owns(user: &User, course: &Course) -> bool {
    course.teacher == user.name
}

fn owned_courses<'a>(repo: &'a Repository, user: &'a User) -> impl Iterator<Item = &'a Course> {
    repo.courses.iter().filter(move |c| owns(user, c))
}

fn enrolled_in<'a>(repo: &'a Repository, course: &'a Course) -> impl Iterator<Item = &'a Student> {
    repo.students.iter().filter(move |s| {
        s.section == course.section
            && s.enrolled_courses
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&course.code))
    })
}

fn course_activities<'a>(
    repo: &'a Repository,
    course: &'a Course,
) -> impl Iterator<Item = &'a Activity> {
    repo.activities.iter().filter(move |a| {
        a.course_code.eq_ignore_ascii_case(&course.code) && a.section == course.section
    })
}

fn activity_json(repo: &Repository, a: &Activity) -> Value {
    let (mut submitted, mut graded) = (0usize, 0usize);
    for s in repo.submissions_for_activity(&a.id) {
        match s.status {
            SubmissionStatus::Submitted => submitted += 1,
            SubmissionStatus::Graded => graded += 1,
            SubmissionStatus::Pending => {}
        }
    }
    let mut v = json!(a);
    v["submissions"] = json!(submitted + graded);
    v["graded"] = json!(graded);
    v
}

fn course_json(repo: &Repository, c: &Course) -> Value {
    let mut v = json!(c);
    v["studentCount"] = json!(enrolled_in(repo, c).count());
    v["activityCount"] = json!(course_activities(repo, c).count());
    v
}

/// Teachers see their own courses; admins see every course, pending ones
/// included, for approval.
fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = state.session.user().ok_or(PortalError::Unauthenticated)?;
    let status = match optional_str(params, "status") {
        None | Some("all") => None,
        Some("approved") => Some(CourseStatus::Approved),
        Some("pending") => Some(CourseStatus::Pending),
        Some(other) => {
            return Err(PortalError::bad_params(format!(
                "unknown course status {other:?}"
            )))
        }
    };
    let repo = &state.repo;
    let visible: Vec<&Course> = match user.role {
        Role::Admin => repo.courses.iter().collect(),
        Role::Teacher => owned_courses(repo, user).collect(),
        Role::Student => {
            return Err(PortalError::Forbidden {
                required: Role::Teacher,
            })
        }
    };
    let rows: Vec<Value> = visible
        .into_iter()
        .filter(|c| status.map_or(true, |s| c.status == s))
        .map(|c| course_json(repo, c))
        .collect();
    Ok(json!({ "courses": rows }))
}

fn require_owned<'a>(repo: &'a Repository, user: &User, id: &str) -> PortalResult<&'a Course> {
    let course = repo.courses.require(id)?;
    if !owns(user, course) {
        return Err(PortalError::not_found("course", id));
    }
    Ok(course)
}

fn handle_get(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Teacher)?;
    let repo = &state.repo;
    let course = require_owned(repo, user, required_str(params, "courseId")?)?;
    let activities: Vec<Value> = course_activities(repo, course)
        .map(|a| activity_json(repo, a))
        .collect();
    let roster: Vec<&Student> = enrolled_in(repo, course).collect();
    Ok(json!({
        "course": course_json(repo, course),
        "activities": activities,
        "students": roster,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseProposal {
    code: Option<String>,
    title: Option<String>,
    section: Option<String>,
    credits: Option<u32>,
    semester: Option<String>,
}

/// A proposed course waits for admin approval.
fn handle_create(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Teacher)?;
    let form: CourseProposal = parse_params(params)?;
    let code = non_blank(form.code.as_deref()).map(|c| c.to_uppercase());
    let known = code.as_deref().and_then(catalog::lookup);
    let title =
        non_blank(form.title.as_deref()).or_else(|| known.as_ref().map(|k| k.title.clone()));
    let (Some(code), Some(title), Some(section)) = (code, title, non_blank(form.section.as_deref()))
    else {
        return Err(PortalError::validation(
            "Course code, title and section are required",
        ));
    };
    if state
        .repo
        .courses
        .find(|c| c.code == code && c.section == section)
        .is_some()
    {
        return Err(PortalError::conflict(format!(
            "{code} is already offered in section {section}"
        )));
    }
    let course = Course {
        id: new_id(),
        code,
        title,
        section,
        teacher: user.name.clone(),
        credits: form
            .credits
            .or(known.map(|k| k.units))
            .unwrap_or(DEFAULT_CREDITS),
        semester: non_blank(form.semester.as_deref())
            .unwrap_or_else(|| DEFAULT_SEMESTER.to_string()),
        status: CourseStatus::Pending,
    };
    info!(id = %course.id, code = %course.code, teacher = %course.teacher, "course proposed");
    state.repo.courses.insert(course.clone());
    Ok(json!({ "course": course }))
}

fn handle_approve(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let course = state.repo.courses.require_mut(required_str(params, "courseId")?)?;
    if course.status == CourseStatus::Approved {
        return Err(PortalError::conflict(format!(
            "{} is already approved",
            course.code
        )));
    }
    course.status = CourseStatus::Approved;
    info!(id = %course.id, code = %course.code, "course approved");
    Ok(json!({ "course": course }))
}

fn handle_activities(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Teacher)?;
    let course_filter = optional_str(params, "course").filter(|c| *c != "all");
    let repo = &state.repo;
    let mut rows = Vec::new();
    for course in owned_courses(repo, user) {
        if course_filter.is_some_and(|code| !code.eq_ignore_ascii_case(&course.code)) {
            continue;
        }
        for a in course_activities(repo, course) {
            let mut v = activity_json(repo, a);
            v["courseTitle"] = json!(course.title);
            rows.push(v);
        }
    }
    Ok(json!({ "activities": rows }))
}

fn handle_students(state: &mut AppState) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Teacher)?;
    let repo = &state.repo;
    let mut rows = Vec::new();
    for course in owned_courses(repo, user).filter(|c| c.status == CourseStatus::Approved) {
        for s in enrolled_in(repo, course) {
            rows.push(json!({
                "id": s.id,
                "name": s.name,
                "email": s.email,
                "studentId": s.student_id,
                "section": s.section,
                "course": course.code,
                "courseTitle": course.title,
            }));
        }
    }
    Ok(json!({ "students": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "courses.list" => handle_list(state, &req.params),
        "courses.get" => handle_get(state, &req.params),
        "courses.create" => handle_create(state, &req.params),
        "courses.approve" => handle_approve(state, &req.params),
        "activities.list" => handle_activities(state, &req.params),
        "teacher.students" => handle_students(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
