//! Path → page table, with `:param` segments, a required role per page and
//! a catch-all `not_found` page.

use std::collections::BTreeMap;

use serde::Serialize;
use url::Url;

use crate::error::{PortalError, PortalResult, AUTH_PATH};
use crate::grading::Term;
use crate::model::{Role, User};

const BASE: &str = "http://edutrack.local/";

pub const NOT_FOUND_PAGE: &str = "not_found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub page: &'static str,
    pub role: Option<Role>,
}

const fn route(pattern: &'static str, page: &'static str, role: Option<Role>) -> RouteDef {
    RouteDef {
        pattern,
        page,
        role,
    }
}

const STUDENT: Option<Role> = Some(Role::Student);
const TEACHER: Option<Role> = Some(Role::Teacher);
const ADMIN: Option<Role> = Some(Role::Admin);

pub const ROUTES: &[RouteDef] = &[
    route("/", "index", None),
    route("/auth", "auth", None),
    route("/student", "student.dashboard", STUDENT),
    route("/student/dashboard", "student.dashboard", STUDENT),
    route("/student/courses", "student.courses", STUDENT),
    route("/student/courses/:courseId", "student.course_details", STUDENT),
    route("/student/activities", "student.activities", STUDENT),
    route("/student/grades", "student.grades", STUDENT),
    route("/student/progress", "student.progress", STUDENT),
    route("/teacher", "teacher.dashboard", TEACHER),
    route("/teacher/dashboard", "teacher.dashboard", TEACHER),
    route("/teacher/courses", "teacher.courses", TEACHER),
    route("/teacher/courses/:courseId", "teacher.course_management", TEACHER),
    route("/teacher/activities", "teacher.activities", TEACHER),
    route("/teacher/students", "teacher.students", TEACHER),
    route("/teacher/grades", "teacher.grades", TEACHER),
    route("/teacher/grades/edit", "teacher.grades_edit", TEACHER),
    route("/admin", "admin.dashboard", ADMIN),
    route("/admin/dashboard", "admin.dashboard", ADMIN),
    route("/admin/users", "admin.users", ADMIN),
    route("/admin/users/students", "admin.students", ADMIN),
    route("/admin/users/teachers", "admin.teachers", ADMIN),
    route("/admin/users/sections", "admin.sections", ADMIN),
    route("/admin/users/sections/:sectionId", "admin.section_details", ADMIN),
    route("/admin/grading", "admin.grading", ADMIN),
    route("/admin/assignments", "admin.assignments", ADMIN),
    route("/admin/enrollment", "admin.enrollment", ADMIN),
    route("/admin/announcements", "admin.announcements", ADMIN),
    route("/admin/payments", "admin.payments", ADMIN),
    route("/admin/pdf", "admin.pdf", ADMIN),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    pub path: String,
    /// `None` for the catch-all.
    pub pattern: Option<&'static str>,
    pub page: &'static str,
    pub required_role: Option<Role>,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, path_segments: &[String]) -> Option<BTreeMap<String, String>> {
    let pat = segments(pattern);
    if pat.len() != path_segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (p, actual) in pat.iter().zip(path_segments) {
        match p.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), actual.clone());
            }
            None if *p == actual.as_str() => {}
            None => return None,
        }
    }
    Some(params)
}

/// Resolves a browser-style target (`/path?query`) against the table.
pub fn resolve(target: &str) -> PortalResult<RouteMatch> {
    let base = Url::parse(BASE).map_err(|e| PortalError::bad_params(e.to_string()))?;
    let url = base
        .join(target)
        .map_err(|e| PortalError::bad_params(format!("bad path {target:?}: {e}")))?;

    let mut decoded = Vec::new();
    for seg in segments(url.path()) {
        let seg = urlencoding::decode(seg)
            .map_err(|e| PortalError::bad_params(format!("bad path segment {seg:?}: {e}")))?;
        decoded.push(seg.into_owned());
    }
    let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    let path = url.path().to_string();

    for def in ROUTES {
        if let Some(params) = match_pattern(def.pattern, &decoded) {
            return Ok(RouteMatch {
                path,
                pattern: Some(def.pattern),
                page: def.page,
                required_role: def.role,
                params,
                query,
            });
        }
    }
    Ok(RouteMatch {
        path,
        pattern: None,
        page: NOT_FOUND_PAGE,
        required_role: None,
        params: BTreeMap::new(),
        query,
    })
}

/// `None` when the user may open the page, otherwise where to send them.
pub fn redirect_for(m: &RouteMatch, user: Option<&User>) -> Option<&'static str> {
    match (m.required_role, user) {
        (None, _) => None,
        (Some(role), Some(u)) if u.role == role => None,
        _ => Some(AUTH_PATH),
    }
}

/// Class-record context the grade editor reads from its query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEditorContext {
    pub course: String,
    pub section: String,
    pub term: Term,
    pub semester: String,
}

impl GradeEditorContext {
    pub const DEFAULT_COURSE: &'static str = "cs101";
    pub const DEFAULT_SECTION: &'static str = "12-polaris";
    pub const DEFAULT_TERM: &'static str = "midterm";
    pub const DEFAULT_SEMESTER: &'static str = "1st";

    /// Builds the context from any key lookup; empty values fall back to
    /// the defaults.
    pub fn from_lookup<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Self {
        let pick = |key: &str, default: &str| -> String {
            get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            course: pick("course", Self::DEFAULT_COURSE),
            section: pick("section", Self::DEFAULT_SECTION),
            term: Term::from_query(&pick("term", Self::DEFAULT_TERM)),
            semester: pick("semester", Self::DEFAULT_SEMESTER),
        }
    }

    pub fn from_query(m: &RouteMatch) -> Self {
        Self::from_lookup(|k| m.query.get(k).map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "9".into(),
            email: "x@demo.com".into(),
            name: "X".into(),
            role,
        }
    }

    #[test]
    fn static_and_param_routes() {
        let m = resolve("/student/dashboard").expect("resolve");
        assert_eq!(m.page, "student.dashboard");
        assert_eq!(m.required_role, Some(Role::Student));

        let m = resolve("/admin/users/sections/42").expect("resolve");
        assert_eq!(m.page, "admin.section_details");
        assert_eq!(m.params.get("sectionId").map(String::as_str), Some("42"));

        let m = resolve("/teacher/courses/CS%20101/").expect("resolve");
        assert_eq!(m.page, "teacher.course_management");
        assert_eq!(m.params.get("courseId").map(String::as_str), Some("CS 101"));
    }

    #[test]
    fn unknown_paths_hit_the_catch_all() {
        let m = resolve("/nope/never").expect("resolve");
        assert_eq!(m.page, NOT_FOUND_PAGE);
        assert_eq!(m.pattern, None);
        assert_eq!(redirect_for(&m, None), None);
    }

    #[test]
    fn grade_editor_defaults_and_overrides() {
        let m = resolve("/teacher/grades/edit").expect("resolve");
        let ctx = GradeEditorContext::from_query(&m);
        assert_eq!(ctx.course, "cs101");
        assert_eq!(ctx.section, "12-polaris");
        assert_eq!(ctx.term, Term::Midterm);
        assert_eq!(ctx.semester, "1st");

        let m = resolve("/teacher/grades/edit?course=math101&term=final&semester=2nd&section=")
            .expect("resolve");
        let ctx = GradeEditorContext::from_query(&m);
        assert_eq!(ctx.course, "math101");
        assert_eq!(ctx.section, "12-polaris");
        assert_eq!(ctx.term, Term::Final);
        assert_eq!(ctx.semester, "2nd");
    }

    #[test]
    fn role_guard_redirects_to_auth() {
        let m = resolve("/admin/payments").expect("resolve");
        assert_eq!(redirect_for(&m, None), Some("/auth"));
        assert_eq!(redirect_for(&m, Some(&user(Role::Teacher))), Some("/auth"));
        assert_eq!(redirect_for(&m, Some(&user(Role::Admin))), None);

        let m = resolve("/").expect("resolve");
        assert_eq!(redirect_for(&m, None), None);
    }

    #[test]
    fn announcements_page_is_admin_only() {
        let m = resolve("/admin/announcements").expect("resolve");
        assert_eq!(m.page, "admin.announcements");
        assert_eq!(m.required_role, Some(Role::Admin));
        assert_eq!(redirect_for(&m, Some(&user(Role::Student))), Some("/auth"));
        assert_eq!(redirect_for(&m, Some(&user(Role::Admin))), None);
    }
}
