//! Read-only pages of a signed-in student: courses, activities, grades and
//! progress, all derived from the same activity and submission records the
//! teacher pages write.

use serde_json::{json, Value};

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::grading::{percent_of, round_off_1_decimal, GradingScheme};
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Activity, Course, CourseStatus, Role, Student, SubmissionStatus};
use crate::repo::Repository;

/// One activity as seen by one student.
struct Entry<'a> {
    activity: &'a Activity,
    status: SubmissionStatus,
    score: Option<f64>,
}

impl Entry<'_> {
    fn is_done(&self) -> bool {
        self.status != SubmissionStatus::Pending
    }

    fn graded_percent(&self) -> Option<f64> {
        match (self.status, self.score) {
            (SubmissionStatus::Graded, Some(score)) => {
                Some(percent_of(score, self.activity.max_score))
            }
            _ => None,
        }
    }

    fn to_json(&self, scheme: &GradingScheme) -> Value {
        let pct = self.graded_percent();
        json!({
            "id": self.activity.id,
            "title": self.activity.title,
            "kind": self.activity.kind,
            "dueDate": self.activity.due_date,
            "maxScore": self.activity.max_score,
            "status": self.status,
            "score": self.score,
            "percentage": pct.map(|p| p.round()),
            "letter": pct.map(|p| scheme.letter_for(p).to_string()),
        })
    }
}

struct CourseView<'a> {
    course: &'a Course,
    entries: Vec<Entry<'a>>,
}

impl CourseView<'_> {
    fn completed(&self) -> usize {
        self.entries.iter().filter(|e| e.is_done()).count()
    }

    fn progress(&self) -> f64 {
        percent_of(self.completed() as f64, self.entries.len() as f64).round()
    }

    /// Mean percentage over graded work; `None` before anything is graded.
    fn average(&self) -> Option<f64> {
        let graded: Vec<f64> = self.entries.iter().filter_map(Entry::graded_percent).collect();
        if graded.is_empty() {
            return None;
        }
        Some(graded.iter().sum::<f64>() / graded.len() as f64)
    }

    fn latest_graded(&self) -> Option<&Entry<'_>> {
        self.entries
            .iter()
            .filter(|e| e.graded_percent().is_some())
            .max_by_key(|e| e.activity.due_date)
    }

    fn summary_json(&self, scheme: &GradingScheme) -> Value {
        let avg = self.average();
        json!({
            "id": self.course.id,
            "code": self.course.code,
            "title": self.course.title,
            "teacher": self.course.teacher,
            "section": self.course.section,
            "credits": self.course.credits,
            "completed": self.completed(),
            "total": self.entries.len(),
            "progress": self.progress(),
            "average": avg.map(round_off_1_decimal),
            "letter": avg.map(|a| scheme.letter_for(a).to_string()),
        })
    }
}

fn current_student<'a>(repo: &'a Repository, user_id: &str) -> PortalResult<&'a Student> {
    repo.students
        .find(|s| s.user_id.as_deref() == Some(user_id))
        .ok_or_else(|| PortalError::not_found("student profile", user_id))
}

fn course_for<'a>(repo: &'a Repository, student: &Student, code: &str) -> Option<&'a Course> {
    let approved = |c: &&Course| {
        c.status == CourseStatus::Approved && c.code.eq_ignore_ascii_case(code)
    };
    repo.courses
        .iter()
        .filter(approved)
        .find(|c| c.section == student.section)
        .or_else(|| repo.courses.iter().find(approved))
}

fn course_view<'a>(repo: &'a Repository, student: &Student, course: &'a Course) -> CourseView<'a> {
    let mut entries: Vec<Entry<'a>> = repo
        .activities
        .iter()
        .filter(|a| a.course_code.eq_ignore_ascii_case(&course.code) && a.section == course.section)
        .map(|a| {
            let sub = repo.submission(&a.id, &student.id);
            Entry {
                activity: a,
                status: sub.map_or(SubmissionStatus::Pending, |s| s.status),
                score: sub.and_then(|s| s.score),
            }
        })
        .collect();
    entries.sort_by(|a, b| b.activity.due_date.cmp(&a.activity.due_date));
    CourseView { course, entries }
}

fn enrolled_views<'a>(repo: &'a Repository, student: &'a Student) -> Vec<CourseView<'a>> {
    student
        .enrolled_courses
        .iter()
        .filter_map(|code| course_for(repo, student, code))
        .map(|c| course_view(repo, student, c))
        .collect()
}

fn handle_courses(state: &mut AppState) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Student)?;
    let repo = &state.repo;
    let student = current_student(repo, &user.id)?;
    let rows: Vec<Value> = enrolled_views(repo, student)
        .iter()
        .map(|v| v.summary_json(&repo.scheme))
        .collect();
    Ok(json!({ "courses": rows }))
}

/// `courseId` may be a course id or its code.
fn handle_course_details(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Student)?;
    let repo = &state.repo;
    let student = current_student(repo, &user.id)?;
    let wanted = required_str(params, "courseId")?;
    let views = enrolled_views(repo, student);
    let view = views
        .iter()
        .find(|v| v.course.id == wanted || v.course.code.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| PortalError::not_found("course", wanted))?;

    let latest = view.latest_graded().map(|e| {
        let pct = e.graded_percent().unwrap_or(0.0);
        json!({
            "title": e.activity.title,
            "score": e.score,
            "maxScore": e.activity.max_score,
            "percentage": round_off_1_decimal(pct),
        })
    });
    let activities: Vec<Value> = view.entries.iter().map(|e| e.to_json(&repo.scheme)).collect();
    Ok(json!({
        "course": view.summary_json(&repo.scheme),
        "activities": activities,
        "latestGrade": latest,
    }))
}

fn handle_activities(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Student)?;
    let repo = &state.repo;
    let student = current_student(repo, &user.id)?;
    let status = match optional_str(params, "status") {
        None | Some("all") => None,
        Some(raw) => Some(
            serde_json::from_value::<SubmissionStatus>(json!(raw))
                .map_err(|_| PortalError::bad_params(format!("unknown status {raw:?}")))?,
        ),
    };

    let views = enrolled_views(repo, student);
    let mut rows: Vec<(&Entry, &Course)> = views
        .iter()
        .flat_map(|v| v.entries.iter().map(move |e| (e, v.course)))
        .filter(|(e, _)| status.map_or(true, |s| e.status == s))
        .collect();
    rows.sort_by(|a, b| b.0.activity.due_date.cmp(&a.0.activity.due_date));
    let rows: Vec<Value> = rows
        .into_iter()
        .map(|(e, c)| {
            let mut v = e.to_json(&repo.scheme);
            v["course"] = json!(c.code);
            v["courseTitle"] = json!(c.title);
            v
        })
        .collect();
    Ok(json!({ "activities": rows }))
}

fn handle_grades(state: &mut AppState) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Student)?;
    let repo = &state.repo;
    let student = current_student(repo, &user.id)?;
    let rows: Vec<Value> = enrolled_views(repo, student)
        .iter()
        .map(|v| {
            let graded: Vec<Value> = v
                .entries
                .iter()
                .filter(|e| e.graded_percent().is_some())
                .map(|e| e.to_json(&repo.scheme))
                .collect();
            let mut row = v.summary_json(&repo.scheme);
            row["grades"] = json!(graded);
            row
        })
        .collect();
    Ok(json!({ "courses": rows }))
}

fn handle_progress(state: &mut AppState) -> PortalResult<Value> {
    let user = require_role(state.session.user(), Role::Student)?;
    let repo = &state.repo;
    let student = current_student(repo, &user.id)?;
    let views = enrolled_views(repo, student);
    let completed: usize = views.iter().map(CourseView::completed).sum();
    let total: usize = views.iter().map(|v| v.entries.len()).sum();
    let rows: Vec<Value> = views
        .iter()
        .map(|v| {
            json!({
                "code": v.course.code,
                "title": v.course.title,
                "completed": v.completed(),
                "total": v.entries.len(),
                "percentage": v.progress(),
            })
        })
        .collect();
    Ok(json!({
        "courses": rows,
        "overall": {
            "completed": completed,
            "total": total,
            "percentage": percent_of(completed as f64, total as f64).round(),
        },
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "student.courses" => handle_courses(state),
        "student.courseDetails" => handle_course_details(state, &req.params),
        "student.activities" => handle_activities(state, &req.params),
        "student.grades" => handle_grades(state),
        "student.progress" => handle_progress(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
