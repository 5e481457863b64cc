use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::catalog;
use crate::error::{PortalError, PortalResult};
use crate::grading::{
    self, ClassRecord, Component, GradeBand, GradeRow, GradingScheme, RecordKey, Score, Weights,
};
use crate::ipc::error::respond;
use crate::ipc::helpers::{optional_str, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Role;
use crate::repo::Repository;
use crate::routes::GradeEditorContext;

fn context_from(params: &Value) -> GradeEditorContext {
    GradeEditorContext::from_lookup(|k| optional_str(params, k))
}

fn record_key(ctx: &GradeEditorContext) -> RecordKey {
    RecordKey::new(&ctx.course, &ctx.section, ctx.term)
}

/// Blank rows for the students of the key's section taking its course.
fn new_record(repo: &Repository, key: &RecordKey) -> ClassRecord {
    let rows: Vec<GradeRow> = repo
        .students
        .iter()
        .filter(|s| {
            s.section.eq_ignore_ascii_case(&key.section)
                && s.enrolled_courses
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&key.course))
        })
        .map(|s| GradeRow::blank(&s.student_id, &s.name))
        .collect();
    ClassRecord::new(key.clone(), rows)
}

/// Stores a fresh record on first write.
fn ensure_record<'a>(repo: &'a mut Repository, key: &RecordKey) -> &'a mut ClassRecord {
    if !repo.class_records.contains_key(key) {
        let record = new_record(repo, key);
        info!(
            course = %key.course,
            section = %key.section,
            term = %key.term,
            rows = record.rows.len(),
            "class record started"
        );
        repo.class_records.insert(key.clone(), record);
    }
    repo.class_records
        .entry(key.clone())
        .or_insert_with(|| ClassRecord::new(key.clone(), Vec::new()))
}

fn course_info(repo: &Repository, code: &str) -> Value {
    if let Some(c) = repo.courses.find(|c| c.code.eq_ignore_ascii_case(code)) {
        return json!({ "code": c.code, "title": c.title, "units": c.credits });
    }
    match catalog::lookup(code) {
        Some(k) => json!(k),
        None => Value::Null,
    }
}

fn hps_json(scheme: &GradingScheme) -> Value {
    json!({
        "written": scheme.written_hps,
        "writtenTotal": scheme.hps_total(Component::Written),
        "performance": scheme.performance_hps,
        "performanceTotal": scheme.hps_total(Component::Performance),
        "exam": scheme.exam_hps,
    })
}

fn record_json(
    repo: &Repository,
    ctx: &GradeEditorContext,
    record: &ClassRecord,
    scheme: &GradingScheme,
) -> Value {
    json!({
        "context": {
            "course": ctx.course,
            "section": ctx.section,
            "term": ctx.term,
            "termLabel": ctx.term.label(),
            "semester": ctx.semester,
        },
        "courseInfo": course_info(repo, &ctx.course),
        "weights": scheme.weights,
        "hps": hps_json(scheme),
        "rows": record.compute(scheme),
        "summary": record.summarize(scheme),
        "savedAt": record.saved_at.map(|t| t.to_rfc3339()),
    })
}

fn handle_record_get(state: &AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Teacher)?;
    let ctx = context_from(params);
    let key = record_key(&ctx);
    let fresh;
    let record = match state.repo.class_records.get(&key) {
        Some(stored) => stored,
        None => {
            fresh = new_record(&state.repo, &key);
            &fresh
        }
    };
    Ok(record_json(&state.repo, &ctx, record, &state.repo.scheme))
}

/// Blank is `null` or an empty string; anything else must be a number.
fn parse_score(raw: Option<&Value>) -> PortalResult<Score> {
    match raw {
        None => Err(PortalError::bad_params("missing params.value")),
        Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| PortalError::bad_params("score is not a number")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| PortalError::bad_params(format!("score {s:?} is not a number"))),
        Some(_) => Err(PortalError::bad_params("score must be a number or null")),
    }
}

fn handle_set_score(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Teacher)?;
    let ctx = context_from(params);
    let key = record_key(&ctx);
    let student_id = required_str(params, "studentId")?;
    let component = required_str(params, "component")?;
    let component = Component::parse(component)
        .ok_or_else(|| PortalError::bad_params(format!("unknown component {component:?}")))?;
    let item = match params.get("item") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .map(|i| i as usize)
                .ok_or_else(|| PortalError::bad_params("item must be a non-negative integer"))?,
        ),
    };
    let value = parse_score(params.get("value"))?;

    let scheme = state.repo.scheme.clone();
    let record = ensure_record(&mut state.repo, &key);
    record.set_score(&scheme, student_id, component, item, value)?;
    let row = record
        .rows
        .iter()
        .find(|r| r.student_id == student_id)
        .map(|r| grading::compute_row(&scheme, r))
        .ok_or_else(|| PortalError::not_found("class record row", student_id))?;
    Ok(json!({ "row": row }))
}

fn handle_record_save(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Teacher)?;
    let ctx = context_from(params);
    let key = record_key(&ctx);
    let scheme = state.repo.scheme.clone();
    let record = ensure_record(&mut state.repo, &key);
    let saved_at = chrono::Utc::now();
    record.saved_at = Some(saved_at);
    let summary = record.summarize(&scheme);
    info!(
        course = %key.course,
        section = %key.section,
        term = %key.term,
        students = summary.total_students,
        blank_cells = summary.blank_cells,
        "class record saved"
    );
    Ok(json!({
        "savedAt": saved_at.to_rfc3339(),
        "summary": summary,
    }))
}

fn handle_transmute(params: &Value) -> PortalResult<Value> {
    let pct = params
        .get("initialGrade")
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .ok_or_else(|| PortalError::bad_params("missing params.initialGrade"))?;
    let rounded = grading::round_off_2_decimals(pct);
    Ok(json!({
        "initialGrade": rounded,
        "finalGrade": grading::transmute(rounded),
    }))
}

fn handle_scheme_get(state: &mut AppState) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    Ok(json!({ "scheme": state.repo.scheme }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemePatch {
    weights: Option<Weights>,
    written_hps: Option<Vec<f64>>,
    performance_hps: Option<Vec<f64>>,
    exam_hps: Option<f64>,
    letter_scale: Option<Vec<GradeBand>>,
}

/// Every score already entered must still fit under the new HPS.
fn check_existing_scores(repo: &Repository, scheme: &GradingScheme) -> PortalResult<()> {
    for record in repo.class_records.values() {
        for row in &record.rows {
            let cells = row
                .written
                .iter()
                .enumerate()
                .map(|(i, s)| (Component::Written, Some(i), *s))
                .chain(
                    row.performance
                        .iter()
                        .enumerate()
                        .map(|(i, s)| (Component::Performance, Some(i), *s)),
                )
                .chain(std::iter::once((Component::Exam, None, row.exam)));
            for (component, item, value) in cells {
                if scheme.check_score(component, item, value).is_err() {
                    return Err(PortalError::conflict(format!(
                        "{} in {} {} already has scores above the new HPS",
                        row.name, record.key.course, record.key.section
                    )));
                }
            }
        }
    }
    Ok(())
}

fn handle_scheme_update(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let patch: SchemePatch = parse_params(params)?;
    let mut next = state.repo.scheme.clone();
    if let Some(w) = patch.weights {
        next.weights = w;
    }
    if let Some(v) = patch.written_hps {
        next.written_hps = v;
    }
    if let Some(v) = patch.performance_hps {
        next.performance_hps = v;
    }
    if let Some(v) = patch.exam_hps {
        next.exam_hps = v;
    }
    if let Some(v) = patch.letter_scale {
        next.letter_scale = v;
    }
    next.validate()?;
    check_existing_scores(&state.repo, &next)?;
    info!(
        written = next.weights.written,
        performance = next.weights.performance,
        exam = next.weights.exam,
        "grading scheme updated"
    );
    state.repo.scheme = next;
    Ok(json!({ "scheme": state.repo.scheme }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "grades.record.get" => handle_record_get(state, &req.params),
        "grades.record.setScore" => handle_set_score(state, &req.params),
        "grades.record.save" => handle_record_save(state, &req.params),
        "grades.transmute" => handle_transmute(&req.params),
        "grading.scheme.get" => handle_scheme_get(state),
        "grading.scheme.update" => handle_scheme_update(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::grading::Term;
    use crate::session::Session;
    use serde_json::json;

    fn teacher_state() -> AppState {
        let mut session = Session::in_memory();
        session.login("teacher@demo.com", "demo123").expect("login");
        AppState::new(session, fixtures::demo_repository())
    }

    #[test]
    fn score_parsing_keeps_blank_distinct_from_zero() {
        assert_eq!(parse_score(Some(&Value::Null)).expect("null"), None);
        assert_eq!(parse_score(Some(&json!(""))).expect("empty"), None);
        assert_eq!(parse_score(Some(&json!(0))).expect("zero"), Some(0.0));
        assert_eq!(parse_score(Some(&json!(" 7.5 "))).expect("text"), Some(7.5));
        assert_eq!(parse_score(Some(&json!("abc"))).unwrap_err().code(), "bad_params");
        assert_eq!(parse_score(None).unwrap_err().code(), "bad_params");
    }

    #[test]
    fn transmute_rounds_before_lookup() {
        let v = handle_transmute(&json!({ "initialGrade": 74.996 })).expect("transmute");
        assert_eq!(v["initialGrade"], json!(75.0));
        assert_eq!(v["finalGrade"], "3.00");
        let v = handle_transmute(&json!({ "initialGrade": 74.99 })).expect("transmute");
        assert_eq!(v["finalGrade"], "5.00");
    }

    #[test]
    fn reading_a_record_does_not_store_it() {
        let mut state = teacher_state();
        let before = state.repo.class_records.len();
        let params = json!({ "course": "ZZZ999", "section": "Q", "term": "final" });

        let v = handle_record_get(&state, &params).expect("get");
        assert_eq!(v["courseInfo"], Value::Null);
        assert_eq!(v["rows"], json!([]));
        assert_eq!(state.repo.class_records.len(), before);

        handle_record_save(&mut state, &params).expect("save");
        assert_eq!(state.repo.class_records.len(), before + 1);
    }

    #[test]
    fn new_record_rows_follow_the_section() {
        let state = teacher_state();
        let key = RecordKey::new("MATH101", "A", Term::Final);
        let names: Vec<String> = new_record(&state.repo, &key)
            .rows
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Sarah Davis".to_string()]);

        let key = RecordKey::new("MATH101", "B", Term::Final);
        assert!(new_record(&state.repo, &key).rows.is_empty());
    }
}
