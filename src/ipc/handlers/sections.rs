use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::require_role;
use crate::error::{PortalError, PortalResult};
use crate::ipc::error::respond;
use crate::ipc::helpers::{non_blank, parse_params, required_str};
use crate::ipc::types::{AppState, Request};
use crate::listing::{self, ListQuery};
use crate::model::{ActiveStatus, Role, Section, DEFAULT_SECTION_DESCRIPTION};
use crate::repo::{new_id, Repository};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionForm {
    id: Option<String>,
    name: Option<String>,
    students: Option<Vec<String>>,
    status: Option<ActiveStatus>,
    description: Option<String>,
}

impl SectionForm {
    fn apply_to(self, mut base: Section) -> PortalResult<Section> {
        if let Some(v) = self.name {
            base.name = v.trim().to_string();
        }
        if base.name.is_empty() {
            return Err(PortalError::validation("Section name is required"));
        }
        if let Some(names) = self.students {
            base.students = names.iter().filter_map(|n| non_blank(Some(n))).collect();
        }
        if let Some(s) = self.status {
            base.status = s;
        }
        if let Some(d) = self.description {
            base.description =
                non_blank(Some(&d)).unwrap_or_else(|| DEFAULT_SECTION_DESCRIPTION.to_string());
        }
        Ok(base)
    }
}

fn ensure_unique_name(repo: &Repository, section: &Section) -> PortalResult<()> {
    if repo
        .sections
        .find(|s| s.id != section.id && s.name.eq_ignore_ascii_case(&section.name))
        .is_some()
    {
        return Err(PortalError::conflict(format!(
            "a section named {} already exists",
            section.name
        )));
    }
    Ok(())
}

fn section_json(section: &Section) -> Value {
    json!({
        "section": section,
        "size": section.students.len(),
    })
}

fn handle_list(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let query = ListQuery::from_params(params)?;
    let rows = listing::apply(state.repo.sections.iter(), &query)?;
    let rows: Vec<Value> = rows
        .into_iter()
        .map(|s| {
            let mut v = json!(s);
            v["size"] = json!(s.students.len());
            v
        })
        .collect();
    Ok(json!({
        "total": state.repo.sections.len(),
        "sections": rows,
    }))
}

fn handle_get(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let section = state.repo.sections.require(required_str(params, "id")?)?;
    Ok(section_json(section))
}

fn handle_create(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: SectionForm = parse_params(params)?;
    let blank = Section {
        id: new_id(),
        name: String::new(),
        students: Vec::new(),
        status: ActiveStatus::Active,
        description: DEFAULT_SECTION_DESCRIPTION.to_string(),
    };
    let section = form.apply_to(blank)?;
    ensure_unique_name(&state.repo, &section)?;
    info!(id = %section.id, name = %section.name, "section created");
    state.repo.sections.insert(section.clone());
    Ok(section_json(&section))
}

/// Detail-page edits (rename, roster changes) land here; the list reads
/// the same record afterwards.
fn handle_update(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let form: SectionForm = parse_params(params)?;
    let id = form
        .id
        .clone()
        .ok_or_else(|| PortalError::bad_params("missing params.id"))?;
    let current = state.repo.sections.require(&id)?.clone();
    let section = form.apply_to(current)?;
    ensure_unique_name(&state.repo, &section)?;
    state.repo.sections.replace(section.clone())?;
    Ok(section_json(&section))
}

fn handle_delete(state: &mut AppState, params: &Value) -> PortalResult<Value> {
    require_role(state.session.user(), Role::Admin)?;
    let section = state.repo.sections.require_mut(required_str(params, "id")?)?;
    section.status = ActiveStatus::Inactive;
    section.students.clear();
    info!(id = %section.id, "section inactivated");
    Ok(section_json(section))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "sections.list" => handle_list(state, &req.params),
        "sections.get" => handle_get(state, &req.params),
        "sections.create" => handle_create(state, &req.params),
        "sections.update" => handle_update(state, &req.params),
        "sections.delete" => handle_delete(state, &req.params),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
