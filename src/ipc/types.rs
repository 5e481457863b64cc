use std::path::PathBuf;

use serde::Deserialize;

use crate::repo::Repository;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub session: Session,
    pub repo: Repository,
}

impl AppState {
    pub fn new(session: Session, repo: Repository) -> Self {
        Self {
            workspace: None,
            session,
            repo,
        }
    }
}
