use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::etr::ProjectionPolicy;
use crate::session::Session;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub session: Session,
    /// Loaded from the workspace's `etr` setup section; default without one.
    pub policy: ProjectionPolicy,
}
