use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::setup;
use crate::ipc::types::{AppState, Request};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Opens (or creates) the workspace DB, counts one visit and loads the
/// persisted projection policy. Returns the new visit count.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<i64> {
    let conn = db::open_db(path)?;
    let visits = db::counter_increment(&conn, db::VISIT_COUNTER_KEY)
        .context("failed to record visit")?;
    state.policy = match setup::load_policy(&conn) {
        Ok(p) => p,
        Err(e) => {
            // A broken saved section must not keep the workspace closed.
            tracing::warn!(error = %e, "ignoring unreadable etr settings");
            Default::default()
        }
    };
    state.workspace = Some(path.to_path_buf());
    state.db = Some(conn);
    tracing::info!(
        workspace = %path.to_string_lossy(),
        visits,
        policy = state.policy.as_str(),
        "workspace opened"
    );
    Ok(visits)
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "sessionActive": !state.session.is_empty()
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(visits) => ok(
            &req.id,
            json!({ "workspacePath": path.to_string_lossy(), "visitCount": visits }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

fn handle_visits_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match db::counter_get(conn, db::VISIT_COUNTER_KEY) {
        Ok(c) => ok(
            &req.id,
            json!({
                "visitCount": c.as_ref().map(|c| c.value).unwrap_or(0),
                "lastVisitAt": c.and_then(|c| c.updated_at)
            }),
        ),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "visits.get" => Some(handle_visits_get(state, req)),
        _ => None,
    }
}
