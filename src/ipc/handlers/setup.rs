use crate::db;
use crate::etr::ProjectionPolicy;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::{json, Map, Value};

#[derive(Clone, Copy)]
enum SetupSection {
    Etr,
}

impl SetupSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "etr" => Some(Self::Etr),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Etr => "setup.etr",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Etr => json!({
            "policy": ProjectionPolicy::default().as_str()
        }),
    }
}

fn as_object_mut(value: &mut Value) -> Result<&mut Map<String, Value>, String> {
    value
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = as_object_mut(current)?;
    for (k, v) in patch {
        match section {
            SetupSection::Etr => match k.as_str() {
                "policy" => {
                    let p = v
                        .as_str()
                        .and_then(ProjectionPolicy::parse)
                        .ok_or_else(|| "policy must be one of: proportional, flat".to_string())?;
                    obj.insert(k.clone(), Value::String(p.as_str().to_string()));
                }
                _ => return Err(format!("unknown etr field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: Option<&Connection>, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    let Some(conn) = conn else {
        return Ok(current);
    };
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: a malformed saved value must not block reads.
            let _ = merge_section_patch(section, &mut current, saved_obj);
        }
    }
    Ok(current)
}

fn policy_of(etr: &Value) -> ProjectionPolicy {
    etr.get("policy")
        .and_then(|v| v.as_str())
        .and_then(ProjectionPolicy::parse)
        .unwrap_or_default()
}

pub fn load_policy(conn: &Connection) -> anyhow::Result<ProjectionPolicy> {
    let etr = load_section(Some(conn), SetupSection::Etr)?;
    Ok(policy_of(&etr))
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let etr = match load_section(state.db.as_ref(), SetupSection::Etr) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    ok(&req.id, json!({ "etr": etr }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SetupSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(Some(conn), section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    match section {
        SetupSection::Etr => {
            state.policy = policy_of(&current);
            tracing::info!(policy = state.policy.as_str(), "projection policy updated");
        }
    }
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
