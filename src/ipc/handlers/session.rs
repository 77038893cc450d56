use crate::ipc::error::ok;
use crate::ipc::params::{self, ParamError};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_session_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.session))
}

fn handle_session_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let patch = match params::object(&req.params, "patch") {
        Ok(Some(p)) => p,
        Ok(None) => return ParamError::Missing("patch").respond(&req.id),
        Err(e) => return e.respond(&req.id),
    };
    if let Err(e) = state.session.apply_patch(patch) {
        return e.respond(&req.id);
    }
    ok(&req.id, json!(state.session))
}

fn handle_session_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session.reset();
    tracing::debug!("session cleared");
    ok(&req.id, json!(state.session))
}

fn handle_session_evaluate(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.session.evaluate(state.policy)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.get" => Some(handle_session_get(state, req)),
        "session.update" => Some(handle_session_update(state, req)),
        "session.reset" => Some(handle_session_reset(state, req)),
        "session.evaluate" => Some(handle_session_evaluate(state, req)),
        _ => None,
    }
}
