use crate::calc::calculate_grade;
use crate::etr::project_target;
use crate::ipc::error::ok;
use crate::ipc::params;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_grade_calculate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let scores = match params::scores(&req.params) {
        Ok(s) => s,
        Err(e) => return e.respond(&req.id),
    };
    ok(&req.id, json!(calculate_grade(&scores)))
}

fn handle_etr_project(state: &mut AppState, req: &Request) -> serde_json::Value {
    let parsed = params::scores(&req.params).and_then(|scores| {
        let target = params::target(&req.params)?;
        let policy = params::policy(&req.params, state.policy)?;
        Ok((scores, target, policy))
    });
    let (scores, target, policy) = match parsed {
        Ok(v) => v,
        Err(e) => return e.respond(&req.id),
    };
    ok(&req.id, json!(project_target(&scores, target, policy)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grade.calculate" => Some(handle_grade_calculate(state, req)),
        "etr.project" => Some(handle_etr_project(state, req)),
        _ => None,
    }
}
