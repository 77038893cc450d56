use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::report::build_summary;
use serde_json::json;

fn handle_report_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(build_summary(&state.session, state.policy)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.summary" => Some(handle_report_summary(state, req)),
        _ => None,
    }
}
