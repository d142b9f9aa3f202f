use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{required_str, student_not_found};
use crate::ipc::types::{AppState, Request};
use crate::store::Lookup;
use serde_json::json;

fn handle_report_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let semester = match required_str(req, "semester") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.student(&student_id) {
        Lookup::Found(s) => ok(&req.id, json!(calc::report_snapshot(s, &semester))),
        Lookup::NotFound => student_not_found(req, &student_id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.snapshot" => Some(handle_report_snapshot(state, req)),
        _ => None,
    }
}
