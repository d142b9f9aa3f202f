use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_month, required_str, student_not_found};
use crate::ipc::types::{AppState, Request};
use crate::store::Lookup;
use serde_json::json;

use super::students::student_json;

fn view_response(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "view": state.view,
            "student": state.view.selected(&state.store).map(student_json),
        }),
    )
}

fn handle_view_select_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.view.select_student(&state.store, &student_id) {
        Lookup::Found(()) => view_response(state, req),
        Lookup::NotFound => student_not_found(req, &student_id),
    }
}

fn handle_view_edit_cell(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let semester = match required_str(req, "semester") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let month = match parse_month(req, "month") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state
        .view
        .edit_cell(&state.store, &student_id, &semester, &subject, month)
    {
        Lookup::Found(()) => view_response(state, req),
        Lookup::NotFound => err(
            &req.id,
            "not_found",
            "no result for student/semester/subject",
            Some(json!({ "studentId": student_id, "semester": semester, "subject": subject })),
        ),
    }
}

fn handle_view_back(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.view.back();
    view_response(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "view.get" => Some(view_response(state, req)),
        "view.selectStudent" => Some(handle_view_select_student(state, req)),
        "view.editCell" => Some(handle_view_edit_cell(state, req)),
        "view.back" => Some(handle_view_back(state, req)),
        _ => None,
    }
}
