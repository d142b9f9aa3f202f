use crate::calc::displayed_score;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{calc_err, optional_str, parse_language, required_str, student_not_found};
use crate::ipc::types::{AppState, Request};
use crate::model::{Language, StudentRecord};
use crate::roster;
use crate::store::Lookup;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn summary_row(s: &StudentRecord) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "email": s.email,
        "className": s.class_name,
        "avatar": s.avatar,
        "grade": s.grade,
        "attendanceRate": s.attendance_rate,
        "status": s.status,
        "resultCount": s.results.len(),
    })
}

/// Full record plus the displayed score for each result, so the detail view
/// never has to repeat the aggregation.
pub fn student_json(s: &StudentRecord) -> serde_json::Value {
    let mut v = json!(s);
    if let Some(results) = v.get_mut("results").and_then(|r| r.as_array_mut()) {
        for (r, src) in results.iter_mut().zip(s.results.iter()) {
            r["displayedScore"] = json!(displayed_score(src));
        }
    }
    v
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match roster::parse_roster_filters(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return calc_err(req, e),
    };
    let rows: Vec<serde_json::Value> = roster::filter_roster(state.store.students(), &filters)
        .into_iter()
        .map(summary_row)
        .collect();
    ok(&req.id, json!({ "students": rows }))
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.student(&student_id) {
        Lookup::Found(s) => ok(&req.id, json!({ "student": student_json(s) })),
        Lookup::NotFound => student_not_found(req, &student_id),
    }
}

fn handle_filter_options(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(roster::filter_options(state.store.students())))
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match roster::parse_roster_filters(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return calc_err(req, e),
    };
    let lang = match parse_language(req, "language", Language::En) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let out_path = match optional_str(req, "outPath") {
        Ok(v) => v.map(PathBuf::from),
        Err(e) => return e,
    };

    let rows = roster::filter_roster(state.store.students(), &filters);
    let csv = match roster::export_csv(&rows, lang) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "export_failed", format!("{e:#}"), None),
    };
    let file_name = roster::export_file_name(chrono::Local::now().date_naive());

    if let Some(path) = out_path.as_ref() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return err(&req.id, "io_failed", e.to_string(), None);
            }
        }
        if let Err(e) = std::fs::write(path, csv.as_bytes()) {
            return err(
                &req.id,
                "io_failed",
                e.to_string(),
                Some(json!({ "path": path.to_string_lossy() })),
            );
        }
        info!(path = %path.to_string_lossy(), rows = rows.len(), "roster exported");
    }

    ok(
        &req.id,
        json!({
            "csv": csv,
            "fileName": file_name,
            "rowCount": rows.len(),
            "path": out_path.map(|p| p.to_string_lossy().to_string()),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.filterOptions" => Some(handle_filter_options(state, req)),
        "students.exportCsv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
