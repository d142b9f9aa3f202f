use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentRecord;
use crate::seed;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "studentCount": state.store.len(),
            "aiConfigured": state.assistant.is_configured(),
        }),
    )
}

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let students: Vec<StudentRecord> = if let Some(path) =
        req.params.get("path").and_then(|v| v.as_str())
    {
        match seed::load_roster_file(&PathBuf::from(path)) {
            Ok(v) => v,
            Err(e) => {
                warn!(path, error = %format!("{e:#}"), "roster load failed");
                return err(
                    &req.id,
                    "load_failed",
                    format!("{e:#}"),
                    Some(json!({ "path": path })),
                );
            }
        }
    } else if let Some(raw) = req.params.get("students") {
        match serde_json::from_value(raw.clone()) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "bad_params", format!("invalid students: {e}"), None),
        }
    } else if req.params.get("demo").and_then(|v| v.as_bool()) == Some(true) {
        seed::demo_roster()
    } else {
        return err(
            &req.id,
            "bad_params",
            "expected one of: path, students, demo",
            None,
        );
    };

    state.store.replace_all(students);
    state.view.revalidate(&state.store);
    state.assistant.clear_translations();
    info!(students = state.store.len(), "roster loaded");
    ok(&req.id, json!({ "studentCount": state.store.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "roster.load" => Some(handle_roster_load(state, req)),
        _ => None,
    }
}
