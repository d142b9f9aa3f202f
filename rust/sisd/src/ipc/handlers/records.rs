use crate::calc::{self, displayed_score, round_half_up};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{calc_err, optional_str, parse_month, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::Lookup;
use serde_json::json;
use tracing::info;

use super::students::student_json;

/// Cell input: absent, null or blank clears the month; numbers and numeric
/// strings are rounded to an integer (clamping happens in the store).
fn parse_score_value(req: &Request) -> Result<Option<i64>, serde_json::Value> {
    let bad = |v: &serde_json::Value| {
        err(
            &req.id,
            "bad_params",
            "value must be a number, numeric string, or null",
            Some(json!({ "value": v })),
        )
    };
    match req.params.get("value") {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) if v.is_i64() => Ok(v.as_i64()),
        Some(v) if v.is_number() => match v.as_f64() {
            Some(f) if f.is_finite() => Ok(Some(round_half_up(f))),
            _ => Err(bad(v)),
        },
        Some(v) => {
            let Some(s) = v.as_str() else {
                return Err(bad(v));
            };
            let t = s.trim();
            if t.is_empty() {
                return Ok(None);
            }
            match t.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Some(round_half_up(f))),
                _ => Err(bad(v)),
            }
        }
    }
}

fn target_not_found(req: &Request, student_id: &str, semester: &str, subject: &str) -> serde_json::Value {
    err(
        &req.id,
        "not_found",
        "no result for student/semester/subject",
        Some(json!({
            "studentId": student_id,
            "semester": semester,
            "subject": subject,
        })),
    )
}

fn handle_records_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let filters = match calc::parse_record_filters(req.params.get("filters")) {
        Ok(f) => f,
        Err(e) => return calc_err(req, e),
    };
    let model = calc::compute_summary(state.store.students(), &filters);
    ok(&req.id, json!(model))
}

fn handle_set_monthly_score(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let value = match parse_score_value(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let comment = match optional_str(req, "comment") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let result = match state
        .store
        .set_monthly_score(&student_id, &semester, &subject, month, value, comment)
    {
        Lookup::Found(r) => {
            let mut v = json!(r);
            v["displayedScore"] = json!(displayed_score(r));
            v
        }
        Lookup::NotFound => return target_not_found(req, &student_id, &semester, &subject),
    };
    info!(
        student_id = %student_id,
        semester = %semester,
        subject = %subject,
        month = %month,
        cleared = value.is_none(),
        "monthly score edited"
    );

    let student = state
        .store
        .student(&student_id)
        .found()
        .map(student_json);
    ok(&req.id, json!({ "result": result, "student": student }))
}

fn handle_set_semester_comment(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let comment = match required_str(req, "comment") {
        Ok(v) => v,
        Err(e) => return e,
    };

    match state
        .store
        .set_semester_comment(&student_id, &semester, &subject, &comment)
    {
        Lookup::Found(r) => ok(&req.id, json!({ "result": r })),
        Lookup::NotFound => target_not_found(req, &student_id, &semester, &subject),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.summary" => Some(handle_records_summary(state, req)),
        "records.setMonthlyScore" => Some(handle_set_monthly_score(state, req)),
        "records.setSemesterComment" => Some(handle_set_semester_comment(state, req)),
        _ => None,
    }
}
