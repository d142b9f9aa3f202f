use crate::calc::CalcError;
use crate::ipc::error::err;
use crate::ipc::types::Request;
use crate::model::{Language, Month};
use serde_json::json;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a string", key),
                None,
            )
        }),
    }
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a non-negative integer", key),
                None,
            )
        })
}

pub fn parse_month(req: &Request, key: &str) -> Result<Month, serde_json::Value> {
    let raw = match req.params.get(key) {
        Some(v) if v.is_u64() => v.as_u64().map(|n| n.to_string()).unwrap_or_default(),
        Some(v) => v.as_str().unwrap_or_default().to_string(),
        None => return Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    };
    Month::parse(&raw).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("unrecognized month: {}", raw),
            Some(json!({ key: raw })),
        )
    })
}

/// Missing language falls back to `default`; an unknown code is rejected.
pub fn parse_language(
    req: &Request,
    key: &str,
    default: Language,
) -> Result<Language, serde_json::Value> {
    match optional_str(req, key)? {
        None => Ok(default),
        Some(s) => Language::parse(&s).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be one of: en, zh", key),
                Some(json!({ key: s })),
            )
        }),
    }
}

pub fn calc_err(req: &Request, e: CalcError) -> serde_json::Value {
    err(&req.id, &e.code, e.message, e.details)
}

pub fn student_not_found(req: &Request, student_id: &str) -> serde_json::Value {
    err(
        &req.id,
        "not_found",
        "student not found",
        Some(json!({ "studentId": student_id })),
    )
}
