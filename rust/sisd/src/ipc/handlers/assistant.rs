use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{parse_language, required_index, required_str, student_not_found};
use crate::ipc::types::{AppState, Request};
use crate::model::Language;
use crate::store::Lookup;
use serde_json::json;

fn handle_chat(state: &mut AppState, req: &Request) -> serde_json::Value {
    let message = match required_str(req, "message") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if message.trim().is_empty() {
        return err(&req.id, "bad_params", "message must not be empty", None);
    }
    let lang = match parse_language(req, "language", Language::En) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let reply = state.assistant.chat(&message, lang);
    ok(
        &req.id,
        json!({ "reply": reply, "messages": state.assistant.history(lang) }),
    )
}

fn handle_history(state: &mut AppState, req: &Request) -> serde_json::Value {
    let lang = match parse_language(req, "language", Language::En) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "messages": state.assistant.history(lang) }))
}

fn handle_translate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let text = match required_str(req, "text") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let target = match parse_language(req, "targetLanguage", Language::Zh) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!({ "text": state.assistant.translate(&text, target) }))
}

/// Resolves the teacher comment at `resultIndex` in the student's result list.
fn comment_at(state: &AppState, req: &Request) -> Result<(String, usize, String), serde_json::Value> {
    let student_id = required_str(req, "studentId")?;
    let index = required_index(req, "resultIndex")?;
    let Lookup::Found(student) = state.store.student(&student_id) else {
        return Err(student_not_found(req, &student_id));
    };
    let Some(result) = student.results.get(index) else {
        return Err(err(
            &req.id,
            "not_found",
            "result index out of range",
            Some(json!({ "studentId": student_id, "resultIndex": index })),
        ));
    };
    let comment = result.teacher_comment.clone();
    Ok((student_id, index, comment))
}

fn handle_comment_translate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (student_id, index, original) = match comment_at(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let target = match parse_language(req, "targetLanguage", Language::Zh) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let text = state
        .assistant
        .translate_comment(&student_id, index, &original, target);
    ok(&req.id, json!({ "text": text }))
}

fn handle_comment_displayed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (student_id, index, original) = match comment_at(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "text": state.assistant.displayed_comment(&student_id, index, &original) }),
    )
}

fn handle_comment_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (student_id, index, original) = match comment_at(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    state.assistant.reset_translation(&student_id, index);
    ok(&req.id, json!({ "text": original }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assistant.chat" => Some(handle_chat(state, req)),
        "assistant.history" => Some(handle_history(state, req)),
        "assistant.translate" => Some(handle_translate(state, req)),
        "comments.translate" => Some(handle_comment_translate(state, req)),
        "comments.displayed" => Some(handle_comment_displayed(state, req)),
        "comments.resetTranslation" => Some(handle_comment_reset(state, req)),
        _ => None,
    }
}
