use crate::config::AiConfig;
use crate::model::Language;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant for a Student Information System called Smart SIS. You help staff, students, and parents with queries about school policies, grades (generic info), and system navigation. Keep answers concise and professional.";

pub const EMPTY_REPLY_FALLBACK: &str = "I apologize, I couldn't generate a response.";
pub const UNAVAILABLE_FALLBACK: &str = "Sorry, the AI service is currently unavailable.";

/// Plain-text completion backend. Implementations may fail; callers in this
/// module turn failures into fallback text.
pub trait TextService {
    fn generate(&self, system: Option<&str>, prompt: &str) -> anyhow::Result<String>;

    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartOut<'a>>,
}

#[derive(Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Deserialize)]
struct PartIn {
    text: Option<String>,
}

/// Generative Language API `generateContent` over blocking HTTP.
pub struct GeminiService {
    client: reqwest::blocking::Client,
    cfg: AiConfig,
}

impl GeminiService {
    pub fn new(cfg: AiConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("failed to build AI http client")?;
        Ok(Self { client, cfg })
    }
}

impl TextService for GeminiService {
    fn generate(&self, system: Option<&str>, prompt: &str) -> anyhow::Result<String> {
        let Some(key) = self.cfg.api_key.as_deref() else {
            bail!("AI service is not configured");
        };
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![PartOut { text: prompt }],
            }],
            system_instruction: system.map(|s| Content {
                parts: vec![PartOut { text: s }],
            }),
        };
        let url = format!(
            "{}/models/{}:generateContent",
            self.cfg.endpoint, self.cfg.model
        );
        let resp: GenerateResponse = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()?
            .json()
            .context("malformed generateContent response")?;

        let text = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.cfg.api_key.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: String,
}

impl ChatMessage {
    fn new(id: String, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn welcome_text(lang: Language) -> &'static str {
    match lang {
        Language::En => "Hello! I'm your Smart SIS assistant. How can I help you with school policies, grades, or finding information today?",
        Language::Zh => "你好！我是您的Smart SIS助手。关于学校政策、成绩查询或信息查找，我能为您做些什么？",
    }
}

fn translation_prompt(text: &str, target: Language) -> String {
    let lang_name = match target {
        Language::Zh => "Chinese",
        Language::En => "English",
    };
    format!(
        "Translate the following educational text to {lang_name}. maintain a professional, academic tone suitable for a student report card. Text: \"{text}\""
    )
}

pub struct Assistant {
    service: Box<dyn TextService>,
    history: Vec<ChatMessage>,
    translations: HashMap<(String, usize), String>,
}

impl Assistant {
    pub fn new(service: Box<dyn TextService>) -> Self {
        Self {
            service,
            history: Vec::new(),
            translations: HashMap::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_configured()
    }

    fn ensure_welcome(&mut self, lang: Language) {
        if self.history.is_empty() {
            self.history.push(ChatMessage::new(
                "welcome".to_string(),
                Role::Model,
                welcome_text(lang),
            ));
        }
    }

    pub fn history(&mut self, lang: Language) -> &[ChatMessage] {
        self.ensure_welcome(lang);
        &self.history
    }

    /// Sends one user message and records both sides. Never fails: service
    /// errors become a fixed apology.
    pub fn chat(&mut self, message: &str, lang: Language) -> String {
        self.ensure_welcome(lang);
        self.history.push(ChatMessage::new(
            Uuid::new_v4().to_string(),
            Role::User,
            message,
        ));

        let reply = match self.service.generate(Some(SYSTEM_INSTRUCTION), message) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_REPLY_FALLBACK.to_string(),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "assistant chat failed");
                UNAVAILABLE_FALLBACK.to_string()
            }
        };

        self.history.push(ChatMessage::new(
            Uuid::new_v4().to_string(),
            Role::Model,
            reply.clone(),
        ));
        reply
    }

    /// Translates report-card text; any failure returns the input unchanged.
    pub fn translate(&self, text: &str, target: Language) -> String {
        match self.service.generate(None, &translation_prompt(text, target)) {
            Ok(out) if !out.trim().is_empty() => out,
            Ok(_) => text.to_string(),
            Err(e) => {
                warn!(error = %format!("{e:#}"), target = target.as_str(), "translation failed");
                text.to_string()
            }
        }
    }

    pub fn translate_comment(
        &mut self,
        student_id: &str,
        result_index: usize,
        original: &str,
        target: Language,
    ) -> String {
        let out = self.translate(original, target);
        info!(student_id, result_index, target = target.as_str(), "comment translated");
        self.translations
            .insert((student_id.to_string(), result_index), out.clone());
        out
    }

    pub fn displayed_comment(&self, student_id: &str, result_index: usize, original: &str) -> String {
        self.translations
            .get(&(student_id.to_string(), result_index))
            .cloned()
            .unwrap_or_else(|| original.to_string())
    }

    pub fn reset_translation(&mut self, student_id: &str, result_index: usize) {
        self.translations
            .remove(&(student_id.to_string(), result_index));
    }

    /// Drops cached translations, e.g. when the roster is replaced.
    pub fn clear_translations(&mut self) {
        self.translations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Scripted {
        reply: Option<&'static str>,
        prompts: RefCell<Vec<String>>,
    }

    impl TextService for Scripted {
        fn generate(&self, _system: Option<&str>, prompt: &str) -> anyhow::Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match self.reply {
                Some(r) => Ok(r.to_string()),
                None => bail!("offline"),
            }
        }
    }

    fn assistant(reply: Option<&'static str>) -> Assistant {
        Assistant::new(Box::new(Scripted {
            reply,
            prompts: RefCell::new(Vec::new()),
        }))
    }

    #[test]
    fn chat_records_history_with_welcome() {
        let mut a = assistant(Some("Office hours are 9-5."));
        let reply = a.chat("When is the office open?", Language::En);
        assert_eq!(reply, "Office hours are 9-5.");

        let h = a.history(Language::En);
        assert_eq!(h.len(), 3);
        assert_eq!(h[0].id, "welcome");
        assert_eq!(h[1].role, Role::User);
        assert_eq!(h[2].role, Role::Model);
    }

    #[test]
    fn chat_failures_degrade_to_fixed_text() {
        let mut a = assistant(None);
        assert_eq!(a.chat("hi", Language::En), UNAVAILABLE_FALLBACK);

        let mut a = assistant(Some("   "));
        assert_eq!(a.chat("hi", Language::Zh), EMPTY_REPLY_FALLBACK);
        assert_eq!(a.history(Language::En)[0].text, welcome_text(Language::Zh));
    }

    #[test]
    fn translate_falls_back_to_original() {
        let a = assistant(None);
        assert_eq!(a.translate("Good effort.", Language::Zh), "Good effort.");
    }

    #[test]
    fn translation_prompt_names_target_language() {
        let svc = Scripted {
            reply: Some("努力"),
            prompts: RefCell::new(Vec::new()),
        };
        assert_eq!(svc.generate(None, &translation_prompt("Effort", Language::Zh)).ok().as_deref(), Some("努力"));
        assert!(svc.prompts.borrow()[0].contains("to Chinese"));
        assert!(svc.prompts.borrow()[0].contains("\"Effort\""));
    }

    #[test]
    fn comment_translation_cache() {
        let mut a = assistant(Some("表现出色"));
        assert_eq!(a.displayed_comment("S1", 0, "Excellent"), "Excellent");
        a.translate_comment("S1", 0, "Excellent", Language::Zh);
        assert_eq!(a.displayed_comment("S1", 0, "Excellent"), "表现出色");
        assert_eq!(a.displayed_comment("S1", 1, "Fine"), "Fine");
        a.reset_translation("S1", 0);
        assert_eq!(a.displayed_comment("S1", 0, "Excellent"), "Excellent");
    }

    #[test]
    fn unconfigured_gemini_fails_without_network() {
        let svc = GeminiService::new(AiConfig {
            api_key: None,
            model: "m".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout: std::time::Duration::from_secs(1),
        })
        .expect("client");
        assert!(!svc.is_configured());
        assert!(svc.generate(None, "hello").is_err());
    }
}
