use crate::assistant::Assistant;
use crate::store::Store;
use crate::view::View;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: Store,
    pub view: View,
    pub assistant: Assistant,
}
