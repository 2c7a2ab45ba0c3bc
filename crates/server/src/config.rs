use std::{collections::HashMap, fs};

use completion::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub temperature: f32,
    pub max_upload_bytes: usize,
    pub max_sessions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8501".into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.into(),
            temperature: 0.2,
            max_upload_bytes: 1024 * 1024,
            max_sessions: 1024,
        }
    }
}

impl Settings {
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_base_url.clone(),
            temperature: self.temperature,
        }
    }
}

/// Defaults, then `server.toml`, then the process environment (with `.env`
/// loaded first).
pub fn load_settings() -> Settings {
    let _ = dotenvy::dotenv();
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_config(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Flat `key = value` TOML. Unknown keys are ignored; a file that fails to
/// parse is skipped as a whole.
pub fn apply_file_config(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file");
            return;
        }
    };
    let get = |key: &str| {
        file_cfg.get(key).map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };

    if let Some(v) = get("bind_addr") {
        settings.server_bind = v;
    }
    if let Some(v) = get("gemini_api_key") {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = get("gemini_model") {
        settings.gemini_model = v;
    }
    if let Some(v) = get("gemini_base_url") {
        settings.gemini_base_url = v;
    }
    if let Some(v) = get("temperature") {
        set_parsed(&mut settings.temperature, &v);
    }
    if let Some(v) = get("max_upload_bytes") {
        set_parsed(&mut settings.max_upload_bytes, &v);
    }
    if let Some(v) = get("max_sessions") {
        set_parsed(&mut settings.max_sessions, &v);
    }
}

/// Later names in each list take precedence over earlier ones.
pub fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = lookup(key) {
            settings.server_bind = v;
        }
    }

    for key in ["GOOGLE_API_KEY", "GEMINI_API_KEY", "APP__GEMINI_API_KEY"] {
        if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
            settings.gemini_api_key = Some(v);
        }
    }

    if let Some(v) = lookup("APP__GEMINI_MODEL") {
        settings.gemini_model = v;
    }
    if let Some(v) = lookup("APP__GEMINI_BASE_URL") {
        settings.gemini_base_url = v;
    }
    if let Some(v) = lookup("APP__TEMPERATURE") {
        set_parsed(&mut settings.temperature, &v);
    }
    if let Some(v) = lookup("APP__MAX_UPLOAD_BYTES") {
        set_parsed(&mut settings.max_upload_bytes, &v);
    }
    if let Some(v) = lookup("APP__MAX_SESSIONS") {
        set_parsed(&mut settings.max_sessions, &v);
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, raw: &str) {
    if let Ok(parsed) = raw.trim().parse::<T>() {
        *slot = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
