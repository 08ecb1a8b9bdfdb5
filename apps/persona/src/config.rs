use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_PERSONA_NAME: &str = "Mohammad Enamul Haque";
const DEFAULT_CONTACT_EMAIL: &str = "enamul.promy@gmail.com";

/// Application configuration loaded from environment variables.
/// Startup fails if the model API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    /// Both halves of the Pushover credential pair; `None` disables delivery.
    pub pushover: Option<PushoverCredentials>,
    pub persona_name: String,
    pub contact_email: String,
    pub profile_path: PathBuf,
    pub summary_path: PathBuf,
    pub max_questions: usize,
    pub max_tool_iterations: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct PushoverCredentials {
    pub token: String,
    pub user: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let pushover = match (optional_env("PUSHOVER_TOKEN"), optional_env("PUSHOVER_USER")) {
            (Some(token), Some(user)) => Some(PushoverCredentials { token, user }),
            _ => None,
        };

        Ok(Config {
            llm_api_key: require_env("GEMINI_API_KEY")?,
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            pushover,
            persona_name: optional_env("PERSONA_NAME")
                .unwrap_or_else(|| DEFAULT_PERSONA_NAME.to_string()),
            contact_email: optional_env("CONTACT_EMAIL")
                .unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_string()),
            profile_path: optional_env("PROFILE_PATH")
                .unwrap_or_else(|| "me/Profile.pdf".to_string())
                .into(),
            summary_path: optional_env("SUMMARY_PATH")
                .unwrap_or_else(|| "me/summary.txt".to_string())
                .into(),
            max_questions: parse_env("MAX_QUESTIONS", 10)?,
            max_tool_iterations: parse_env("MAX_TOOL_ITERATIONS", 8)?,
            port: parse_env("PORT", 7860)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u16 = parse_env("PERSONA_TEST_UNSET_PORT", 7860).unwrap();
        assert_eq!(value, 7860);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("PERSONA_TEST_BAD_NUMBER", "ten");
        let result: Result<usize> = parse_env("PERSONA_TEST_BAD_NUMBER", 10);
        assert!(result.is_err());
        std::env::remove_var("PERSONA_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_optional_env_ignores_blank_values() {
        std::env::set_var("PERSONA_TEST_BLANK", "   ");
        assert_eq!(optional_env("PERSONA_TEST_BLANK"), None);
        std::env::remove_var("PERSONA_TEST_BLANK");
    }
}
