//! Settings read from the environment (and a `.env` file, if there is one).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::{AskArgs, Model, DEFAULT_LLM, DEFAULT_SYSTEM_PROMPT};
use crate::errors::AskError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 256;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: Model,
    pub api_base: String,
    pub log_path: PathBuf,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, AskError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_path = lookup("ASKGPT_LOG").map(PathBuf::from).unwrap_or_else(|| {
            lookup("HOME")
                .map(|home| PathBuf::from(home).join(".askgpt").join("log.json"))
                .unwrap_or_else(|| PathBuf::from("askgpt-log.json"))
        });

        Ok(Settings {
            api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            model: parse_or(&lookup, "ASKGPT_LLM", DEFAULT_LLM)?,
            api_base: lookup("ASKGPT_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            log_path,
            temperature: parse_or(&lookup, "ASKGPT_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: parse_or(&lookup, "ASKGPT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            system_prompt: lookup("ASKGPT_SYSTEM")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    /// Apply command line overrides.
    pub fn with_args(mut self, args: &AskArgs) -> Self {
        if let Some(model) = args.model {
            self.model = model;
        }
        if let Some(log) = &args.log {
            self.log_path = log.clone();
        }
        if let Some(temperature) = args.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = args.max_tokens {
            self.max_tokens = max_tokens;
        }
        self
    }

    pub fn require_api_key(&self) -> Result<&str, AskError> {
        self.api_key.as_deref().ok_or(AskError::MissingApiKey)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AskError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| AskError::InvalidSetting {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("HOME", "/home/me")])).unwrap();
        assert_eq!(settings.model, DEFAULT_LLM);
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.log_path, PathBuf::from("/home/me/.askgpt/log.json"));
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(matches!(
            settings.require_api_key(),
            Err(AskError::MissingApiKey)
        ));
    }

    #[test]
    fn no_home_logs_to_cwd() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings.log_path, PathBuf::from("askgpt-log.json"));
    }

    #[test]
    fn env_values_are_used() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("ASKGPT_LLM", "gpt-3.5-turbo-instruct"),
            ("ASKGPT_LOG", "/tmp/log.json"),
            ("ASKGPT_TEMPERATURE", "0.2"),
            ("ASKGPT_MAX_TOKENS", "40"),
        ]))
        .unwrap();
        assert_eq!(settings.require_api_key().unwrap(), "sk-test");
        assert_eq!(settings.model, Model::Gpt35TurboInstruct);
        assert_eq!(settings.log_path, PathBuf::from("/tmp/log.json"));
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.max_tokens, 40);
    }

    #[test]
    fn invalid_value_is_reported() {
        let err =
            Settings::from_lookup(lookup_from(&[("ASKGPT_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            AskError::InvalidSetting { ref key, ref value }
                if key == "ASKGPT_MAX_TOKENS" && value == "lots"
        ));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let settings = Settings::from_lookup(lookup_from(&[("OPENAI_API_KEY", " ")])).unwrap();
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn args_override_env() {
        let settings = Settings::from_lookup(lookup_from(&[("ASKGPT_LLM", "gpt-4o")]))
            .unwrap()
            .with_args(&AskArgs {
                model: Some(Model::Gpt35Turbo),
                max_tokens: Some(10),
                ..Default::default()
            });
        assert_eq!(settings.model, Model::Gpt35Turbo);
        assert_eq!(settings.max_tokens, 10);
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
    }
}
