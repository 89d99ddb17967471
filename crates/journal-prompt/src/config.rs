//! Run configuration, built once at startup.
//!
//! [`Config`] captures every setting a run needs and is passed by reference
//! into each step; no component reads the process environment itself.
//! [`Config::from_env`] is the only place that does, via
//! [`Config::from_lookup`], which tests drive with a plain map.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use clap::ValueEnum;

use crate::Variant;
use crate::generate::{DEFAULT_MODEL, OPENAI_API_URL};
use crate::notify::{BREVO_SEND_URL, Contact};

// ── Environment keys ───────────────────────────────────────────────

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const BREVO_API_KEY: &str = "BREVO_API_KEY";
pub const BREVO_API_URL: &str = "BREVO_API_URL";
pub const BREVO_SENDER_NAME: &str = "BREVO_SENDER_NAME";
pub const BREVO_SENDER_EMAIL: &str = "BREVO_SENDER_EMAIL";
pub const BREVO_TO_NAME: &str = "BREVO_TO_NAME";
pub const BREVO_TO_EMAIL: &str = "BREVO_TO_EMAIL";
pub const HISTORY_PATH: &str = "HISTORY_PATH";
pub const HISTORY_TAIL: &str = "HISTORY_TAIL";
pub const SUBJECT_PREFIX: &str = "SUBJECT_PREFIX";
pub const SUBJECT_TIMEZONE: &str = "SUBJECT_TIMEZONE";
pub const QUESTION_VARIANT: &str = "QUESTION_VARIANT";

// ── Defaults ───────────────────────────────────────────────────────

pub const DEFAULT_HISTORY_PATH: &str = "data/journal_questions.jsonl";
pub const DEFAULT_HISTORY_TAIL: i64 = 120;
pub const DEFAULT_SUBJECT_PREFIX: &str = "Daily Journal Question";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Moscow;

/// Stands in for API keys in `Debug` output.
const REDACTED: &str = "<redacted>";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the generation call.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    /// Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// API root; the client posts to `{base_url}/responses`.
    pub base_url: String,
    /// Default: 120 s.
    pub timeout: Duration,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENAI_API_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &REDACTED)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Settings for the email call.
#[derive(Clone)]
pub struct EmailConfig {
    pub api_key: String,
    /// Full send URL. Default: [`BREVO_SEND_URL`].
    pub endpoint: String,
    pub sender: Contact,
    pub recipient: Contact,
    /// Default: 30 s.
    pub timeout: Duration,
}

impl EmailConfig {
    pub fn new(api_key: impl Into<String>, sender: Contact, recipient: Contact) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: BREVO_SEND_URL.to_string(),
            sender,
            recipient,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &REDACTED)
            .field("endpoint", &self.endpoint)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub generation: GenerationConfig,
    pub email: EmailConfig,
    /// Default: [`DEFAULT_HISTORY_PATH`].
    pub history_path: PathBuf,
    /// How many past records the prompt sees. Default: [`DEFAULT_HISTORY_TAIL`].
    pub history_tail: i64,
    /// Default: [`DEFAULT_SUBJECT_PREFIX`].
    pub subject_prefix: String,
    /// Zone the subject date is rendered in. Default: `Europe/Moscow`.
    pub timezone: Tz,
    pub variant: Variant,
}

impl Config {
    /// Config with the given credentials and defaults for everything else.
    pub fn new(generation: GenerationConfig, email: EmailConfig) -> Self {
        Self {
            generation,
            email,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            history_tail: DEFAULT_HISTORY_TAIL,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            timezone: DEFAULT_TIMEZONE,
            variant: Variant::default(),
        }
    }

    pub fn with_history_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_path = path.into();
        self
    }

    pub fn with_history_tail(mut self, n: i64) -> Self {
        self.history_tail = n;
        self
    }

    pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Empty values count as unset: a required key fails with
    /// [`ConfigError::Missing`], an optional key keeps its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mut generation = GenerationConfig::new(require(OPENAI_API_KEY)?);
        if let Some(model) = get(OPENAI_MODEL) {
            generation = generation.with_model(model);
        }
        if let Some(url) = get(OPENAI_BASE_URL) {
            generation = generation.with_base_url(url);
        }

        let mut email = EmailConfig::new(
            require(BREVO_API_KEY)?,
            Contact::new(require(BREVO_SENDER_NAME)?, require(BREVO_SENDER_EMAIL)?),
            Contact::new(require(BREVO_TO_NAME)?, require(BREVO_TO_EMAIL)?),
        );
        if let Some(url) = get(BREVO_API_URL) {
            email = email.with_endpoint(url);
        }

        let mut config = Config::new(generation, email);

        if let Some(path) = get(HISTORY_PATH) {
            config = config.with_history_path(path);
        }
        if let Some(value) = get(HISTORY_TAIL) {
            let n = value
                .trim()
                .parse::<i64>()
                .map_err(|e| invalid(HISTORY_TAIL, &value, e))?;
            config = config.with_history_tail(n);
        }
        if let Some(prefix) = get(SUBJECT_PREFIX) {
            config = config.with_subject_prefix(prefix);
        }
        if let Some(value) = get(SUBJECT_TIMEZONE) {
            let tz = value
                .trim()
                .parse::<Tz>()
                .map_err(|e| invalid(SUBJECT_TIMEZONE, &value, e))?;
            config = config.with_timezone(tz);
        }
        if let Some(value) = get(QUESTION_VARIANT) {
            let variant = Variant::from_str(value.trim(), true)
                .map_err(|e| invalid(QUESTION_VARIANT, &value, e))?;
            config = config.with_variant(variant);
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
