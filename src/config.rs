//! Process configuration, read from the environment.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::slides::search::MAX_CONTEXT_CHARS;

pub const DEFAULT_SLIDES_API_BASE_URL: &str = "https://slides.googleapis.com/v1";
pub const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DEFAULT_TRANSLATE_API_BASE_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXPORT_MAX_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_SEARCH_CONTEXT_CHARS: usize = 40;

/// Settings shared by the Google clients and the tools.
#[derive(Debug, Clone)]
pub struct Config {
    pub oauth_token: SecretString,
    pub translate_api_key: Option<SecretString>,
    pub slides_api_base_url: String,
    pub drive_api_base_url: String,
    pub drive_upload_base_url: String,
    pub translate_api_base_url: String,
    pub http_timeout: Duration,
    /// Largest export body read into memory.
    pub export_max_bytes: usize,
    /// Default context radius for text search.
    pub search_context_chars: usize,
}

impl Config {
    /// Load `.env` (if present) then resolve every setting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::resolve()
    }

    /// Resolve from the current process environment only.
    pub fn resolve() -> Result<Self, ConfigError> {
        let oauth_token = optional_env("GOOGLE_OAUTH_TOKEN")?
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_OAUTH_TOKEN".to_string()))?;

        let http_timeout_secs = parse_optional_env("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let search_context_chars =
            parse_optional_env("SEARCH_CONTEXT_CHARS", DEFAULT_SEARCH_CONTEXT_CHARS)?;
        if search_context_chars > MAX_CONTEXT_CHARS {
            return Err(ConfigError::InvalidValue {
                key: "SEARCH_CONTEXT_CHARS".to_string(),
                message: format!("must be at most {}", MAX_CONTEXT_CHARS),
            });
        }

        Ok(Self {
            oauth_token,
            translate_api_key: optional_env("GOOGLE_TRANSLATE_API_KEY")?.map(SecretString::from),
            slides_api_base_url: optional_env("SLIDES_API_BASE_URL")?
                .unwrap_or_else(|| DEFAULT_SLIDES_API_BASE_URL.to_string()),
            drive_api_base_url: optional_env("DRIVE_API_BASE_URL")?
                .unwrap_or_else(|| DEFAULT_DRIVE_API_BASE_URL.to_string()),
            drive_upload_base_url: optional_env("DRIVE_UPLOAD_BASE_URL")?
                .unwrap_or_else(|| DEFAULT_DRIVE_UPLOAD_BASE_URL.to_string()),
            translate_api_base_url: optional_env("TRANSLATE_API_BASE_URL")?
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            export_max_bytes: parse_optional_env("EXPORT_MAX_BYTES", DEFAULT_EXPORT_MAX_BYTES)?,
            search_context_chars,
        })
    }
}

/// Whether logs should be emitted as JSON lines (`SLIDESMITH_LOG_JSON`).
pub fn log_json() -> Result<bool, ConfigError> {
    parse_bool_env("SLIDESMITH_LOG_JSON", false)
}

/// Tool-facing knobs that do not depend on credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    pub export_max_bytes: usize,
    pub search_context_chars: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            export_max_bytes: DEFAULT_EXPORT_MAX_BYTES,
            search_context_chars: DEFAULT_SEARCH_CONTEXT_CHARS,
        }
    }
}

impl From<&Config> for ToolSettings {
    fn from(config: &Config) -> Self {
        Self {
            export_max_bytes: config.export_max_bytes,
            search_context_chars: config.search_context_chars,
        }
    }
}

/// Crate-wide mutex for tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Read an env var, treating empty as unset.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

pub(crate) fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

/// Parse a boolean from an env var with a default.
///
/// Accepts "true"/"1" as true, "false"/"0" as false.
pub(crate) fn parse_bool_env(key: &str, default: bool) -> Result<bool, ConfigError> {
    match optional_env(key)? {
        Some(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("must be 'true' or 'false', got '{s}'"),
            }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const KEYS: &[&str] = &[
        "GOOGLE_OAUTH_TOKEN",
        "GOOGLE_TRANSLATE_API_KEY",
        "SLIDES_API_BASE_URL",
        "DRIVE_API_BASE_URL",
        "DRIVE_UPLOAD_BASE_URL",
        "TRANSLATE_API_BASE_URL",
        "HTTP_TIMEOUT_SECS",
        "EXPORT_MAX_BYTES",
        "SEARCH_CONTEXT_CHARS",
        "SLIDESMITH_TEST_FLAG",
        "SLIDESMITH_LOG_JSON",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: callers hold ENV_MUTEX.
            unsafe { std::env::remove_var(key) };
        }
    }

    fn set(key: &str, value: &str) {
        // SAFETY: callers hold ENV_MUTEX.
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    fn test_defaults_with_token_only() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set("GOOGLE_OAUTH_TOKEN", "ya29.test");

        let config = Config::resolve().unwrap();
        assert_eq!(config.oauth_token.expose_secret(), "ya29.test");
        assert!(config.translate_api_key.is_none());
        assert_eq!(config.slides_api_base_url, DEFAULT_SLIDES_API_BASE_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.export_max_bytes, 52_428_800);
        assert_eq!(config.search_context_chars, 40);
        clear_env();
    }

    #[test]
    fn test_missing_token_is_reported() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set("GOOGLE_OAUTH_TOKEN", "");

        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "GOOGLE_OAUTH_TOKEN"));
        clear_env();
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set("GOOGLE_OAUTH_TOKEN", "t");
        set("SLIDES_API_BASE_URL", "http://localhost:9000/v1");
        set("SEARCH_CONTEXT_CHARS", "12");

        let config = Config::resolve().unwrap();
        assert_eq!(config.slides_api_base_url, "http://localhost:9000/v1");
        assert_eq!(ToolSettings::from(&config).search_context_chars, 12);

        set("HTTP_TIMEOUT_SECS", "soon");
        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HTTP_TIMEOUT_SECS"));

        set("HTTP_TIMEOUT_SECS", "0");
        assert!(Config::resolve().is_err());
        clear_env();
    }

    #[test]
    fn test_search_context_above_cap_is_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        set("GOOGLE_OAUTH_TOKEN", "t");

        set("SEARCH_CONTEXT_CHARS", "500");
        assert_eq!(Config::resolve().unwrap().search_context_chars, 500);

        set("SEARCH_CONTEXT_CHARS", "501");
        let err = Config::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SEARCH_CONTEXT_CHARS"));
        clear_env();
    }

    #[test]
    fn test_parse_bool_env() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert!(parse_bool_env("SLIDESMITH_TEST_FLAG", true).unwrap());
        set("SLIDESMITH_TEST_FLAG", "0");
        assert!(!parse_bool_env("SLIDESMITH_TEST_FLAG", true).unwrap());
        set("SLIDESMITH_TEST_FLAG", "maybe");
        assert!(parse_bool_env("SLIDESMITH_TEST_FLAG", true).is_err());

        assert!(!log_json().unwrap());
        set("SLIDESMITH_LOG_JSON", "true");
        assert!(log_json().unwrap());
        clear_env();
    }
}
