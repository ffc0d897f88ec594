use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Gemini REST base URL (v1 surface).
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1";

/// Model used for image description.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default request body ceiling (20MB).
const DEFAULT_UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub upload: UploadConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Sent as the `key` query parameter. Not validated locally: a missing or
    /// wrong key surfaces as the provider's own rejection.
    pub api_key: Secret<String>,
    pub api_base: String,
    pub model: String,
    /// `None` leaves outbound calls unbounded.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl VisionConfig {
    pub fn load() -> Result<Self, AppError> {
        // Also pulls `.env` into the environment before the lookups below.
        let common_config = core_config::Config::load()?;

        let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        Ok(VisionConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: Secret::new(api_key),
                api_base: get_env("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                model: get_env("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                timeout: parse_optional_env::<u64>("GEMINI_TIMEOUT_SECS")?
                    .map(Duration::from_secs),
            },
            upload: UploadConfig {
                max_bytes: parse_optional_env("UPLOAD_MAX_BYTES")?
                    .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map(Some).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
        }),
        _ => Ok(None),
    }
}
