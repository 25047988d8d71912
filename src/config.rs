//! Application configuration.
//!
//! Loads settings from config.json at startup. Every field has a default, so
//! a partial file (or none at all) is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::export::{CsvOptions, DEFAULT_CSV_FILENAME};
use crate::ocr::TesseractSettings;
use crate::remote::BackoffPolicy;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key (prefer the GEMINI_API_KEY environment variable)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model name used in the generateContent URL
    #[serde(default = "default_model")]
    pub model: String,
    /// API root, without the `/models/...` suffix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Attempts per image, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles each retry (milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Tesseract languages, e.g. "eng" or "eng+fra+deu"
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,
    /// Tesseract page segmentation mode
    #[serde(default = "default_ocr_psm")]
    pub ocr_page_segmentation_mode: u8,
    /// Explicit Tesseract executable
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
    /// Prepend a UTF-8 byte-order mark to the CSV
    #[serde(default = "default_byte_order_mark")]
    pub byte_order_mark: bool,
    /// CSV written when --output is not given
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_ocr_languages() -> String {
    "eng".to_string()
}

fn default_ocr_psm() -> u8 {
    6 // Uniform block of text; keeps leaderboard rows together
}

fn default_byte_order_mark() -> bool {
    true
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_FILENAME)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            ocr_languages: default_ocr_languages(),
            ocr_page_segmentation_mode: default_ocr_psm(),
            tesseract_path: None,
            tessdata_dir: None,
            byte_order_mark: default_byte_order_mark(),
            output_file: default_output_file(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    pub fn tesseract_settings(&self) -> TesseractSettings {
        TesseractSettings {
            executable: self.tesseract_path.clone(),
            tessdata_dir: self.tessdata_dir.clone(),
            languages: self.ocr_languages.clone(),
            page_segmentation_mode: self.ocr_page_segmentation_mode,
        }
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            byte_order_mark: self.byte_order_mark,
        }
    }

    /// First non-empty key from: command line, environment, config file.
    pub fn resolve_api_key(&self, cli_key: Option<&str>, env_key: Option<String>) -> Option<String> {
        cli_key
            .map(str::to_string)
            .into_iter()
            .chain(env_key)
            .chain(self.api_key.clone())
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
    }
}

/// Reads and parses one config file.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Default config locations: next to the executable, then the user config dir.
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![crate::paths::get_exe_dir().join("config.json")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("leaderboard-extract").join("config.json"));
    }
    candidates
}

/// Loads configuration. An explicit path must load; otherwise the first
/// existing default location is used, falling back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        let config = load_config_file(path)?;
        crate::log(&format!("Config loaded from {}", path.display()));
        return Ok(config);
    }

    for path in config_candidates() {
        crate::log(&format!("Looking for config at: {}", path.display()));
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                crate::log(&format!("Config loaded from {}", path.display()));
                return Ok(config);
            }
            Err(e) => {
                crate::log(&format!("{:#}. Using defaults.", e));
                return Ok(AppConfig::default());
            }
        }
    }

    crate::log("config.json not found. Using default config.");
    Ok(AppConfig::default())
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config(explicit: Option<&Path>) -> Result<&'static AppConfig> {
    let config = load_config(explicit)?;
    Ok(CONFIG.get_or_init(|| config))
}
