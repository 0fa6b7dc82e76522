//! Configuration management for huurscan using the prefer crate.
//!
//! Settings come from, in increasing priority: built-in defaults, a config
//! file (explicit path or discovered by prefer), `HUURSCAN_*` environment
//! variables, and finally CLI flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::{OcrBackendType, OcrConfig};
use crate::services::contract::DEFAULT_LOW_CONFIDENCE_THRESHOLD;
use crate::services::reconcile::ReconcilePolicy;

/// Raw confidence of a pattern match found in OCR-derived text.
pub const DEFAULT_OCR_CONFIDENCE: f32 = 0.9;

/// Default deadline for processing one document, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// Effective application settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Run OCR on embedded images.
    pub ocr_enabled: bool,
    /// OCR engine.
    pub ocr_backend: OcrBackendType,
    /// OCR language code (Tesseract notation).
    pub ocr_language: String,
    /// Tessdata or ocrs model directory.
    pub ocr_model_path: Option<PathBuf>,
    /// Raw confidence of pattern matches inside OCR text.
    pub ocr_confidence: f32,
    /// Median filter radius for image denoising (0 disables).
    pub denoise_radius: u32,
    /// Threshold for low-confidence validation issues.
    pub low_confidence_threshold: f32,
    /// Conflict resolution between candidates.
    pub reconcile_policy: ReconcilePolicy,
    /// Deadline for processing one document.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ocr_enabled: true,
            ocr_backend: OcrBackendType::Tesseract,
            ocr_language: "nld".to_string(),
            ocr_model_path: None,
            ocr_confidence: DEFAULT_OCR_CONFIDENCE,
            denoise_radius: 1,
            low_confidence_threshold: DEFAULT_LOW_CONFIDENCE_THRESHOLD,
            reconcile_policy: ReconcilePolicy::Confidence,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// OCR backend configuration derived from these settings.
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            language: self.ocr_language.clone(),
            model_path: self.ocr_model_path.clone(),
        }
    }

    /// Apply `HUURSCAN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("HUURSCAN_OCR_BACKEND") {
            match OcrBackendType::from_str(&backend) {
                Some(parsed) => {
                    tracing::debug!("Using HUURSCAN_OCR_BACKEND from environment: {}", parsed);
                    self.ocr_backend = parsed;
                }
                None => tracing::warn!("Ignoring unknown HUURSCAN_OCR_BACKEND '{}'", backend),
            }
        }
        if let Some(language) = lookup("HUURSCAN_OCR_LANGUAGE") {
            tracing::debug!("Using HUURSCAN_OCR_LANGUAGE from environment: {}", language);
            self.ocr_language = language;
        }
        if let Some(flag) = lookup("HUURSCAN_NO_OCR") {
            if flag == "1" || flag.eq_ignore_ascii_case("true") {
                self.ocr_enabled = false;
            }
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_backend: Option<OcrBackendType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_language: Option<String>,
    /// Relative paths resolve against the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoise_radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_confidence_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile_policy: Option<ReconcilePolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("huurscan").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the file extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Directory of the config file, if loaded from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// Out-of-range confidences are clamped into [0, 1].
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(enabled) = self.ocr_enabled {
            settings.ocr_enabled = enabled;
        }
        if let Some(backend) = self.ocr_backend {
            settings.ocr_backend = backend;
        }
        if let Some(ref language) = self.ocr_language {
            settings.ocr_language = language.clone();
        }
        if let Some(ref model_path) = self.ocr_model_path {
            settings.ocr_model_path = Some(self.resolve_path(model_path, base_dir));
        }
        if let Some(confidence) = self.ocr_confidence {
            settings.ocr_confidence = clamp_unit("ocr_confidence", confidence);
        }
        if let Some(radius) = self.denoise_radius {
            settings.denoise_radius = radius;
        }
        if let Some(threshold) = self.low_confidence_threshold {
            settings.low_confidence_threshold = clamp_unit("low_confidence_threshold", threshold);
        }
        if let Some(policy) = self.reconcile_policy {
            settings.reconcile_policy = policy;
        }
        if let Some(timeout) = self.timeout_secs {
            settings.timeout_secs = timeout;
        }
    }
}

fn clamp_unit(name: &str, value: f32) -> f32 {
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    if clamped != value {
        tracing::warn!("{} = {} is outside [0, 1], using {}", name, value, clamped);
    }
    clamped
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (skips discovery).
    pub config_path: Option<PathBuf>,
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    settings.apply_env_overrides();

    Ok((settings, config))
}
