use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::MatcherError;

pub const ENV_PREFIX: &str = "COLOR_MATCHER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub matcher: MatcherSettings,
    pub learning: LearningSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub palette_path: PathBuf,
    pub models_dir: PathBuf,
    /// Models to load from `models_dir`; empty loads every model found there.
    pub model_names: Vec<String>,
    pub smoothing: SmoothingSettings,
}

/// Box-blur kernels `first_kernel, first_kernel + step, ..= last_kernel`
/// followed by a `> threshold` cut. The box filter only has odd windows, so a
/// kernel `k` blurs over `k / 2` pixels on each side (`k + 1` wide).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub first_kernel: u32,
    pub last_kernel: u32,
    pub step: u32,
    pub threshold: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LearningSettings {
    pub recordings_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Models to learn; recordings of any other model are skipped. Empty
    /// learns every model found.
    pub model_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            matcher: MatcherSettings::default(),
            learning: LearningSettings::default(),
        }
    }
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            palette_path: PathBuf::from("config/color_names.txt"),
            models_dir: PathBuf::from("models"),
            model_names: Vec::new(),
            smoothing: SmoothingSettings::default(),
        }
    }
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            first_kernel: 6,
            last_kernel: 16,
            step: 2,
            threshold: 50,
        }
    }
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            output_dir: PathBuf::from("models"),
            model_names: Vec::new(),
        }
    }
}

impl Settings {
    /// Layers an optional settings file under `COLOR_MATCHER__*` environment
    /// variables, e.g. `COLOR_MATCHER__MATCHER__MODELS_DIR`.
    pub fn load(path: Option<&Path>) -> Result<Self, MatcherError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("matcher.model_names")
                    .with_list_parse_key("learning.model_names")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MatcherError> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(MatcherError::InvalidSettings(format!(
                "Unknown log level '{}'",
                self.log_level
            )));
        }

        self.matcher.smoothing.validate()
    }

    /// Level for the log subscriber. Settings that passed [`Settings::validate`]
    /// always name a valid level.
    pub fn log_level(&self) -> tracing::Level {
        self.log_level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }
}

impl SmoothingSettings {
    pub fn validate(&self) -> Result<(), MatcherError> {
        if self.step == 0 {
            return Err(MatcherError::InvalidSettings(
                "Smoothing step must be greater than 0".to_string(),
            ));
        }

        if self.first_kernel == 0 {
            return Err(MatcherError::InvalidSettings(
                "First smoothing kernel must be greater than 0".to_string(),
            ));
        }

        if self.first_kernel > self.last_kernel {
            return Err(MatcherError::InvalidSettings(
                "First smoothing kernel cannot exceed the last".to_string(),
            ));
        }

        Ok(())
    }
}
