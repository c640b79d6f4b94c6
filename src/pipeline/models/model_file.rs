//! On-disk layout of a learned model.
//!
//! ```yaml
//! model:
//!   name: mug
//!   color:
//!     - set:
//!         - red: 0.6
//!         - white: 0.4
//!     - set:
//!         - blue: 1.0
//! ```
//!
//! Files live at `<models_dir>/<name>/<name>.yml`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::pipeline::types::{ColorName, ColorSet, ObjectModel};

pub const MODEL_FILE_EXTENSION: &str = "yml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub model: ModelSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Vec<ColorSetEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorSetEntry {
    #[serde(default)]
    pub set: Vec<IndexMap<String, serde_yaml::Value>>,
}

/// Rejects names that could escape the models directory.
pub fn validate_model_name(name: &str) -> Result<(), ModelError> {
    let reason = if name.trim().is_empty() {
        Some("name cannot be empty")
    } else if name.contains('/') || name.contains('\\') {
        Some("name cannot contain path separators")
    } else if name.contains("..") {
        Some("name cannot contain '..'")
    } else if name.starts_with('.') {
        Some("name cannot start with '.'")
    } else if name.contains('\0') {
        Some("name cannot contain null bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ModelError::InvalidName(name.to_string(), reason)),
        None => Ok(()),
    }
}

pub fn model_path(models_dir: &Path, name: &str) -> PathBuf {
    models_dir
        .join(name)
        .join(format!("{}.{}", name, MODEL_FILE_EXTENSION))
}

impl ModelDocument {
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ModelError> {
        serde_yaml::from_str(contents).map_err(|e| ModelError::ParseError(e, path.to_path_buf()))
    }

    pub fn read(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModelError::ReadError(e, path.to_path_buf()))?;
        Self::parse(&contents, path)
    }

    pub fn from_model(model: &ObjectModel) -> Self {
        let color = model
            .variants
            .iter()
            .map(|variant| ColorSetEntry {
                set: variant
                    .iter()
                    .map(|(color, weight)| {
                        let mut entry = IndexMap::new();
                        entry.insert(color.as_str().to_string(), serde_yaml::Value::from(weight));
                        entry
                    })
                    .collect(),
            })
            .collect();

        Self {
            model: ModelSection {
                name: Some(model.name.clone()),
                color,
            },
        }
    }

    pub fn to_yaml(&self) -> Result<String, ModelError> {
        let name = self.model.name.clone().unwrap_or_default();
        serde_yaml::to_string(self).map_err(|e| ModelError::SerializeError(e, name))
    }

    /// Validates the document into a model.
    ///
    /// Entries naming an unknown color or carrying a negative, non-finite or
    /// non-numeric weight are logged and skipped. A set left without entries
    /// is dropped; a model left without sets is an error.
    pub fn into_model(self, fallback_name: &str) -> Result<ObjectModel, ModelError> {
        let name = match self.model.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                warn!(
                    "Model file has no name, using '{}' from its location",
                    fallback_name
                );
                fallback_name.to_string()
            }
        };

        let mut model = ObjectModel::new(name);
        for (set_index, entry) in self.model.color.into_iter().enumerate() {
            let variant = parse_color_set(&model.name, set_index, entry);
            if variant.is_empty() {
                warn!(
                    "Model '{}': color set {} has no valid entries, dropping it",
                    model.name, set_index
                );
                continue;
            }
            model.add_variant(variant);
        }

        if !model.has_variants() {
            return Err(ModelError::NoValidVariants(model.name));
        }

        debug!(
            "Parsed model '{}' with {} color sets",
            model.name,
            model.variants.len()
        );
        Ok(model)
    }
}

fn parse_color_set(model_name: &str, set_index: usize, entry: ColorSetEntry) -> ColorSet {
    let mut variant = ColorSet::new();

    for pairs in entry.set {
        for (key, value) in pairs {
            let color = match key.parse::<ColorName>() {
                Ok(color) => color,
                Err(e) => {
                    warn!(
                        "Model '{}': color set {}: {}, entry rejected",
                        model_name, set_index, e
                    );
                    continue;
                }
            };

            let weight = match value.as_f64() {
                Some(weight) if weight.is_finite() && weight >= 0.0 => weight,
                _ => {
                    warn!(
                        "Model '{}': color set {}: invalid weight {:?} for '{}', entry rejected",
                        model_name, set_index, value, color
                    );
                    continue;
                }
            };

            if !variant.insert(color, weight) {
                warn!(
                    "Model '{}': color set {}: '{}' listed twice, keeping the first weight",
                    model_name, set_index, color
                );
            }
        }
    }

    variant
}

/// Reads and validates one model file. The file stem names the model when
/// the file itself does not.
pub fn load_model(path: &Path) -> Result<ObjectModel, ModelError> {
    let fallback_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    ModelDocument::read(path)?.into_model(&fallback_name)
}

/// Writes `model` to `<models_dir>/<name>/<name>.yml`, creating directories.
pub fn save_model(model: &ObjectModel, models_dir: &Path) -> Result<PathBuf, ModelError> {
    validate_model_name(&model.name)?;

    let path = model_path(models_dir, &model.name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ModelError::WriteError(e, parent.to_path_buf()))?;
    }

    let yaml = ModelDocument::from_model(model).to_yaml()?;
    std::fs::write(&path, yaml).map_err(|e| ModelError::WriteError(e, path.clone()))?;
    Ok(path)
}
