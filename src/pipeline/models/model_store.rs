use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use super::model_file::{load_model, model_path, MODEL_FILE_EXTENSION};
use crate::error::ModelError;
use crate::pipeline::types::ObjectModel;

/// Read-only collection of learned models, keyed and enumerated by name.
///
/// Built once through [`ModelStoreBuilder`]; nothing mutates it afterwards, so
/// it can be shared between concurrent classifications without locking.
#[derive(Debug, Clone, Default)]
pub struct ModelStore {
    models: BTreeMap<String, ObjectModel>,
}

impl ModelStore {
    pub fn builder() -> ModelStoreBuilder {
        ModelStoreBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&ObjectModel> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Models ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectModel> + '_ {
        self.models.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Outcome of offering a model to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// A model with the same name was loaded earlier and is kept.
    DuplicateDiscarded,
}

/// Accumulates models during initialization.
///
/// Merge policy is first-loaded wins: when a name is already present the new
/// definition is discarded and a warning is logged.
#[derive(Debug, Default)]
pub struct ModelStoreBuilder {
    models: BTreeMap<String, ObjectModel>,
}

impl ModelStoreBuilder {
    pub fn insert(&mut self, model: ObjectModel) -> MergeOutcome {
        if self.models.contains_key(&model.name) {
            warn!(
                "Model '{}' already loaded, discarding later definition",
                model.name
            );
            return MergeOutcome::DuplicateDiscarded;
        }
        self.models.insert(model.name.clone(), model);
        MergeOutcome::Inserted
    }

    pub fn with_model(mut self, model: ObjectModel) -> Self {
        self.insert(model);
        self
    }

    /// Loads one model file into the store.
    pub fn load_file(&mut self, path: &Path) -> Result<MergeOutcome, ModelError> {
        let model = load_model(path)?;
        let name = model.name.clone();
        let outcome = self.insert(model);
        if outcome == MergeOutcome::Inserted {
            info!("Loaded colors for {}", name);
        }
        Ok(outcome)
    }

    /// Loads `<models_dir>/<name>/<name>.yml` for every name given.
    ///
    /// A model that fails to load is logged and skipped. Returns how many
    /// models were added.
    pub fn load_named<S: AsRef<str>>(&mut self, models_dir: &Path, names: &[S]) -> usize {
        let mut loaded = 0;
        for name in names {
            let path = model_path(models_dir, name.as_ref());
            match self.load_file(&path) {
                Ok(MergeOutcome::Inserted) => loaded += 1,
                Ok(MergeOutcome::DuplicateDiscarded) => {}
                Err(e) => warn!("Skipping model '{}': {}", name.as_ref(), e),
            }
        }
        loaded
    }

    /// Loads every model laid out as `<models_dir>/<name>/<name>.yml`,
    /// visiting subdirectories in name order.
    pub fn load_directory(&mut self, models_dir: &Path) -> Result<usize, ModelError> {
        let entries = std::fs::read_dir(models_dir)
            .map_err(|e| ModelError::ReadError(e, models_dir.to_path_buf()))?;

        let mut names = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if model_path(models_dir, &name).is_file() {
                names.push(name);
            } else {
                debug!(
                    "Directory '{}' holds no .{} model file, ignoring",
                    name, MODEL_FILE_EXTENSION
                );
            }
        }
        names.sort();

        Ok(self.load_named(models_dir, &names))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn build(self) -> ModelStore {
        ModelStore {
            models: self.models,
        }
    }
}
