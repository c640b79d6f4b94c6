use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::model_file::{save_model, validate_model_name};
use crate::error::{ModelError, SkipReason};
use crate::pipeline::services::result_emitter::ColorMatcherGroup;
use crate::pipeline::services::ColorMatcher;
use crate::pipeline::types::{
    ColorName, ColorSet, Entity, EntityMeasurement, ObjectModel, PixelMask,
};

pub const RECORDING_EXTENSION: &str = "json";
pub const MEASUREMENT_EXTENSION: &str = "png";
/// Suffix of the mask image recorded next to `<stem>.png`.
pub const MASK_SUFFIX: &str = ".mask.png";

/// Builds color models from recorded classification results.
///
/// Every recorded `color_matcher` group of an object becomes one more color
/// set (variant) of that object's model.
#[derive(Debug, Default)]
pub struct ModelLearner {
    models: BTreeMap<String, ObjectModel>,
    /// Models to learn; empty accepts all.
    model_names: BTreeSet<String>,
}

impl ModelLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts learning to `names`. An empty list accepts every model.
    pub fn with_model_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.model_names = names.iter().map(|name| name.as_ref().to_string()).collect();
        self
    }

    pub fn accepts(&self, model_name: &str) -> bool {
        self.model_names.is_empty() || self.model_names.contains(model_name)
    }

    /// Observed colors of a result document as a color set, if the document
    /// holds a readable `color_matcher` group with at least one known color.
    pub fn color_set_from_result(document: &Value) -> Option<ColorSet> {
        let group = match ColorMatcherGroup::read(document)? {
            Ok(group) => group,
            Err(e) => {
                warn!("'color_matcher' group incorrectly built: {}", e);
                return None;
            }
        };

        let mut set = ColorSet::new();
        for entry in group.colors {
            match entry.name.parse::<ColorName>() {
                Ok(color) if entry.value.is_finite() && entry.value >= 0.0 => {
                    set.insert(color, entry.value);
                }
                Ok(color) => warn!("Invalid amount {} for '{}', skipped", entry.value, color),
                Err(e) => warn!("{}, skipped", e),
            }
        }

        (!set.is_empty()).then_some(set)
    }

    pub fn add_observation(&mut self, model_name: &str, set: ColorSet) {
        self.models
            .entry(model_name.to_string())
            .or_insert_with(|| ObjectModel::new(model_name))
            .add_variant(set);
    }

    /// Adds the colors recorded in `document` to `model_name`. Returns whether
    /// anything was learned.
    pub fn learn_from_result(&mut self, model_name: &str, document: &Value) -> bool {
        if !self.accepts(model_name) {
            return false;
        }
        match Self::color_set_from_result(document) {
            Some(set) => {
                self.add_observation(model_name, set);
                true
            }
            None => false,
        }
    }

    /// Classifies `entity` with `matcher` and adds its observed distribution
    /// to `model_name` as a new color set. Returns `Ok(false)` for models
    /// outside the learned list.
    pub fn learn_from_entity(
        &mut self,
        matcher: &ColorMatcher,
        model_name: &str,
        entity: &Entity,
    ) -> Result<bool, SkipReason> {
        if !self.accepts(model_name) {
            return Ok(false);
        }
        let result = matcher.classify(entity)?;
        let set: ColorSet = result.observation.distribution.iter().collect();
        self.add_observation(model_name, set);
        Ok(true)
    }

    /// Learns from `<recordings_dir>/<model>/*.json`, visiting models and
    /// recordings in name order. Returns the number of recordings learned.
    pub fn learn_from_recordings(&mut self, recordings_dir: &Path) -> Result<usize, ModelError> {
        let mut learned = 0;
        for (model_name, model_dir) in self.model_dirs(recordings_dir)? {
            for recording in sorted_entries(&model_dir)? {
                if recording.extension().and_then(|e| e.to_str()) != Some(RECORDING_EXTENSION) {
                    continue;
                }
                match read_recording(&recording) {
                    Ok(document) => {
                        if self.learn_from_result(&model_name, &document) {
                            learned += 1;
                        } else {
                            debug!("No colors in {}", recording.display());
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        }
        Ok(learned)
    }

    /// Runs `matcher` over recorded measurements and learns the results.
    ///
    /// Each measurement is `<recordings_dir>/<model>/<stem>.png` with its mask
    /// in `<stem>.mask.png`; any non-black mask pixel belongs to the entity.
    /// Returns the number of measurements learned.
    pub fn learn_from_measurements(
        &mut self,
        matcher: &ColorMatcher,
        recordings_dir: &Path,
    ) -> Result<usize, ModelError> {
        let mut learned = 0;
        for (model_name, model_dir) in self.model_dirs(recordings_dir)? {
            for image_path in sorted_entries(&model_dir)? {
                let Some(mask_path) = mask_path_for(&image_path) else {
                    continue;
                };
                let entity = match read_measurement(&image_path, &mask_path) {
                    Ok(measurement) => Entity::new(measurement),
                    Err(e) => {
                        warn!("{}", e);
                        continue;
                    }
                };
                match self.learn_from_entity(matcher, &model_name, &entity) {
                    Ok(true) => learned += 1,
                    Ok(false) => {}
                    Err(reason) => debug!("No colors in {}: {}", image_path.display(), reason),
                }
            }
        }
        Ok(learned)
    }

    /// Model directories below `recordings_dir` whose model is learned, in
    /// name order.
    fn model_dirs(&self, recordings_dir: &Path) -> Result<Vec<(String, PathBuf)>, ModelError> {
        let mut dirs = Vec::new();
        for model_dir in sorted_entries(recordings_dir)? {
            if !model_dir.is_dir() {
                continue;
            }
            let Some(model_name) = model_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Err(e) = validate_model_name(model_name) {
                warn!("Skipping recordings in {}: {}", model_dir.display(), e);
                continue;
            }
            if !self.accepts(model_name) {
                debug!("Skipping model '{}', not on the model list", model_name);
                continue;
            }
            dirs.push((model_name.to_string(), model_dir));
        }
        Ok(dirs)
    }

    pub fn get(&self, model_name: &str) -> Option<&ObjectModel> {
        self.models.get(model_name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ObjectModel> + '_ {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Saves every learned model below `output_dir`.
    pub fn save_all(&self, output_dir: &Path) -> Result<Vec<PathBuf>, ModelError> {
        let mut written = Vec::with_capacity(self.models.len());
        for model in self.models.values() {
            let path = save_model(model, output_dir)?;
            info!("Saving model for '{}' at {}", model.name, path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ModelError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| ModelError::ReadError(e, dir.to_path_buf()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Mask recorded for a measurement image, if `path` is one and its mask exists.
fn mask_path_for(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.ends_with(MASK_SUFFIX) {
        return None;
    }
    let stem = file_name.strip_suffix(&format!(".{}", MEASUREMENT_EXTENSION))?;
    let mask_path = path.with_file_name(format!("{}{}", stem, MASK_SUFFIX));
    mask_path.is_file().then_some(mask_path)
}

fn read_measurement(image_path: &Path, mask_path: &Path) -> Result<EntityMeasurement, ModelError> {
    let image = image::open(image_path)
        .map_err(|e| ModelError::ImageError(e, image_path.to_path_buf()))?
        .to_rgb8();
    let mask_image = image::open(mask_path)
        .map_err(|e| ModelError::ImageError(e, mask_path.to_path_buf()))?
        .to_luma8();

    let points = mask_image
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel[0] > 0)
        .map(|(x, y, _)| (x, y));
    let mask = PixelMask::from_points(mask_image.width(), mask_image.height(), points);
    Ok(EntityMeasurement::new(image, mask))
}

fn read_recording(path: &Path) -> Result<Value, ModelError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ModelError::ReadError(e, path.to_path_buf()))?;
    serde_json::from_str(&contents).map_err(|e| ModelError::RecordingError(e, path.to_path_buf()))
}
