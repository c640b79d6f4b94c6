use image::RgbImage;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::color_aggregator::ColorAggregator;
use super::hypothesis_scorer::HypothesisScorer;
use super::region_extractor::{ContourSmoothing, RegionExtractor};
use super::result_emitter::ResultEmitter;
use crate::config::MatcherSettings;
use crate::error::{MatcherError, SkipReason};
use crate::pipeline::models::ModelStore;
use crate::pipeline::palette::{LookupTablePalette, Palette};
use crate::pipeline::types::{ColorMatch, Entity};

pub const MODULE_NAME: &str = "color_matcher";

struct MatcherEngine {
    palette: Arc<dyn Palette>,
    models: Arc<ModelStore>,
    extractor: RegionExtractor,
    aggregator: ColorAggregator,
    scorer: HypothesisScorer,
}

/// Perception module estimating an entity's color composition and scoring it
/// against learned color models.
///
/// The palette and model store are loaded once and only read afterwards. A
/// matcher whose palette failed to load is disabled and every call is a no-op.
pub struct ColorMatcher {
    engine: Option<MatcherEngine>,
    emitter: ResultEmitter,
}

impl ColorMatcher {
    pub fn new(palette: Arc<dyn Palette>, models: ModelStore, smoothing: ContourSmoothing) -> Self {
        Self {
            engine: Some(MatcherEngine {
                palette,
                models: Arc::new(models),
                extractor: RegionExtractor::new(smoothing),
                aggregator: ColorAggregator::new(),
                scorer: HypothesisScorer::new(),
            }),
            emitter: ResultEmitter::new(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            engine: None,
            emitter: ResultEmitter::new(),
        }
    }

    /// Loads the palette and the learned models named by `settings`.
    ///
    /// Failing to load the palette disables the matcher; failing to load
    /// models only leaves them out of the store.
    pub fn initialize(settings: &MatcherSettings) -> Self {
        info!("[{}] Loading color names...", MODULE_NAME);

        let palette = match LookupTablePalette::load(&settings.palette_path) {
            Ok(palette) => palette,
            Err(e) => {
                error!(
                    "[{}] Failed loading color names from {}: {}. Module disabled.",
                    MODULE_NAME,
                    settings.palette_path.display(),
                    e
                );
                return Self::disabled();
            }
        };

        let models = load_models(settings);
        info!(
            "[{}] Ready! {} models loaded",
            MODULE_NAME,
            models.len()
        );

        Self::new(
            Arc::new(palette),
            models,
            ContourSmoothing::from(&settings.smoothing),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    pub fn models(&self) -> Option<&ModelStore> {
        self.engine.as_ref().map(|engine| engine.models.as_ref())
    }

    /// Runs region extraction, color aggregation and scoring for the entity's
    /// latest measurement.
    pub fn classify(&self, entity: &Entity) -> Result<ColorMatch, SkipReason> {
        let engine = self.engine.as_ref().ok_or(SkipReason::Disabled)?;
        let measurement = entity
            .last_measurement
            .as_ref()
            .ok_or(SkipReason::MissingMeasurement)?;

        let image = &measurement.image;
        let extracted = engine
            .extractor
            .extract(&measurement.mask, image.width(), image.height())?;
        let region = extracted.region;

        let region_image: RgbImage = image::imageops::crop_imm(
            image,
            region.min_x,
            region.min_y,
            region.width(),
            region.height(),
        )
        .to_image();
        let region_mask = extracted.region_mask();

        let observation =
            engine
                .aggregator
                .aggregate(engine.palette.as_ref(), &region_image, &region_mask)?;
        let hypothesis = engine
            .scorer
            .score(&observation.distribution, engine.models.as_ref());

        Ok(ColorMatch {
            region,
            observation,
            hypothesis,
        })
    }

    /// Writes the classification result into `result`.
    pub fn write_result(&self, result: &ColorMatch, document: &mut Value) -> Result<(), MatcherError> {
        self.emitter.emit(result, document)
    }

    /// Classifies the entity and records the outcome in `result`.
    ///
    /// Never fails: skipped entities and emission problems leave `result`
    /// without a `color_matcher` group.
    pub fn process(&self, entity: &Entity, result: &mut Value) {
        match self.classify(entity) {
            Ok(color_match) => {
                if let Err(e) = self.write_result(&color_match, result) {
                    warn!(
                        "[{}] Could not write result for entity {}: {}",
                        MODULE_NAME, entity.id, e
                    );
                }
            }
            Err(SkipReason::Disabled) => {}
            Err(reason) => debug!(
                "[{}] Skipping entity {}: {}",
                MODULE_NAME, entity.id, reason
            ),
        }
    }
}

fn load_models(settings: &MatcherSettings) -> ModelStore {
    let mut builder = ModelStore::builder();

    if settings.model_names.is_empty() {
        if let Err(e) = builder.load_directory(&settings.models_dir) {
            warn!("[{}] Could not load models: {}", MODULE_NAME, e);
        }
    } else {
        builder.load_named(&settings.models_dir, &settings.model_names);
    }

    builder.build()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::models::save_model;
    use crate::pipeline::palette::channel_table;
    use crate::pipeline::services::color_aggregator::tests::ChannelPalette;
    use crate::pipeline::services::result_emitter::ColorMatcherGroup;
    use crate::pipeline::types::{
        ColorName, ColorSet, EntityMeasurement, ObjectModel, PixelMask, RegionOfInterest,
    };
    use image::Rgb;
    use std::fs;
    use tempfile::tempdir;

    fn set(entries: &[(ColorName, f64)]) -> ColorSet {
        entries.iter().copied().collect()
    }

    pub(crate) fn sample_store() -> ModelStore {
        ModelStore::builder()
            .with_model(
                ObjectModel::new("coke")
                    .with_variant(set(&[(ColorName::Red, 1.0)]))
                    .with_variant(set(&[(ColorName::Red, 0.7), (ColorName::Blue, 0.3)])),
            )
            .with_model(ObjectModel::new("sky").with_variant(set(&[(ColorName::Blue, 1.0)])))
            .with_model(ObjectModel::new("unlearned"))
            .build()
    }

    /// A 40x40 image: left half red, right half blue, with the mask covering
    /// a centered 20x20 square.
    pub(crate) fn sample_entity() -> Entity {
        let image = RgbImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgb([220, 20, 20])
            } else {
                Rgb([20, 20, 220])
            }
        });
        let points = (10..30).flat_map(|y| (10..30).map(move |x| (x, y)));
        Entity::new(EntityMeasurement::new(
            image,
            PixelMask::from_points(40, 40, points),
        ))
    }

    pub(crate) fn sample_matcher() -> ColorMatcher {
        ColorMatcher::new(
            Arc::new(ChannelPalette),
            sample_store(),
            ContourSmoothing::default(),
        )
    }

    #[test]
    fn test_classifies_a_masked_entity() {
        let result = sample_matcher().classify(&sample_entity()).unwrap();

        assert_eq!(result.region.width(), 20);
        let distribution = &result.observation.distribution;
        assert!((distribution.total() - 1.0).abs() < 1e-9);
        assert!(distribution.probability(ColorName::Red) > 0.0);
        assert!(distribution.probability(ColorName::Blue) > 0.0);
        assert_eq!(
            result.observation.histogram.total(),
            result.observation.pixel_count()
        );

        let hypothesis = &result.hypothesis;
        assert_eq!(hypothesis.len(), 2);
        assert!(!hypothesis.contains("unlearned"));

        let red = distribution.probability(ColorName::Red);
        let blue = distribution.probability(ColorName::Blue);
        let expected_coke = red.min(0.7 * red + 0.3 * blue);
        assert!((hypothesis.score("coke").unwrap() - expected_coke).abs() < 1e-12);
        assert!((hypothesis.score("sky").unwrap() - blue).abs() < 1e-12);
    }

    #[test]
    fn test_empty_mask_is_a_no_op() {
        let entity = Entity::new(EntityMeasurement::new(
            RgbImage::new(8, 8),
            PixelMask::new(8, 8),
        ));
        let matcher = sample_matcher();
        assert_eq!(matcher.classify(&entity), Err(SkipReason::EmptyMask));

        let mut document = Value::Null;
        matcher.process(&entity, &mut document);
        assert!(document.is_null());
    }

    #[test]
    fn test_missing_measurement_is_a_no_op() {
        let matcher = sample_matcher();
        let entity = Entity::without_measurement();
        assert_eq!(
            matcher.classify(&entity),
            Err(SkipReason::MissingMeasurement)
        );

        let mut document = serde_json::json!({ "id": "e" });
        matcher.process(&entity, &mut document);
        assert_eq!(document, serde_json::json!({ "id": "e" }));
    }

    #[test]
    fn test_process_survives_malformed_masks() {
        let matcher = sample_matcher();

        let stray_point = Entity::new(EntityMeasurement::new(
            RgbImage::from_pixel(40, 40, Rgb([220, 20, 20])),
            PixelMask::from_points(
                10,
                10,
                (2..6)
                    .flat_map(|y| (2..6).map(move |x| (x, y)))
                    .chain([(2_000_000_000, 1)]),
            ),
        ));
        let result = matcher.classify(&stray_point).unwrap();
        assert_eq!(result.region, RegionOfInterest::new(8, 8, 23, 23));
        let mut document = Value::Null;
        matcher.process(&stray_point, &mut document);
        assert!(ColorMatcherGroup::read(&document).is_some());

        let wide_image = Entity::new(EntityMeasurement::new(
            RgbImage::new(70_000, 1),
            PixelMask::from_points(1, 1, [(0, 0)]),
        ));
        assert_eq!(
            matcher.classify(&wide_image),
            Err(SkipReason::DegenerateRegion)
        );
        let mut document = serde_json::json!({ "id": "wide" });
        matcher.process(&wide_image, &mut document);
        assert_eq!(document, serde_json::json!({ "id": "wide" }));
    }

    #[test]
    fn test_disabled_matcher_writes_nothing() {
        let matcher = ColorMatcher::disabled();
        assert!(!matcher.is_enabled());
        assert_eq!(
            matcher.classify(&sample_entity()),
            Err(SkipReason::Disabled)
        );

        let mut document = Value::Null;
        matcher.process(&sample_entity(), &mut document);
        assert!(document.is_null());
    }

    #[test]
    fn test_process_writes_the_result_group() {
        let mut document = Value::Null;
        sample_matcher().process(&sample_entity(), &mut document);

        let group = ColorMatcherGroup::read(&document).unwrap().unwrap();
        let names: Vec<&str> = group.colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["blue", "red"]);
        let models: Vec<&str> = group.hypothesis.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(models, vec!["coke", "sky"]);
    }

    #[test]
    fn test_initialize_without_palette_disables_the_module() {
        let dir = tempdir().unwrap();
        let settings = MatcherSettings {
            palette_path: dir.path().join("missing.txt"),
            models_dir: dir.path().to_path_buf(),
            ..MatcherSettings::default()
        };
        assert!(!ColorMatcher::initialize(&settings).is_enabled());
    }

    #[test]
    fn test_initialize_loads_palette_and_models() {
        let dir = tempdir().unwrap();
        let palette_path = dir.path().join("color_names.txt");
        fs::write(&palette_path, channel_table()).unwrap();
        let models_dir = dir.path().join("models");
        save_model(
            &ObjectModel::new("sky").with_variant(set(&[(ColorName::Blue, 1.0)])),
            &models_dir,
        )
        .unwrap();

        let settings = MatcherSettings {
            palette_path,
            models_dir,
            ..MatcherSettings::default()
        };
        let matcher = ColorMatcher::initialize(&settings);
        assert!(matcher.is_enabled());
        assert!(matcher.models().unwrap().contains("sky"));

        let result = matcher.classify(&sample_entity()).unwrap();
        assert!(result.hypothesis.score("sky").unwrap() > 0.0);
    }

    #[test]
    fn test_initialize_without_models_still_runs() {
        let dir = tempdir().unwrap();
        let palette_path = dir.path().join("color_names.txt");
        fs::write(&palette_path, channel_table()).unwrap();

        let settings = MatcherSettings {
            palette_path,
            models_dir: dir.path().join("nowhere"),
            ..MatcherSettings::default()
        };
        let matcher = ColorMatcher::initialize(&settings);
        assert!(matcher.is_enabled());

        let result = matcher.classify(&sample_entity()).unwrap();
        assert!(result.hypothesis.is_empty());
        assert!(!result.observation.distribution.is_empty());
    }
}
