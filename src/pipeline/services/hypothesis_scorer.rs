use tracing::debug;

use crate::pipeline::models::ModelStore;
use crate::pipeline::types::{ColorDistribution, ColorSet, Hypothesis, ObjectModel};

/// Scores an observed distribution against every stored model.
///
/// A variant scores the weighted sum of the observed fractions of its colors.
/// A model scores the minimum over its variants, so it is only as credible as
/// its worst-matching learned appearance.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypothesisScorer;

impl HypothesisScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_variant(&self, distribution: &ColorDistribution, variant: &ColorSet) -> f64 {
        variant
            .iter()
            .map(|(color, weight)| weight * distribution.probability(color))
            .sum()
    }

    /// `None` for a model without variants.
    pub fn score_model(&self, distribution: &ColorDistribution, model: &ObjectModel) -> Option<f64> {
        model
            .variants
            .iter()
            .map(|variant| self.score_variant(distribution, variant))
            .reduce(f64::min)
    }

    pub fn score(&self, distribution: &ColorDistribution, models: &ModelStore) -> Hypothesis {
        let mut hypothesis = Hypothesis::new();
        for model in models.iter() {
            match self.score_model(distribution, model) {
                Some(score) => hypothesis.insert(model.name.clone(), score),
                None => debug!("Model '{}' has no color sets, not scored", model.name),
            }
        }
        hypothesis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::ColorName;

    fn set(entries: &[(ColorName, f64)]) -> ColorSet {
        entries.iter().copied().collect()
    }

    fn red_blue() -> ColorDistribution {
        ColorDistribution::from_fractions([(ColorName::Red, 0.6), (ColorName::Blue, 0.4)])
    }

    #[test]
    fn test_model_score_is_worst_variant() {
        let model = ObjectModel::new("M")
            .with_variant(set(&[(ColorName::Red, 1.0)]))
            .with_variant(set(&[(ColorName::Blue, 1.0)]));
        let store = ModelStore::builder().with_model(model).build();

        let hypothesis = HypothesisScorer::new().score(&red_blue(), &store);
        assert!((hypothesis.score("M").unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_variant_score_is_weighted_sum() {
        let variant = set(&[(ColorName::Red, 0.5), (ColorName::Blue, 2.0), (ColorName::Grey, 3.0)]);
        let score = HypothesisScorer::new().score_variant(&red_blue(), &variant);
        assert!((score - (0.5 * 0.6 + 2.0 * 0.4)).abs() < 1e-12);
    }

    #[test]
    fn test_models_without_variants_are_not_scored() {
        let store = ModelStore::builder()
            .with_model(ObjectModel::new("hollow"))
            .with_model(ObjectModel::new("mug").with_variant(set(&[(ColorName::Red, 1.0)])))
            .build();

        let hypothesis = HypothesisScorer::new().score(&red_blue(), &store);
        assert!(!hypothesis.contains("hollow"));
        assert_eq!(hypothesis.len(), 1);
        assert!((hypothesis.score("mug").unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_unobserved_colors_contribute_nothing() {
        let model = ObjectModel::new("leaf").with_variant(set(&[(ColorName::Green, 1.0)]));
        let store = ModelStore::builder().with_model(model).build();
        let hypothesis = HypothesisScorer::new().score(&red_blue(), &store);
        assert_eq!(hypothesis.score("leaf"), Some(0.0));
    }

    #[test]
    fn test_empty_store_gives_empty_hypothesis() {
        let hypothesis = HypothesisScorer::new().score(&red_blue(), &ModelStore::default());
        assert!(hypothesis.is_empty());
    }
}
