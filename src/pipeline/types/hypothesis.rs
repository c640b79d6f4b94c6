use std::collections::BTreeMap;

/// Match score of every scored model against one observation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hypothesis {
    scores: BTreeMap<String, f64>,
}

impl Hypothesis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model_name: impl Into<String>, score: f64) {
        self.scores.insert(model_name.into(), score);
    }

    pub fn score(&self, model_name: &str) -> Option<f64> {
        self.scores.get(model_name).copied()
    }

    pub fn contains(&self, model_name: &str) -> bool {
        self.scores.contains_key(model_name)
    }

    /// Scores ordered by model name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.scores.iter().map(|(name, &score)| (name.as_str(), score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores ordered best first; equal scores fall back to model name.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn best(&self) -> Option<(&str, f64)> {
        self.ranked().into_iter().next()
    }
}
