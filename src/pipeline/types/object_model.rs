use indexmap::IndexMap;

use super::ColorName;

/// One learned appearance ("variant") of an object: expected weight per color.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorSet {
    weights: IndexMap<ColorName, f64>,
}

impl ColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `color` unless the set already holds it. Returns whether it was added.
    pub fn insert(&mut self, color: ColorName, weight: f64) -> bool {
        if self.weights.contains_key(&color) {
            return false;
        }
        self.weights.insert(color, weight);
        true
    }

    pub fn weight(&self, color: ColorName) -> Option<f64> {
        self.weights.get(&color).copied()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ColorName, f64)> + '_ {
        self.weights.iter().map(|(&color, &weight)| (color, weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(ColorName, f64)> for ColorSet {
    fn from_iter<T: IntoIterator<Item = (ColorName, f64)>>(iter: T) -> Self {
        let mut set = ColorSet::new();
        for (color, weight) in iter {
            set.insert(color, weight);
        }
        set
    }
}

/// A named object together with all of its learned color sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectModel {
    pub name: String,
    pub variants: Vec<ColorSet>,
}

impl ObjectModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: ColorSet) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn add_variant(&mut self, variant: ColorSet) {
        self.variants.push(variant);
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}
