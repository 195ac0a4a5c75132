//! Class label enumeration shared by every classifier backend.
//!
//! The order of [`PLANT_VILLAGE_CLASSES`] is a contract with any real model:
//! position `i` is output index `i`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Separator between the plant and the condition inside a label.
pub const LABEL_SEPARATOR: &str = "___";

/// PlantVillage dataset classes, in model output order.
pub const PLANT_VILLAGE_CLASSES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot_Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites_Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// A `<Plant>___<Condition>` class key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLabel(String);

impl ClassLabel {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable plant name, e.g. `Pepper, bell`.
    pub fn plant(&self) -> String {
        let raw = self.0.split(LABEL_SEPARATOR).next().unwrap_or_default();
        raw.replace('_', " ")
    }

    /// Human readable condition; `Healthy` when the key carries none.
    pub fn condition(&self) -> String {
        let parts: Vec<&str> = self.0.split(LABEL_SEPARATOR).skip(1).collect();
        let condition = parts.join(" ").replace('_', " ");
        if condition.is_empty() {
            "Healthy".to_string()
        } else {
            condition
        }
    }

    /// `Plant - Condition`, as listed among low-confidence alternatives.
    pub fn display(&self) -> String {
        format!("{} - {}", self.plant(), self.condition())
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate free list of labels matching a model's outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<ClassLabel>,
}

impl LabelSet {
    /// The built-in 38-class enumeration.
    pub fn plant_village() -> Self {
        Self {
            labels: PLANT_VILLAGE_CLASSES.iter().map(|&l| ClassLabel::new(l)).collect(),
        }
    }

    pub fn new(labels: Vec<ClassLabel>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::Labels("no labels given".into()));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(Error::Labels(format!("duplicate label {label}")));
            }
        }
        Ok(Self { labels })
    }

    /// Parse a `labels.txt` file: one label per line, blanks ignored.
    pub fn from_lines(text: &str) -> Result<Self> {
        let labels = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ClassLabel::new)
            .collect();
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ClassLabel> {
        self.labels.get(index)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.as_str() == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassLabel> {
        self.labels.iter()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::plant_village()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_builtin_label_has_a_plant_name() {
        let labels = LabelSet::plant_village();
        assert_eq!(labels.len(), 38);
        for label in labels.iter() {
            assert!(label.as_str().contains(LABEL_SEPARATOR), "{label}");
            assert!(!label.plant().is_empty(), "{label}");
        }
    }

    #[rstest]
    #[case("Apple___Apple_scab", "Apple", "Apple scab")]
    #[case("Pepper,_bell___healthy", "Pepper, bell", "healthy")]
    #[case("Corn_(maize)___Common_rust_", "Corn (maize)", "Common rust ")]
    #[case("Tomato___Spider_mites_Two-spotted_spider_mite", "Tomato", "Spider mites Two-spotted spider mite")]
    #[case("Blueberry", "Blueberry", "Healthy")]
    #[case("Blueberry___", "Blueberry", "Healthy")]
    fn splits_plant_and_condition(#[case] key: &str, #[case] plant: &str, #[case] condition: &str) {
        let label = ClassLabel::new(key);
        assert_eq!(label.plant(), plant);
        assert_eq!(label.condition(), condition);
    }

    #[test]
    fn display_joins_plant_and_condition() {
        let label = ClassLabel::new("Grape___Esca_(Black_Measles)");
        assert_eq!(label.display(), "Grape - Esca (Black Measles)");
    }

    #[test]
    fn builtin_order_is_stable() {
        let labels = LabelSet::plant_village();
        assert_eq!(labels.get(0).map(ClassLabel::as_str), Some("Apple___Apple_scab"));
        assert_eq!(labels.get(37).map(ClassLabel::as_str), Some("Tomato___healthy"));
        assert_eq!(labels.position("Potato___Late_blight"), Some(21));
        assert!(labels.get(38).is_none());
    }

    #[test]
    fn from_lines_skips_blanks_and_trims() -> Result<()> {
        let labels = LabelSet::from_lines("  a___x \n\nb___y\n")?;
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.position("b___y"), Some(1));
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("\n  \n")]
    #[case("a___x\na___x\n")]
    fn from_lines_rejects_invalid_lists(#[case] text: &str) {
        assert!(matches!(LabelSet::from_lines(text), Err(Error::Labels(_))));
    }
}
