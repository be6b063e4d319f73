//! The product record and its parts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::query::parse_int;

/// Quantity value used when the page shows no quantity.
pub const QUANTITY_UNAVAILABLE: &str = "N/A";

/// Status value used when an ingredient analysis panel is absent.
pub const STATUS_UNKNOWN: &str = "unknown";

/// A graded attribute: the short score plus its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Short score ("B", "4").
    pub score: String,
    /// Human-readable description.
    pub title: String,
}

impl Score {
    /// Creates a score.
    #[must_use]
    pub fn new(score: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            score: score.into(),
            title: title.into(),
        }
    }
}

/// Qualitative level of one nutrient, derived from its icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutrientLevel {
    /// High amount.
    High,
    /// Moderate amount.
    Moderate,
    /// Low amount.
    Low,
    /// Icon missing or not recognised.
    Unknown,
}

impl NutrientLevel {
    /// Classifies an icon source by its filename.
    #[must_use]
    pub fn from_icon(src: &str) -> Self {
        if src.contains("high.svg") {
            Self::High
        } else if src.contains("moderate.svg") {
            Self::Moderate
        } else if src.contains("low.svg") {
            Self::Low
        } else {
            Self::Unknown
        }
    }

    /// Returns the level tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NutrientLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the nutrition facts table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFact {
    /// Value per 100 g.
    #[serde(rename = "per100g")]
    pub per_100g: String,
    /// Value per serving.
    #[serde(rename = "perServing")]
    pub per_serving: String,
}

/// A product extracted from one detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Display name.
    pub product_name: String,
    /// Barcode.
    pub product_id: String,
    /// Nutri-Score grade.
    pub nutrition: Score,
    /// NOVA processing group.
    pub nova: Score,
    /// Quantity label or [`QUANTITY_UNAVAILABLE`].
    pub quantity: String,
    /// Palm oil status or [`STATUS_UNKNOWN`].
    pub has_palm_oil: String,
    /// Vegetarian status or [`STATUS_UNKNOWN`].
    pub is_vegetarian: String,
    /// Vegan status or [`STATUS_UNKNOWN`].
    pub is_vegan: String,
    /// Nutrition facts keyed by row label.
    pub nutrition_facts: BTreeMap<String, NutritionFact>,
    /// Nutrient levels in panel order.
    pub value: Vec<(NutrientLevel, String)>,
}

impl Product {
    /// The NOVA group as an integer, if the score holds one.
    #[must_use]
    pub fn nova_group(&self) -> Option<i64> {
        parse_int(&self.nova.score)
    }
}
