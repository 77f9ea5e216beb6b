//! # Label Parser
//!
//! This module turns raw OCR text from a photographed nutrition label into a
//! structured [`NutritionRecord`] with a coarse confidence tier.
//!
//! ## Features
//!
//! - Case-insensitive, line-layout-agnostic field extraction via fixed regex
//!   patterns (calories, protein, carbohydrates, sugars, serving size/unit)
//! - First occurrence wins; fields without a match stay unset
//! - Numeric parsing never fails the extraction: a capture that cannot be
//!   read as a number is kept as its raw text
//! - Confidence tier derived from how many numeric fields were located
//!
//! ## Usage
//!
//! ```rust
//! use nutrition_wallet::label_parser::{parse_nutrition_label, ConfidenceTier};
//!
//! let text = "Serving Size 30g\nCalories 120\nProtein 3g";
//! let record = parse_nutrition_label(text);
//!
//! assert_eq!(record.fields_found(), 3);
//! assert_eq!(record.confidence(), ConfidenceTier::Medium);
//! ```

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single extracted field value.
///
/// Captures are parsed as floating-point numbers; if that parse fails the raw
/// matched text is retained instead, so extraction never errors out on one
/// field. Serializes untagged: numbers as JSON numbers, fallbacks as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Parsed numeric amount
    Number(f64),
    /// Raw matched text kept when numeric parsing fails
    Text(String),
}

impl FieldValue {
    /// The numeric amount, if this value parsed as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

/// Structured nutrition facts extracted from label text.
///
/// Every field is either unset (no pattern matched) or holds a value taken
/// from the input text; nothing is defaulted to zero or fabricated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionRecord {
    /// Product name; no current pattern populates this, it serializes as null
    pub food_name: Option<String>,
    /// Amount in the "serving size" line (e.g. 30 from "Serving Size 30g")
    pub serving_size: Option<FieldValue>,
    /// Unit token contiguous with the serving size amount (e.g. "g")
    pub serving_unit: Option<String>,
    pub calories: Option<FieldValue>,
    /// Grams of protein
    pub protein: Option<FieldValue>,
    /// Grams of total carbohydrate
    pub carbs: Option<FieldValue>,
    /// Grams of sugars
    pub sugars: Option<FieldValue>,
}

impl NutritionRecord {
    /// Count of numeric fields that were located in the text.
    ///
    /// Only `calories`, `protein`, `carbs`, `sugars` and `serving_size`
    /// participate; `food_name` and `serving_unit` are excluded.
    pub fn fields_found(&self) -> usize {
        [
            &self.calories,
            &self.protein,
            &self.carbs,
            &self.sugars,
            &self.serving_size,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }

    /// Confidence tier for this record, derived from [`fields_found`](Self::fields_found)
    pub fn confidence(&self) -> ConfidenceTier {
        ConfidenceTier::from_fields_found(self.fields_found())
    }
}

/// Coarse quality signal for an extraction: how much of the expected label
/// content was actually located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Map a numeric-field count to a tier: >=4 high, >=2 medium, else low
    pub fn from_fields_found(count: usize) -> Self {
        if count >= 4 {
            ConfidenceTier::High
        } else if count >= 2 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Target fields the extraction rules can populate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Calories,
    Protein,
    Carbs,
    Sugars,
    ServingSize,
    ServingUnit,
}

/// How a captured group is coerced into a record value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    /// Parse as f64, keep the raw text if that fails
    Numeric,
    /// Keep the trimmed capture as-is
    Text,
}

/// One extraction rule: a field, its pattern, and how to read the capture
struct FieldRule {
    field: Field,
    pattern: Regex,
    coercion: Coercion,
}

lazy_static! {
    /// Ordered extraction rules, compiled once. Each rule is applied to the
    /// whole lowercased text and only its first match is used.
    static ref FIELD_RULES: Vec<FieldRule> = vec![
        FieldRule {
            field: Field::Calories,
            pattern: Regex::new(r"calories[:\s]+(\d+)").expect("calories pattern should be valid"),
            coercion: Coercion::Numeric,
        },
        FieldRule {
            field: Field::Protein,
            pattern: Regex::new(r"protein[:\s]+(\d+\.?\d*)g?")
                .expect("protein pattern should be valid"),
            coercion: Coercion::Numeric,
        },
        FieldRule {
            field: Field::Carbs,
            pattern: Regex::new(r"total carbohydrates?[:\s]+(\d+\.?\d*)g?")
                .expect("carbohydrate pattern should be valid"),
            coercion: Coercion::Numeric,
        },
        FieldRule {
            field: Field::Sugars,
            pattern: Regex::new(r"(?:total )?sugars[:\s]+(\d+\.?\d*)g?")
                .expect("sugars pattern should be valid"),
            coercion: Coercion::Numeric,
        },
        FieldRule {
            field: Field::ServingSize,
            pattern: Regex::new(r"serving size[:\s]+(\d+\.?\d*)")
                .expect("serving size pattern should be valid"),
            coercion: Coercion::Numeric,
        },
        // The unit must sit directly against the number ("30g", not "2 servings");
        // a space between them means no unit is recorded.
        FieldRule {
            field: Field::ServingUnit,
            pattern: Regex::new(r"serving size[:\s]+\d+\.?\d*([a-z]+)")
                .expect("serving unit pattern should be valid"),
            coercion: Coercion::Text,
        },
    ];
}

/// Parse OCR label text into a [`NutritionRecord`].
///
/// The input is the OCR engine's recognized lines joined with line breaks in
/// reading order; matching is content-based, so layout and spacing do not
/// matter. Pure and deterministic: the same text always yields the same
/// record.
pub fn parse_nutrition_label(text: &str) -> NutritionRecord {
    let normalized = text.to_lowercase();
    let mut record = NutritionRecord::default();

    for rule in FIELD_RULES.iter() {
        let capture = rule
            .pattern
            .captures(&normalized)
            .and_then(|captures| captures.get(1));
        let raw = match capture {
            Some(group) => group.as_str().trim(),
            None => continue,
        };

        debug!("Matched {:?}: '{}'", rule.field, raw);

        let value = match rule.coercion {
            Coercion::Numeric => coerce_numeric(raw),
            Coercion::Text => FieldValue::Text(raw.to_string()),
        };

        match rule.field {
            Field::Calories => record.calories = Some(value),
            Field::Protein => record.protein = Some(value),
            Field::Carbs => record.carbs = Some(value),
            Field::Sugars => record.sugars = Some(value),
            Field::ServingSize => record.serving_size = Some(value),
            Field::ServingUnit => record.serving_unit = Some(raw.to_string()),
        }
    }

    record
}

/// Parse a capture as f64, falling back to the raw text on failure.
///
/// The patterns themselves require digits, so the fallback should not trigger
/// in practice; it exists so extraction can never fail on one field.
fn coerce_numeric(raw: &str) -> FieldValue {
    match raw.parse::<f64>() {
        Ok(value) => FieldValue::Number(value),
        Err(_) => FieldValue::Text(raw.to_string()),
    }
}
