//! Filtering of stored products by optional predicates.
//!
//! Every supplied predicate narrows the result (logical AND); absent or empty
//! predicates impose nothing. Matching is exact, except `nova`, which compares
//! integer values parsed the way `parseInt` does.

use serde::{Deserialize, Serialize};

use crate::extract::Product;

/// Optional predicates over [`Product`] attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Exact Nutri-Score grade.
    pub nutrition: Option<String>,
    /// NOVA group, compared as an integer.
    pub nova: Option<String>,
    /// Exact palm oil status.
    pub has_palm_oil: Option<String>,
    /// Exact vegetarian status.
    pub is_vegetarian: Option<String>,
    /// Exact vegan status.
    pub is_vegan: Option<String>,
}

impl ProductQuery {
    /// Creates a query with no predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a Nutri-Score grade.
    #[must_use]
    pub fn with_nutrition(mut self, grade: impl Into<String>) -> Self {
        self.nutrition = Some(grade.into());
        self
    }

    /// Requires a NOVA group.
    #[must_use]
    pub fn with_nova(mut self, group: impl Into<String>) -> Self {
        self.nova = Some(group.into());
        self
    }

    /// Requires a palm oil status.
    #[must_use]
    pub fn with_has_palm_oil(mut self, status: impl Into<String>) -> Self {
        self.has_palm_oil = Some(status.into());
        self
    }

    /// Requires a vegetarian status.
    #[must_use]
    pub fn with_is_vegetarian(mut self, status: impl Into<String>) -> Self {
        self.is_vegetarian = Some(status.into());
        self
    }

    /// Requires a vegan status.
    #[must_use]
    pub fn with_is_vegan(mut self, status: impl Into<String>) -> Self {
        self.is_vegan = Some(status.into());
        self
    }

    /// Whether the query constrains nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.nutrition,
            &self.nova,
            &self.has_palm_oil,
            &self.is_vegetarian,
            &self.is_vegan,
        ]
        .into_iter()
        .all(|field| supplied(field).is_none())
    }

    /// Whether `product` satisfies every supplied predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let exact = |predicate: &Option<String>, actual: &str| {
            supplied(predicate).map_or(true, |expected| expected == actual)
        };

        exact(&self.nutrition, &product.nutrition.score)
            && supplied(&self.nova).map_or(true, |expected| {
                matches!((parse_int(expected), product.nova_group()), (Some(a), Some(b)) if a == b)
            })
            && exact(&self.has_palm_oil, &product.has_palm_oil)
            && exact(&self.is_vegetarian, &product.is_vegetarian)
            && exact(&self.is_vegan, &product.is_vegan)
    }
}

fn supplied(predicate: &Option<String>) -> Option<&str> {
    predicate.as_deref().filter(|value| !value.is_empty())
}

/// Returns the products matching `query`, in their original order.
#[must_use]
pub fn filter_products(products: &[Product], query: &ProductQuery) -> Vec<Product> {
    products
        .iter()
        .filter(|product| query.matches(product))
        .cloned()
        .collect()
}

/// Parses a leading integer: optional whitespace, optional sign, then digits.
///
/// Trailing characters are ignored; `None` when no digit follows.
#[must_use]
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
