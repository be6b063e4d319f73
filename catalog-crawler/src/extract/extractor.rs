//! Product extraction from a loaded detail page.
//!
//! Extraction is all-or-nothing: a missing required element fails the whole
//! record, while missing optional elements fall back to sentinel values.

use std::collections::BTreeMap;
use tracing::trace;

use super::product::{
    NutrientLevel, NutritionFact, Product, Score, QUANTITY_UNAVAILABLE, STATUS_UNKNOWN,
};
use crate::automation::{NodeHandle, PageAutomation, PageAutomationExt};
use crate::config::ProductSelectors;
use crate::errors::ExtractionError;

/// Builds [`Product`] records from detail pages.
#[derive(Debug, Clone, Default)]
pub struct ProductExtractor {
    selectors: ProductSelectors,
}

impl ProductExtractor {
    /// Creates an extractor using the given selectors.
    #[must_use]
    pub const fn new(selectors: ProductSelectors) -> Self {
        Self { selectors }
    }

    /// Gets the selectors.
    #[must_use]
    pub const fn selectors(&self) -> &ProductSelectors {
        &self.selectors
    }

    /// Extracts one product from the page currently loaded in `page`.
    pub async fn extract<A>(&self, page: &A) -> Result<Product, ExtractionError>
    where
        A: PageAutomation + ?Sized,
    {
        let s = &self.selectors;

        let product_name = required(page, "productName", &s.product_name, trimmed_text).await?;
        let product_id = required(page, "productId", &s.product_id, trimmed_text).await?;
        let nutrition_score = required(page, "nutrition.score", &s.nutrition_score, |n| {
            nutrition_grade(n.text_content()).to_string()
        })
        .await?;
        let nutrition_title =
            required(page, "nutrition.title", &s.nutrition_title, trimmed_text).await?;
        let nova_score = required(page, "nova.score", &s.nova_score, |n| {
            nova_group(n.text_content()).to_string()
        })
        .await?;
        let nova_title = required(page, "nova.title", &s.nova_title, trimmed_text).await?;

        let quantity = optional(page, &s.quantity, QUANTITY_UNAVAILABLE).await?;
        let has_palm_oil = optional(page, &s.palm_oil, STATUS_UNKNOWN).await?;
        let is_vegetarian = optional(page, &s.vegetarian, STATUS_UNKNOWN).await?;
        let is_vegan = optional(page, &s.vegan, STATUS_UNKNOWN).await?;

        let value = self.nutrient_levels(page).await?;
        let nutrition_facts = self.nutrition_facts(page).await?;

        trace!(product_id, levels = value.len(), facts = nutrition_facts.len(), "Extracted product");

        Ok(Product {
            product_name,
            product_id,
            nutrition: Score::new(nutrition_score, nutrition_title),
            nova: Score::new(nova_score, nova_title),
            quantity,
            has_palm_oil,
            is_vegetarian,
            is_vegan,
            nutrition_facts,
            value,
        })
    }

    async fn nutrient_levels<A>(
        &self,
        page: &A,
    ) -> Result<Vec<(NutrientLevel, String)>, ExtractionError>
    where
        A: PageAutomation + ?Sized,
    {
        let s = &self.selectors;
        let entries = page.query_selector_all(&s.nutrient_levels).await?;

        let mut levels = Vec::with_capacity(entries.len());
        for entry in &entries {
            let level = match page.query_selector_in(entry, &s.nutrient_level_icon).await? {
                Some(icon) => {
                    page.evaluate(&icon, |n| {
                        n.attribute("src")
                            .map_or(NutrientLevel::Unknown, NutrientLevel::from_icon)
                    })
                    .await
                }
                None => NutrientLevel::Unknown,
            };
            let title = match page.query_selector_in(entry, &s.nutrient_level_title).await? {
                Some(heading) => page.evaluate(&heading, trimmed_text).await,
                None => String::new(),
            };
            levels.push((level, title));
        }
        Ok(levels)
    }

    async fn nutrition_facts<A>(
        &self,
        page: &A,
    ) -> Result<BTreeMap<String, NutritionFact>, ExtractionError>
    where
        A: PageAutomation + ?Sized,
    {
        let rows = page
            .eval_selector_all(&self.selectors.nutrition_fact_rows, |row| {
                let cells = row.children();
                let cell = |index: usize| cells.get(index).map(trimmed_text).unwrap_or_default();
                (cell(0), cell(1), cell(2))
            })
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(label, _, _)| !label.is_empty())
            .map(|(label, per_100g, per_serving)| {
                (
                    label,
                    NutritionFact {
                        per_100g,
                        per_serving,
                    },
                )
            })
            .collect())
    }
}

async fn required<A, F>(
    page: &A,
    field: &'static str,
    selector: &str,
    f: F,
) -> Result<String, ExtractionError>
where
    A: PageAutomation + ?Sized,
    F: FnOnce(&NodeHandle) -> String + Send,
{
    page.eval_selector(selector, f)
        .await?
        .ok_or_else(|| ExtractionError::missing(field, selector))
}

async fn optional<A>(page: &A, selector: &str, fallback: &str) -> Result<String, ExtractionError>
where
    A: PageAutomation + ?Sized,
{
    Ok(page
        .eval_selector(selector, trimmed_text)
        .await?
        .unwrap_or_else(|| fallback.to_string()))
}

fn trimmed_text(node: &NodeHandle) -> String {
    node.text_content().trim().to_string()
}

/// The Nutri-Score grade: the text after the final space.
#[must_use]
pub fn nutrition_grade(text: &str) -> &str {
    let text = text.trim();
    text.rfind(' ').map_or(text, |index| &text[index + 1..])
}

/// The NOVA group: the second space-separated token, or empty when absent.
#[must_use]
pub fn nova_group(text: &str) -> &str {
    text.trim().split(' ').nth(1).unwrap_or_default()
}
