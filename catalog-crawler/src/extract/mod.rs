//! Product records and their extraction from detail pages.

mod extractor;
mod product;

pub use extractor::{nova_group, nutrition_grade, ProductExtractor};
pub use product::{
    NutrientLevel, NutritionFact, Product, Score, QUANTITY_UNAVAILABLE, STATUS_UNKNOWN,
};
