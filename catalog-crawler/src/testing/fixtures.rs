//! Page and record fixtures.
//!
//! The page builders emit markup shaped like the catalog the default
//! selectors target, so crawls over fixture pages exercise the real
//! selectors.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::extract::{Product, Score, QUANTITY_UNAVAILABLE, STATUS_UNKNOWN};

/// A product record with the given id, Nutri-Score grade and NOVA group.
///
/// Optional attributes carry their sentinel values.
#[must_use]
pub fn product_fixture(id: &str, nutrition: &str, nova: &str) -> Product {
    Product {
        product_name: format!("Produto {id}"),
        product_id: id.to_string(),
        nutrition: Score::new(nutrition, format!("Nutri-Score {nutrition}")),
        nova: Score::new(nova, format!("NOVA {nova}")),
        quantity: QUANTITY_UNAVAILABLE.to_string(),
        has_palm_oil: STATUS_UNKNOWN.to_string(),
        is_vegetarian: STATUS_UNKNOWN.to_string(),
        is_vegan: STATUS_UNKNOWN.to_string(),
        nutrition_facts: BTreeMap::new(),
        value: Vec::new(),
    }
}

/// Builder for a listing page.
#[derive(Debug, Clone)]
pub struct ListingPage {
    products: Vec<String>,
    next: Option<String>,
    content_ready: bool,
}

impl Default for ListingPage {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            next: None,
            content_ready: true,
        }
    }
}

impl ListingPage {
    /// Creates an empty listing page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product link.
    #[must_use]
    pub fn with_product(mut self, href: impl Into<String>) -> Self {
        self.products.push(href.into());
        self
    }

    /// Adds a "next page" control.
    #[must_use]
    pub fn with_next(mut self, href: impl Into<String>) -> Self {
        self.next = Some(href.into());
        self
    }

    /// Omits the content-ready marker.
    #[must_use]
    pub fn without_content_ready(mut self) -> Self {
        self.content_ready = false;
        self
    }

    /// Renders the page.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from("<html><body>");
        if self.content_ready {
            html.push_str(r#"<div class="tabs content active">"#);
        } else {
            html.push_str(r#"<div class="tabs content">"#);
        }
        html.push_str(r#"<ul class="search_results">"#);
        for href in &self.products {
            let _ = write!(
                html,
                r#"<li><a class="list_product_a" href="{}">produto</a></li>"#,
                escape(href)
            );
        }
        html.push_str("</ul></div>");

        html.push_str(r#"<ul id="pages" class="pagination">"#);
        html.push_str(r#"<li><a href="/1">1</a></li>"#);
        if let Some(next) = &self.next {
            let _ = write!(
                html,
                r#"<li><a href="{}" rel="next nofollow">Próxima</a></li>"#,
                escape(next)
            );
        }
        html.push_str("</ul></body></html>");
        html
    }
}

/// Builder for a product detail page.
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    name: String,
    id: String,
    nutrition: Option<(String, String)>,
    nova: Option<(String, String)>,
    quantity: Option<String>,
    palm_oil: Option<String>,
    vegetarian: Option<String>,
    vegan: Option<String>,
    levels: Vec<(String, String)>,
    fact_rows: Vec<Vec<String>>,
}

impl DetailPage {
    /// Creates a page with a name and barcode.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the Nutri-Score heading and title.
    #[must_use]
    pub fn with_nutrition(mut self, heading: impl Into<String>, title: impl Into<String>) -> Self {
        self.nutrition = Some((heading.into(), title.into()));
        self
    }

    /// Sets the NOVA heading and title.
    #[must_use]
    pub fn with_nova(mut self, heading: impl Into<String>, title: impl Into<String>) -> Self {
        self.nova = Some((heading.into(), title.into()));
        self
    }

    /// Sets the quantity.
    #[must_use]
    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    /// Sets the palm oil status.
    #[must_use]
    pub fn with_palm_oil(mut self, status: impl Into<String>) -> Self {
        self.palm_oil = Some(status.into());
        self
    }

    /// Sets the vegetarian status.
    #[must_use]
    pub fn with_vegetarian(mut self, status: impl Into<String>) -> Self {
        self.vegetarian = Some(status.into());
        self
    }

    /// Sets the vegan status.
    #[must_use]
    pub fn with_vegan(mut self, status: impl Into<String>) -> Self {
        self.vegan = Some(status.into());
        self
    }

    /// Adds a nutrient level entry.
    #[must_use]
    pub fn with_level(mut self, icon_src: impl Into<String>, title: impl Into<String>) -> Self {
        self.levels.push((icon_src.into(), title.into()));
        self
    }

    /// Adds a nutrition facts row.
    #[must_use]
    pub fn with_fact_row(mut self, cells: &[&str]) -> Self {
        self.fact_rows
            .push(cells.iter().map(|cell| (*cell).to_string()).collect());
        self
    }

    /// Renders the page.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::from("<html><body>");
        let _ = write!(
            html,
            r#"<h2 class="title-1" property="food:name" itemprop="name">{}</h2>"#,
            escape(&self.name)
        );
        let _ = write!(
            html,
            r#"<p><span id="barcode" property="food:code" itemprop="gtin13">{}</span></p>"#,
            escape(&self.id)
        );
        if let Some(quantity) = &self.quantity {
            let _ = write!(
                html,
                r#"<p><span id="field_quantity_value">{}</span></p>"#,
                escape(quantity)
            );
        }

        html.push_str(r#"<ul id="attributes_grid">"#);
        match (&self.nutrition, &self.nova) {
            (Some((heading, title)), _) => attribute(&mut html, heading, title),
            (None, Some(_)) => html.push_str("<li></li>"),
            (None, None) => {}
        }
        if let Some((heading, title)) = &self.nova {
            attribute(&mut html, heading, title);
        }
        html.push_str("</ul>");

        for (panel, status) in [
            ("palm-oil-content", &self.palm_oil),
            ("vegetarian-status", &self.vegetarian),
            ("vegan-status", &self.vegan),
        ] {
            if let Some(status) = status {
                let _ = write!(
                    html,
                    r#"<ul id="panel_ingredients_analysis_en-{panel}-unknown"><li><a href="/"><h4>{}</h4></a></li></ul>"#,
                    escape(status)
                );
            }
        }

        html.push_str(r#"<div id="panel_nutrient_levels_content">"#);
        for (icon, title) in &self.levels {
            let _ = write!(
                html,
                r#"<div><ul><li><a href="/"><img src="{}"><h4>{}</h4></a></li></ul></div>"#,
                escape(icon),
                escape(title)
            );
        }
        html.push_str("</div>");

        html.push_str(r#"<div id="panel_nutrition_facts_table_content"><div><table><tbody>"#);
        for row in &self.fact_rows {
            html.push_str("<tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", escape(cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div></div>");

        html.push_str("</body></html>");
        html
    }
}

fn attribute(html: &mut String, heading: &str, title: &str) {
    let _ = write!(
        html,
        r#"<li><a href="/"><div><div><div class="attr_text"><h4>{}</h4><span>{}</span></div></div></div></a></li>"#,
        escape(heading),
        escape(title)
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
