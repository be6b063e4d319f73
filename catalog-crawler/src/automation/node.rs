//! Element handles over a parsed HTML document.
//!
//! A [`NodeHandle`] is a snapshot of one element: its tag, text content and
//! attributes are captured when the handle is created, and the element's
//! position in the document is kept so scoped queries and child access can
//! find it again. The document text is shared, so handles are cheap to clone
//! and can be held across suspension points.

use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

use crate::errors::AutomationError;

/// A handle to an element on a loaded page.
#[derive(Debug, Clone)]
pub struct NodeHandle {
    document: Arc<str>,
    path: Vec<usize>,
    tag_name: String,
    text: String,
    attributes: Vec<(String, String)>,
}

impl NodeHandle {
    fn from_element(document: &Arc<str>, element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            document: Arc::clone(document),
            path: node_path(element),
            tag_name: value.name().to_string(),
            text: element.text().collect(),
            attributes: value
                .attrs()
                .map(|(name, val)| (name.to_string(), val.to_string()))
                .collect(),
        }
    }

    /// The element's lowercase tag name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Concatenated text of all descendant text nodes, untrimmed.
    #[must_use]
    pub fn text_content(&self) -> &str {
        &self.text
    }

    /// Returns an attribute value, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The element's child elements, in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        let html = Html::parse_document(&self.document);
        resolve(&html, &self.path)
            .map(|element| {
                element
                    .children()
                    .filter_map(ElementRef::wrap)
                    .map(|child| Self::from_element(&self.document, child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Descendants of this element matching `selector`, in document order.
    pub(crate) fn select(&self, selector: &str, first_only: bool) -> Result<Vec<Self>, AutomationError> {
        let selector = parse_selector(selector)?;
        let html = Html::parse_document(&self.document);
        let Some(element) = resolve(&html, &self.path) else {
            return Ok(Vec::new());
        };
        let matches = element
            .select(&selector)
            .map(|found| Self::from_element(&self.document, found));
        Ok(if first_only {
            matches.take(1).collect()
        } else {
            matches.collect()
        })
    }
}

/// Parses a CSS selector.
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, AutomationError> {
    Selector::parse(selector)
        .map_err(|e| AutomationError::invalid_selector(selector, e.to_string()))
}

/// Elements of `document` matching `selector`, in document order.
pub(crate) fn select_in_document(
    document: &Arc<str>,
    selector: &str,
    first_only: bool,
) -> Result<Vec<NodeHandle>, AutomationError> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    let matches = html
        .select(&selector)
        .map(|found| NodeHandle::from_element(document, found));
    Ok(if first_only {
        matches.take(1).collect()
    } else {
        matches.collect()
    })
}

/// Whether any element of `document` matches `selector`.
pub(crate) fn document_matches(document: &str, selector: &str) -> Result<bool, AutomationError> {
    let selector = parse_selector(selector)?;
    Ok(Html::parse_document(document).select(&selector).next().is_some())
}

/// Child positions from the tree root down to `element`.
fn node_path(element: ElementRef<'_>) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = *element;
    while let Some(parent) = node.parent() {
        path.push(node.prev_siblings().count());
        node = parent;
    }
    path.reverse();
    path
}

fn resolve<'a>(html: &'a Html, path: &[usize]) -> Option<ElementRef<'a>> {
    let mut node = html.tree.root();
    for &index in path {
        node = node.children().nth(index)?;
    }
    ElementRef::wrap(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(html: &str) -> Arc<str> {
        Arc::from(html)
    }

    #[test]
    fn test_select_captures_text_and_attributes() {
        let document = doc(r#"<html><body><a class="p" href="/p/1" rel="next"> One </a></body></html>"#);
        let nodes = select_in_document(&document, "a.p", false).unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].tag_name(), "a");
        assert_eq!(nodes[0].text_content(), " One ");
        assert_eq!(nodes[0].attribute("href"), Some("/p/1"));
        assert_eq!(nodes[0].attribute("REL"), Some("next"));
        assert_eq!(nodes[0].attribute("title"), None);
    }

    #[test]
    fn test_first_only_limits_matches() {
        let document = doc("<ul><li>a</li><li>b</li><li>c</li></ul>");
        assert_eq!(select_in_document(&document, "li", false).unwrap().len(), 3);

        let first = select_in_document(&document, "li", true).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].text_content(), "a");
    }

    #[test]
    fn test_children_of_table_row() {
        let document = doc(
            "<table><tbody><tr><td>Energy</td><td>100 kJ</td></tr>\
             <tr><td>Fat</td><td>1 g</td><td>2 g</td></tr></tbody></table>",
        );
        let rows = select_in_document(&document, "tbody > tr", false).unwrap();
        assert_eq!(rows.len(), 2);

        let cells: Vec<String> = rows[1]
            .children()
            .iter()
            .map(|c| c.text_content().to_string())
            .collect();
        assert_eq!(cells, vec!["Fat", "1 g", "2 g"]);
        assert_eq!(rows[0].children().len(), 2);
    }

    #[test]
    fn test_scoped_select_excludes_other_subtrees() {
        let document = doc(
            "<div id='a'><ul><li><a><h4>Fat</h4></a></li></ul></div>\
             <div id='b'><ul><li><a><h4>Salt</h4></a></li></ul></div>",
        );
        let lists = select_in_document(&document, "div > ul", false).unwrap();
        assert_eq!(lists.len(), 2);

        let titles = lists[1].select("li > a > h4", false).unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].text_content(), "Salt");
    }

    #[test]
    fn test_invalid_selector() {
        let document = doc("<p></p>");
        let err = select_in_document(&document, "p[", false).unwrap_err();
        assert!(matches!(err, AutomationError::InvalidSelector { .. }));
    }

    #[test]
    fn test_document_matches() {
        let selector = ".tabs.content.active";
        assert!(document_matches("<div class='tabs content active'></div>", selector).unwrap());
        assert!(!document_matches("<div class='tabs content'></div>", selector).unwrap());
        assert!(document_matches("<div></div>", "div[").is_err());
    }
}
