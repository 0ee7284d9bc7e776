//! Small query layer over a parsed HTML tree.
//!
//! Extractors only talk to [`Document`] and [`Node`]: find elements by CSS
//! selector, read attributes and text, and walk up to a parent or the nearest
//! ancestor with a given tag. An invalid selector is logged and matches
//! nothing, so callers never have to handle selector errors.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// All elements matching `css`, in document order.
    pub fn find_all(&self, css: &str) -> Vec<Node<'_>> {
        match compile(css) {
            Some(selector) => self.html.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn tag(&self) -> &'a str {
        self.0.value().name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Concatenated text of this element and its descendants, as written.
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    /// Text with every whitespace run collapsed to a single space.
    pub fn normalized_text(&self) -> String {
        self.text().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Descendants matching `css`, in document order.
    pub fn find_all(&self, css: &str) -> Vec<Node<'a>> {
        match compile(css) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_first(&self, css: &str) -> Option<Node<'a>> {
        let selector = compile(css)?;
        self.0.select(&selector).next().map(Node)
    }

    /// Enclosing element, if the parent is an element at all.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Node)
    }

    /// Text of the siblings written before this element, back to the closest
    /// preceding sibling with the same tag. Whitespace is collapsed.
    pub fn preceding_text(&self) -> String {
        let mut pieces: Vec<String> = Vec::new();
        for sibling in self.0.prev_siblings() {
            if let Some(text) = sibling.value().as_text() {
                pieces.push(String::from(&**text));
            } else if let Some(element) = ElementRef::wrap(sibling) {
                if element.value().name() == self.tag() {
                    break;
                }
                pieces.push(element.text().collect());
            }
        }
        pieces.reverse();
        pieces.concat().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Nearest enclosing element whose tag name equals `tag`.
    pub fn ancestor(&self, tag: &str) -> Option<Node<'a>> {
        self.0
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name().eq_ignore_ascii_case(tag))
            .map(Node)
    }
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Ignoring invalid selector '{}': {}", css, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <table><tr>
            <td id="cell"><p><a href="one.txt" class="x">first   link</a></p></td>
            <td><a href="two.txt">second</a></td>
        </tr></table>
    </body></html>"#;

    #[test]
    fn test_find_all_in_document_order() {
        let doc = Document::parse(PAGE);
        let hrefs: Vec<_> = doc
            .find_all("a[href]")
            .iter()
            .filter_map(|a| a.attr("href"))
            .collect();
        assert_eq!(hrefs, vec!["one.txt", "two.txt"]);
    }

    #[test]
    fn test_parent_and_ancestor() {
        let doc = Document::parse(PAGE);
        let first = doc.find_all("a.x")[0];

        assert_eq!(first.parent().map(|p| p.tag()), Some("p"));
        let cell = first.ancestor("td").expect("anchor sits in a table cell");
        assert_eq!(cell.attr("id"), Some("cell"));
        assert!(first.ancestor("form").is_none());
    }

    #[test]
    fn test_text_normalization() {
        let doc = Document::parse(PAGE);
        let first = doc.find_all("a.x")[0];
        assert_eq!(first.text(), "first   link");
        assert_eq!(first.normalized_text(), "first link");
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let doc = Document::parse(PAGE);
        assert!(doc.find_all("a[[").is_empty());
        let cell = doc.find_all("td")[0];
        assert!(cell.find_first("::::").is_none());
    }

    #[test]
    fn test_descendant_lookup() {
        let doc = Document::parse(PAGE);
        let cell = doc.find_all("td")[1];
        let anchor = cell.find_first("a").expect("cell has an anchor");
        assert_eq!(anchor.attr("href"), Some("two.txt"));
        assert!(anchor.has_attr("href"));
        assert!(!anchor.has_attr("onclick"));
    }

    #[test]
    fn test_preceding_text_stops_at_previous_sibling_of_same_tag() {
        let doc = Document::parse(
            "<p>first <a href=\"1\">1</a><br>second <i>label</i>: <a href=\"2\">2</a></p>",
        );
        let anchors = doc.find_all("a");
        assert_eq!(anchors[0].preceding_text(), "first");
        assert_eq!(anchors[1].preceding_text(), "second label:");
    }
}
