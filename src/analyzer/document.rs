// src/analyzer/document.rs
// =============================================================================
// This module wraps a parsed HTML document and pulls metadata out of it.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// The analysis only needs four queries from the document:
// find-by-tag, find-by-attribute-selector, first match, and the doctype.
//
// Note: scraper's `Html` is not Send, so everything the async part of the
// analysis needs is copied out into owned values (see `Outline`) and the
// document is dropped before any .await.
// =============================================================================

use scraper::node::Doctype;
use scraper::{Html, Node, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::{AnalysisError, AnalysisOutcome};
use crate::progress::Reporter;

/// Reported when the document carries no doctype declaration.
///
/// This is a legacy default, not a detection of the actual version.
pub const FALLBACK_MARKUP_VERSION: &str = "HTML 4.01";

// Selectors are compile-time constants, so parsing them can't fail at runtime
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static PASSWORD_INPUTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[type=password]").unwrap());
static HEADINGS: LazyLock<Vec<(u8, Selector)>> = LazyLock::new(|| {
    (1..=6)
        .map(|level| (level, Selector::parse(&format!("h{level}")).unwrap()))
        .collect()
});

/// A parsed page, queryable with CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses page source. html5ever recovers from malformed markup, so the
    /// only input we reject is one with nothing in it.
    pub fn parse(source: &str) -> AnalysisOutcome<Self> {
        if source.trim().is_empty() {
            return Err(AnalysisError::ParseFailure("empty document".to_string()));
        }
        Ok(Self {
            html: Html::parse_document(source),
        })
    }

    /// Number of elements matching `selector`.
    pub fn count(&self, selector: &Selector) -> usize {
        self.html.select(selector).count()
    }

    /// Text content of the first element matching `selector`.
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.html
            .select(selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }

    /// Values of `attr` on every matching element, in document order.
    pub fn attr_values(&self, selector: &Selector, attr: &str) -> Vec<String> {
        self.html
            .select(selector)
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect()
    }

    /// The doctype declaration, if the page has one.
    pub fn doctype(&self) -> Option<String> {
        self.html
            .tree
            .root()
            .children()
            .find_map(|node| match node.value() {
                Node::Doctype(doctype) => Some(render_doctype(doctype)),
                _ => None,
            })
    }
}

// Rebuilds the declaration the way it was written, minus the "<!DOCTYPE" wrapper:
//   <!DOCTYPE html>  -> html
//   <!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">
//                    -> html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"
fn render_doctype(doctype: &Doctype) -> String {
    let mut label = doctype.name().to_string();
    let public_id = doctype.public_id();
    let system_id = doctype.system_id();

    if !public_id.is_empty() {
        label.push_str(&format!(" PUBLIC \"{public_id}\""));
        if !system_id.is_empty() {
            label.push_str(&format!(" \"{system_id}\""));
        }
    } else if !system_id.is_empty() {
        label.push_str(&format!(" SYSTEM \"{system_id}\""));
    }
    label
}

/// Title, markup version and heading counts of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub markup_version: String,
    /// Levels 1 through 6, always all present.
    pub heading_counts: BTreeMap<u8, usize>,
}

/// Extracts the metadata, emitting one progress event per field group.
pub fn extract_metadata(doc: &Document, reporter: &Reporter) -> DocumentMetadata {
    let title = doc
        .first_text(&TITLE)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    reporter.emit(format!("Title: {title}"));

    let markup_version = doc
        .doctype()
        .unwrap_or_else(|| FALLBACK_MARKUP_VERSION.to_string());
    reporter.emit(format!("HTML Version: {markup_version}"));

    let mut heading_counts = BTreeMap::new();
    for (level, selector) in HEADINGS.iter() {
        let count = doc.count(selector);
        heading_counts.insert(*level, count);
        reporter.emit(format!("Headings h{level}: {count}"));
    }

    DocumentMetadata {
        title,
        markup_version,
        heading_counts,
    }
}

/// Every non-empty `href` on the page, in document order.
pub fn extract_links(doc: &Document) -> Vec<String> {
    doc.attr_values(&ANCHORS, "href")
        .into_iter()
        .filter(|href| !href.trim().is_empty())
        .collect()
}

/// A page counts as having a login form if it has any password input.
pub fn has_login_form(doc: &Document) -> bool {
    doc.count(&PASSWORD_INPUTS) > 0
}

/// Everything the rest of the analysis needs, copied out of the document.
#[derive(Debug, Clone)]
pub struct Outline {
    pub metadata: DocumentMetadata,
    pub links: Vec<String>,
    pub has_login_form: bool,
}

/// Parses `source` and extracts the outline in one synchronous step.
pub fn outline(source: &str, reporter: &Reporter) -> AnalysisOutcome<Outline> {
    let doc = Document::parse(source)?;
    reporter.emit("Analyzing document...");

    Ok(Outline {
        metadata: extract_metadata(&doc, reporter),
        links: extract_links(&doc),
        has_login_form: has_login_form(&doc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::testing::recorder;

    fn parse(html: &str) -> Document {
        Document::parse(html).unwrap()
    }

    #[test]
    fn test_title_from_first_title_element() {
        let doc = parse("<html><head><title> Hi </title><title>Second</title></head></html>");
        let meta = extract_metadata(&doc, &Reporter::silent());
        assert_eq!(meta.title, "Hi");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let doc = parse("<html><body><p>no title</p></body></html>");
        let meta = extract_metadata(&doc, &Reporter::silent());
        assert_eq!(meta.title, "");
    }

    #[test]
    fn test_html5_doctype() {
        let doc = parse("<!DOCTYPE html><html><head></head></html>");
        assert_eq!(doc.doctype().as_deref(), Some("html"));
    }

    #[test]
    fn test_legacy_doctype_keeps_identifiers() {
        let doc = parse(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><html></html>"#,
        );
        assert_eq!(
            doc.doctype().as_deref(),
            Some(r#"html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd""#)
        );
    }

    #[test]
    fn test_missing_doctype_falls_back() {
        let doc = parse("<html><head><title>x</title></head></html>");
        let meta = extract_metadata(&doc, &Reporter::silent());
        assert_eq!(meta.markup_version, FALLBACK_MARKUP_VERSION);
    }

    #[test]
    fn test_heading_counts_are_per_level() {
        let doc = parse("<body><h2>a</h2><h2>b</h2><h2>c</h2><h1>top</h1></body>");
        let meta = extract_metadata(&doc, &Reporter::silent());

        assert_eq!(meta.heading_counts.len(), 6);
        assert_eq!(meta.heading_counts[&1], 1);
        assert_eq!(meta.heading_counts[&2], 3);
        assert_eq!(meta.heading_counts[&3], 0);
        assert_eq!(meta.heading_counts[&6], 0);
    }

    #[test]
    fn test_one_event_per_field() {
        let (sink, reporter) = recorder();
        let doc = parse("<!DOCTYPE html><title>T</title><h1>x</h1>");
        extract_metadata(&doc, &reporter);

        let messages = sink.messages();
        assert_eq!(messages[0], "Title: T");
        assert_eq!(messages[1], "HTML Version: html");
        assert_eq!(messages[2], "Headings h1: 1");
        assert_eq!(messages[7], "Headings h6: 0");
        assert_eq!(messages.len(), 8);
    }

    #[test]
    fn test_links_skip_empty_and_missing_href() {
        let doc = parse(
            r##"<a href="/x">1</a><a>no href</a><a href="">empty</a><a href="  ">blank</a><a href="#top">2</a>"##,
        );
        assert_eq!(extract_links(&doc), vec!["/x", "#top"]);
    }

    #[test]
    fn test_login_form_detection() {
        assert!(has_login_form(&parse(r#"<form><input type="password"></form>"#)));
        assert!(!has_login_form(&parse(r#"<form><input type="text"></form>"#)));
    }

    #[test]
    fn test_empty_source_is_parse_failure() {
        let err = Document::parse("   \n").err().unwrap();
        assert!(matches!(err, AnalysisError::ParseFailure(_)));
    }

    #[test]
    fn test_outline_collects_everything() {
        let outline = outline(
            r#"<html><head><title>Hi</title></head><body><h1>A</h1><a href="/x">i</a><input type="password"></body></html>"#,
            &Reporter::silent(),
        )
        .unwrap();

        assert_eq!(outline.metadata.title, "Hi");
        assert_eq!(outline.links, vec!["/x"]);
        assert!(outline.has_login_form);
    }
}
