//! Guarded DOM lookups shared by the site extractors.
//!
//! The sites scraped here put each field in a named container (`#papertitle`, `div.authors`, ...)
//! whose *direct children* carry the data, often next to a label such as "Title:". The helpers
//! below read those children the way the pages are laid out:
//! - [`child_strings`] yields the text of every direct child that holds a single piece of text,
//!   skipping children with mixed content (line breaks, nested markup).
//! - [`find`] locates a named container and returns `None` instead of failing when the markup
//!   has shifted, so a missing section costs one field rather than the record.
//! - [`anchors_with_text`] implements the lookup behind the unique-match policy for links.

use lazy_static::lazy_static;
use scraper::Node;

use super::*;

/// Parses a selector known at compile time.
///
/// Only used with literal selectors inside `lazy_static!` blocks.
pub(crate) fn selector(css: &str) -> Selector { Selector::parse(css).unwrap() }

/// Returns the first element matching `selector`, if any.
pub fn find<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
  document.select(selector).next()
}

/// Returns the text an element holds when that text is its only content.
///
/// Descends through single-child wrappers, so `<b><i>Jane Doe</i></b>` yields `"Jane Doe"`.
/// Elements with no children or several children yield `None`.
pub fn sole_string(element: ElementRef<'_>) -> Option<String> {
  let mut children = element.children();
  let only = children.next()?;
  if children.next().is_some() {
    return None;
  }
  match only.value() {
    Node::Text(text) => Some(String::from(&*text.text)),
    Node::Element(_) => ElementRef::wrap(only).and_then(sole_string),
    _ => None,
  }
}

/// Returns the text of every direct child of `element` that holds a single piece of text.
///
/// Strings are returned untrimmed and in document order, whitespace-only text nodes included.
pub fn child_strings(element: ElementRef<'_>) -> Vec<String> {
  element
    .children()
    .filter_map(|child| match child.value() {
      Node::Text(text) => Some(String::from(&*text.text)),
      Node::Element(_) => ElementRef::wrap(child).and_then(sole_string),
      _ => None,
    })
    .collect()
}

/// Like [`child_strings`], trimmed and with empty entries dropped.
pub fn trimmed_child_strings(element: ElementRef<'_>) -> Vec<String> {
  child_strings(element)
    .iter()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Joins the trimmed child strings of `element` without a separator.
pub fn concatenated_text(element: ElementRef<'_>) -> String {
  trimmed_child_strings(element).concat()
}

/// Replaces every run of line breaks (and the spaces around them) with a single space and trims.
pub fn squash_newlines(text: &str) -> String {
  text.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Returns the `href` of every anchor whose visible text is exactly `text`.
///
/// Surrounding whitespace in the anchor text is ignored. Anchors without an `href` still count
/// as matches and yield `None`.
pub fn anchors_with_text<'a>(document: &'a Html, text: &str) -> Vec<Option<&'a str>> {
  lazy_static! {
    static ref ANCHOR: Selector = selector("a");
  }

  document
    .select(&ANCHOR)
    .filter(|anchor| anchor.text().collect::<String>().trim() == text)
    .map(|anchor| anchor.value().attr("href").map(str::trim))
    .collect()
}
