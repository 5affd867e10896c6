// src/core/html.rs
// DOM helpers over `scraper` element handles.

use scraper::{ElementRef, Selector};

use super::sanitize::{normalize_entities, normalize_ws};

/// Compile a selector that is a literal in this crate.
pub fn css(selector: &'static str) -> Selector {
    // Only called with literals covered by tests.
    Selector::parse(selector).unwrap_or_else(|e| panic!("bad selector {selector:?}: {e}"))
}

/// Concatenated text of the element and its descendants (DOM `textContent`).
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// `text_content`, with nbsp folded and whitespace collapsed.
pub fn clean_text(el: ElementRef<'_>) -> String {
    normalize_ws(&normalize_entities(&text_content(el)))
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

/// Elements after `el` under the same parent, nearest first.
pub fn following_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

pub fn parent_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}
