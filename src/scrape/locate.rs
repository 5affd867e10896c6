// src/scrape/locate.rs
//
// Finding the recent-games table in a rendered profile page.
//
// The page does not tie the "Last 5 Games" heading to its table in any one
// stable way, so location is an ordered list of strategies, each a pure
// function of the parsed document. The first strategy that yields a table wins.
//
//   1. marker: an element whose text contains the marker phrase, then the
//      table related to it (itself, a following sibling, nested, or in the
//      parent's subtree), checked in that order per candidate.
//   2. header: the first table whose first row has a <th> naming the column.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::core::html::{clean_text, css, following_elements, is_tag, parent_element};
use super::extract::TableTarget;

static CANDIDATES: LazyLock<Selector> = LazyLock::new(|| css("table, h2, h3, h4, div"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| css("table"));
static ROW: LazyLock<Selector> = LazyLock::new(|| css("tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| css("th"));

#[derive(Clone, Copy, Debug)]
pub struct Located<'a> {
    pub table: ElementRef<'a>,
    /// Which strategy matched, e.g. "marker/next sibling" or "header".
    pub strategy: &'static str,
}

pub type Strategy = for<'a> fn(&'a Html, &TableTarget) -> Option<Located<'a>>;

pub const STRATEGIES: &[Strategy] = &[by_marker, by_header_cell];

type Relation = for<'a> fn(ElementRef<'a>) -> Option<ElementRef<'a>>;

const RELATIONS: &[(&str, Relation)] = &[
    ("marker/self", itself),
    ("marker/next sibling", next_sibling_table),
    ("marker/nested", nested_table),
    ("marker/parent", parent_table),
];

pub fn locate_table<'a>(doc: &'a Html, target: &TableTarget) -> Option<Located<'a>> {
    STRATEGIES.iter().find_map(|strategy| strategy(doc, target))
}

/// Candidates in document order whose text contains the marker phrase.
pub fn by_marker<'a>(doc: &'a Html, target: &TableTarget) -> Option<Located<'a>> {
    doc.select(&CANDIDATES)
        .filter(|el| clean_text(*el).contains(target.marker.as_str()))
        .find_map(|el| {
            RELATIONS.iter().find_map(|&(name, relation)| {
                relation(el).map(|table| Located { table, strategy: name })
            })
        })
}

/// First table whose first row carries a header cell naming the column.
pub fn by_header_cell<'a>(doc: &'a Html, target: &TableTarget) -> Option<Located<'a>> {
    doc.select(&TABLE)
        .find(|table| {
            table.select(&ROW).next().is_some_and(|row| {
                row.select(&HEADER_CELL)
                    .any(|th| clean_text(th).contains(target.column.as_str()))
            })
        })
        .map(|table| Located { table, strategy: "header" })
}

fn itself(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    is_tag(el, "table").then_some(el)
}

fn next_sibling_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    following_elements(el).find(|sib| is_tag(*sib, "table"))
}

fn nested_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.select(&TABLE).next()
}

fn parent_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    parent_element(el).and_then(|p| p.select(&TABLE).next())
}
