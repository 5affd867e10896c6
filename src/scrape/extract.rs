// src/scrape/extract.rs
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::config::consts::{MARKER_PHRASE, PASS_THRESHOLD, ROW_WINDOW, STAT_COLUMN};
use crate::core::html::{clean_text, css};
use crate::core::sanitize::parse_leading_float;
use crate::error::ScrapeError;
use super::locate::locate_table;

static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| css("th"));
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| css("tbody tr"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| css("td"));

/// What to look for on the profile page and how to judge it.
#[derive(Clone, Debug, PartialEq)]
pub struct TableTarget {
    pub marker: String,
    pub column: String,
    /// Number of leading body rows averaged.
    pub window: usize,
    pub threshold: f64,
}

impl Default for TableTarget {
    fn default() -> Self {
        Self {
            marker: MARKER_PHRASE.to_string(),
            column: STAT_COLUMN.to_string(),
            window: ROW_WINDOW,
            threshold: PASS_THRESHOLD,
        }
    }
}

impl TableTarget {
    pub fn passes(&self, average: f64) -> bool {
        average >= self.threshold
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub average: f64,
    /// Rows that produced a valid value.
    pub games: usize,
    /// One entry per row read; None where the cell was absent or unusable.
    pub samples: Vec<Option<f64>>,
    pub strategy: &'static str,
}

/// Locate the table in a rendered page and average the target column.
pub fn extract_average(html: &str, target: &TableTarget) -> Result<Extraction, ScrapeError> {
    let doc = Html::parse_document(html);
    let located = locate_table(&doc, target).ok_or_else(|| ScrapeError::TableNotFound {
        marker: target.marker.clone(),
        column: target.column.clone(),
    })?;
    logd!("table found via {}", located.strategy);

    let col = column_index(located.table, &target.column)
        .ok_or_else(|| ScrapeError::ColumnNotFound(target.column.clone()))?;

    let samples = column_samples(located.table, col, target.window);
    let (average, games) =
        mean(&samples).ok_or_else(|| ScrapeError::NoValidSamples(target.column.clone()))?;

    for (i, s) in samples.iter().enumerate() {
        match s {
            Some(v) => logd!("game {}: {v} {}", i + 1, target.column),
            None => logd!("game {}: no value", i + 1),
        }
    }

    Ok(Extraction { average, games, samples, strategy: located.strategy })
}

/// Position of the first `th` in the table whose text is, or contains, `column`.
pub fn column_index(table: ElementRef<'_>, column: &str) -> Option<usize> {
    table.select(&HEADER_CELL).position(|th| {
        let text = clean_text(th);
        text == column || text.contains(column)
    })
}

/// The `col`-th `td` of each of the first `window` body rows.
pub fn column_samples(table: ElementRef<'_>, col: usize, window: usize) -> Vec<Option<f64>> {
    table
        .select(&BODY_ROW)
        .take(window)
        .map(|row| {
            row.select(&DATA_CELL)
                .nth(col)
                .and_then(|td| parse_leading_float(&clean_text(td)))
                .filter(|v| v.is_finite() && *v >= 0.0)
        })
        .collect()
}

/// Mean over the valid samples, with how many there were.
pub fn mean(samples: &[Option<f64>]) -> Option<(f64, usize)> {
    let (sum, count) = samples
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| (sum / count as f64, count))
}
