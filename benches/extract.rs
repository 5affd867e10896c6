// benches/extract.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};
use scraper::Html;

use threes_check::scrape::{extract_average, locate_table, TableTarget};

const HOT: &str = include_str!("../tests/fixtures/profile_hot.html");
const COLD: &str = include_str!("../tests/fixtures/profile_cold.html");

/// The recent-games table buried after a long unrelated page, header fallback only.
fn padded_page() -> String {
    let filler: String = (0..400)
        .map(|i| format!("<div class=\"card\"><h4>Story {i}</h4><p>Lorem ipsum dolor sit amet.</p></div>"))
        .collect();
    let table = HOT
        .split_once("<table id=\"last5\">")
        .and_then(|(_, rest)| rest.split_once("</table>"))
        .map(|(body, _)| format!("<table id=\"last5\">{body}</table>"))
        .unwrap_or_default();
    format!("<html><body>{filler}{table}</body></html>")
}

fn bench_extract(c: &mut Criterion) {
    let target = TableTarget::default();
    let padded = padded_page();

    c.bench_function("extract_marker", |b| {
        b.iter(|| black_box(extract_average(black_box(HOT), &target).map(|x| x.average)))
    });

    c.bench_function("extract_cold", |b| {
        b.iter(|| black_box(extract_average(black_box(COLD), &target).map(|x| x.games)))
    });

    c.bench_function("extract_header_fallback", |b| {
        b.iter(|| black_box(extract_average(black_box(&padded), &target).map(|x| x.average)))
    });

    // Location alone, without re-parsing.
    let doc = Html::parse_document(&padded);
    c.bench_function("locate_only", |b| {
        b.iter(|| black_box(locate_table(black_box(&doc), &target).map(|l| l.strategy)))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
