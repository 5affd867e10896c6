// src/scrape/mod.rs

pub mod browser;
pub mod extract;
pub mod locate;
pub mod page;
pub mod profile;

pub use extract::{extract_average, Extraction, TableTarget};
pub use locate::{locate_table, Located};
pub use page::{PageSession, PageSource};
pub use profile::fetch_average;
