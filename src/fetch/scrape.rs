//! Extracts the weekly menu table from an upstream page.
//!
//! The page carries one table: the second header row has one cell per day,
//! and the first three body rows hold breakfast, lunch, and dinner, one cell
//! per day, each cell a `<ul>` of dishes.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::models::{DateKey, MealBatch, MealPeriod, MealRecord};

static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("#txt > div.carte_w > div.scl_x > table"));
static DATE_CELLS: LazyLock<Selector> = LazyLock::new(|| selector("thead > tr:nth-child(2) > th"));
static DISHES: LazyLock<Selector> = LazyLock::new(|| selector("ul > li"));
static PERIOD_ROWS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    MealPeriod::ALL.map(|p| selector(&format!("tbody > tr:nth-child({}) > td", p.index() + 1)))
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Parses one weekly page into records keyed by date.
///
/// Returns an empty batch when the page has no menu table, when the first
/// date header is blank (the upstream placeholder for a week that is not
/// published yet), or when a meal row does not have one cell per date.
pub fn parse_week_page(html: &str) -> MealBatch {
    let document = Html::parse_document(&html.replace('\r', ""));

    let Some(table) = document.select(&TABLE).next() else {
        tracing::debug!("No menu table on page");
        return MealBatch::new();
    };

    let headers: Vec<String> = table.select(&DATE_CELLS).map(|th| cell_text(&th)).collect();
    match headers.first() {
        Some(first) if !first.is_empty() => {}
        _ => {
            tracing::debug!("Menu table has no dates");
            return MealBatch::new();
        }
    }

    let mut days = vec![MealRecord::default(); headers.len()];
    for (period, rows) in MealPeriod::ALL.iter().zip(PERIOD_ROWS.iter()) {
        let cells: Vec<ElementRef> = table.select(rows).collect();
        if cells.len() != headers.len() {
            tracing::warn!(
                "{} row has {} cell(s) for {} date(s); ignoring page",
                period,
                cells.len(),
                headers.len()
            );
            return MealBatch::new();
        }
        for (day, cell) in days.iter_mut().zip(cells) {
            *day.period_mut(*period) = cell.select(&DISHES).map(|li| cell_text(&li)).collect();
        }
    }

    let mut batch = MealBatch::new();
    for (header, record) in headers.iter().zip(days) {
        match DateKey::from_header_text(header) {
            Some(key) => {
                batch.insert(key, record);
            }
            None => tracing::warn!("Skipping column with unrecognised date '{}'", header),
        }
    }
    batch
}

fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, body: &str) -> String {
        format!(
            r#"<html><body><div id="txt"><div class="carte_w"><div class="scl_x">
            <table>
              <thead>
                <tr><th colspan="3">Weekly menu</th></tr>
                <tr>{head}</tr>
              </thead>
              <tbody>{body}</tbody>
            </table>
            </div></div></div></body></html>"#
        )
    }

    fn cell(dishes: &[&str]) -> String {
        let items: String = dishes.iter().map(|d| format!("<li>{d}</li>")).collect();
        format!("<td><ul>{items}</ul></td>")
    }

    fn row(cells: &[&[&str]]) -> String {
        let tds: String = cells.iter().map(|c| cell(c)).collect();
        format!("<tr>{tds}</tr>")
    }

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).into_inner()
    }

    #[test]
    fn test_parse_week_page() {
        let html = page(
            "<th>2024-01-08(월)</th><th>2024-01-09(화)</th>",
            &[
                row(&[&["rice", "soup"], &["toast"]]),
                row(&[&["bibimbap"], &[]]),
                row(&[&["noodles"], &["curry\r"]]),
            ]
            .concat(),
        );

        let batch = parse_week_page(&html);
        assert_eq!(batch.len(), 2);

        let monday = &batch[&key("2024-01-08")];
        assert_eq!(monday.breakfast, vec!["rice", "soup"]);
        assert_eq!(monday.lunch, vec!["bibimbap"]);
        assert_eq!(monday.dinner, vec!["noodles"]);

        let tuesday = &batch[&key("2024-01-09")];
        assert_eq!(tuesday.breakfast, vec!["toast"]);
        assert!(tuesday.lunch.is_empty());
        assert_eq!(tuesday.dinner, vec!["curry"]);
    }

    #[test]
    fn test_missing_table_is_empty() {
        assert!(parse_week_page("<html><body><p>nothing</p></body></html>").is_empty());
    }

    #[test]
    fn test_blank_first_header_is_empty() {
        let html = page(
            "<th></th><th></th>",
            &[row(&[&[], &[]]), row(&[&[], &[]]), row(&[&[], &[]])].concat(),
        );
        assert!(parse_week_page(&html).is_empty());
    }

    #[test]
    fn test_row_width_mismatch_is_empty() {
        let html = page(
            "<th>2024-01-08</th><th>2024-01-09</th>",
            &[row(&[&["a"], &["b"]]), row(&[&["c"]]), row(&[&["d"], &["e"]])].concat(),
        );
        assert!(parse_week_page(&html).is_empty());
    }

    #[test]
    fn test_missing_row_is_empty() {
        let html = page(
            "<th>2024-01-08</th>",
            &[row(&[&["a"]]), row(&[&["b"]])].concat(),
        );
        assert!(parse_week_page(&html).is_empty());
    }

    #[test]
    fn test_unrecognised_date_column_is_skipped() {
        let html = page(
            "<th>2024-01-08</th><th>holiday</th>",
            &[
                row(&[&["a"], &["x"]]),
                row(&[&["b"], &["y"]]),
                row(&[&["c"], &["z"]]),
            ]
            .concat(),
        );
        let batch = parse_week_page(&html);
        assert_eq!(batch.keys().copied().collect::<Vec<_>>(), vec![key("2024-01-08")]);
    }
}
