//! Parsing of the provider's daily price table markup.
//!
//! The response is an HTML fragment holding one `<table>`. The first row is a
//! header; every later row carries product, variety, and the minimum, maximum
//! and average prices in its first five `<td>` cells. Rows that are too short
//! or carry a non-numeric price are dropped, never surfaced as partial records.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use emmsa_core::PriceRecord;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ScraperError;

/// Number of leading cells a data row must have.
const REQUIRED_CELLS: usize = 5;

// A `<table>`, `</table>`, `<tr>` or `</tr>` tag. Group 1 is the closing
// slash, group 2 the element name, group 3 is empty when the input ends
// inside the tag.
static STRUCTURE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)(table|tr)\b[^>]*(>|$)").expect("valid table structure regex")
});
static CELL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<td\b[^>]*>").expect("valid td regex"));
static CELL_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</td\s*>").expect("valid td close regex"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tags regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex")
});

/// Parses the price table HTML returned for `date` into price records.
///
/// Output order matches row order in the source. A table holding only its
/// header row, or a body with no table at all, yields an empty vector: that is
/// the provider's way of saying there was no trading on `date`.
///
/// # Errors
///
/// Returns [`ScraperError::Parse`] if the body ends inside a `<table` tag, so
/// no table structure can be recovered. A missing `</table>` is not an error:
/// the table runs to the end of the body.
pub fn parse_price_table(html: &str, date: NaiveDate) -> Result<Vec<PriceRecord>, ScraperError> {
    tracing::debug!(%date, bytes = html.len(), "parsing price table");

    let rows = table_rows(html)?;
    let mut prices = Vec::with_capacity(rows.len().saturating_sub(1));

    for (index, row) in rows.iter().enumerate().skip(1) {
        let cells = row_cells(row);
        if cells.len() < REQUIRED_CELLS {
            tracing::trace!(row = index, cells = cells.len(), "skipping short row");
            continue;
        }

        let (Some(min_price), Some(max_price), Some(avg_price)) = (
            parse_price(&cells[2]),
            parse_price(&cells[3]),
            parse_price(&cells[4]),
        ) else {
            tracing::warn!(
                row = index,
                min = %cells[2],
                max = %cells[3],
                avg = %cells[4],
                "skipping row with invalid price data"
            );
            continue;
        };

        prices.push(PriceRecord {
            date,
            product: cells[0].clone(),
            variety: cells[1].clone(),
            min_price,
            max_price,
            avg_price,
        });
    }

    tracing::debug!(%date, records = prices.len(), "parsed price table");
    Ok(prices)
}

/// Returns the inner markup of every `<tr>` inside any `<table>`, in document
/// order. Rows of nested tables are included.
///
/// A row runs until the next `<tr>` of the same or an enclosing table, or the
/// close of its own table, so rows whose `</tr>` was omitted are still found.
/// A table with no `</table>` ends at the end of the input.
fn table_rows(html: &str) -> Result<Vec<&str>, ScraperError> {
    // (content start, content end)
    let mut rows: Vec<(usize, usize)> = Vec::new();
    // (content start, depth of the table the row belongs to)
    let mut open_rows: Vec<(usize, usize)> = Vec::new();
    let mut depth = 0usize;

    let mut finish_rows = |open_rows: &mut Vec<(usize, usize)>, at_depth: usize, end: usize| {
        while let Some(&(start, row_depth)) = open_rows.last() {
            if row_depth < at_depth {
                break;
            }
            rows.push((start, end));
            open_rows.pop();
        }
    };

    for tag in STRUCTURE_TAG.captures_iter(html) {
        let (Some(whole), Some(slash), Some(name), Some(terminator)) =
            (tag.get(0), tag.get(1), tag.get(2), tag.get(3))
        else {
            continue;
        };
        let closing = !slash.as_str().is_empty();
        let terminated = terminator.as_str() == ">";
        let is_table = name.as_str().eq_ignore_ascii_case("table");

        match (is_table, closing) {
            (true, false) => {
                if !terminated {
                    return Err(ScraperError::Parse {
                        reason: "unterminated <table> tag".to_string(),
                    });
                }
                depth += 1;
            }
            (true, true) if depth > 0 => {
                finish_rows(&mut open_rows, depth, whole.start());
                depth -= 1;
            }
            (false, false) if depth > 0 && terminated => {
                finish_rows(&mut open_rows, depth, whole.start());
                open_rows.push((whole.end(), depth));
            }
            _ => {}
        }
    }
    finish_rows(&mut open_rows, 0, html.len());

    rows.sort_unstable_by_key(|&(start, _)| start);
    Ok(rows.into_iter().map(|(start, end)| &html[start..end]).collect())
}

/// Extracts the cleaned text of each `<td>` cell in a row.
fn row_cells(row: &str) -> Vec<String> {
    let starts: Vec<_> = CELL_OPEN.find_iter(row).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, cell_open)| {
            let next = starts.get(i + 1).map_or(row.len(), regex::Match::start);
            let raw = &row[cell_open.end()..next];
            let raw = CELL_CLOSE.find(raw).map_or(raw, |m| &raw[..m.start()]);
            cell_text(raw)
        })
        .collect()
}

/// Strips inner tags, decodes entities, and collapses whitespace.
fn cell_text(raw: &str) -> String {
    let no_tags = TAG.replace_all(raw, " ");
    decode_entities(&no_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    ENTITY
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            decode_entity(name).map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name
        .strip_prefix("#x")
        .or_else(|| name.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "Aacute" => 'Á',
        "Eacute" => 'É',
        "Iacute" => 'Í',
        "Oacute" => 'Ó',
        "Uacute" => 'Ú',
        "ntilde" => 'ñ',
        "Ntilde" => 'Ñ',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        _ => return None,
    };
    Some(c)
}

fn parse_price(cell: &str) -> Option<Decimal> {
    Decimal::from_str(cell.trim()).ok()
}
