//! # Catalog Import
//!
//! Parses `;`-delimited product files into products priced in every
//! currency.
//!
//! ## Row Flow
//! ```text
//! file bytes
//!        │
//!        ▼
//! decode_csv_bytes          atomic: UTF-8 or reject, partial: lossy
//!        │
//!        ▼
//! "Cheese - Grana Padano;$163.88;1/14/2023"
//!        │
//!        ▼
//! read_csv                  header detection, blank rows skipped
//!        │
//!        ▼
//! parse_product_row         name, "$163.88" → (16388, 2), 1/14/2023
//!        │                  first bad cell → ValidationIssue at $.row.<n>
//!        ▼
//! ProductPrice::from_usd    EUR/JPY/BRL/BTC from the exchange rate
//!        │
//!        ▼
//! import_rows               atomic: any issue rejects the batch
//!                           partial: keep valid rows, report the rest
//! ```
//!
//! Cells follow the usual CSV quoting rules with `;` as the delimiter.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::exchange::ExchangeRate;
use crate::fixed::{PreciseNumber, Unit};
use crate::number::pow10;
use crate::types::{ImportStrategy, Product, ProductBatch, ProductPrice};
use crate::validation::{RequestSegment, ValidationIssue, ValidationReport};

/// Maximum length of an imported product name, in characters.
pub const MAX_PRODUCT_NAME_LENGTH: usize = 1024;

/// Field delimiter of import files.
pub const CSV_DELIMITER: char = ';';

/// Columns an import file must provide, in positional order.
pub const EXPECTED_FIELDS: [&str; 3] = ["name", "price", "expiration"];

static PRICE_PATTERN: OnceLock<Regex> = OnceLock::new();
static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn price_pattern() -> &'static Regex {
    PRICE_PATTERN.get_or_init(|| {
        Regex::new(r"^\$(0|[1-9]\d*)\.(\d{2})$").expect("price pattern is a valid regex")
    })
}

fn date_pattern() -> &'static Regex {
    DATE_PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{3,4})$").expect("date pattern is a valid regex")
    })
}

// =============================================================================
// Cell Parsers
// =============================================================================

/// Trimmed product name, or `None` when empty or longer than
/// [`MAX_PRODUCT_NAME_LENGTH`].
pub fn parse_product_name(value: &str) -> Option<String> {
    let name = value.trim();
    if name.is_empty() || name.chars().count() > MAX_PRODUCT_NAME_LENGTH {
        return None;
    }
    Some(name.to_string())
}

/// Parses a USD price cell such as `"$163.88"` into a unit 2 number.
///
/// Exactly two cents digits are required and the dollars have no leading
/// zeros (`"$0.99"` is fine, `"$01.00"` and `"$1.5"` are not).
///
/// ## Example
/// ```rust
/// use num_bigint::BigInt;
/// use pricebook_core::import::parse_csv_price;
///
/// let price = parse_csv_price(" $163.88 ").unwrap();
/// assert_eq!(price.amount, BigInt::from(16388));
/// assert!(parse_csv_price("163.88").is_none());
/// ```
pub fn parse_csv_price(value: &str) -> Option<PreciseNumber> {
    let captures = price_pattern().captures(value.trim())?;
    let dollars: num_bigint::BigInt = captures.get(1)?.as_str().parse().ok()?;
    let cents: num_bigint::BigInt = captures.get(2)?.as_str().parse().ok()?;
    Some(PreciseNumber::new(dollars * pow10(2) + cents, Unit::new(2)))
}

/// Parses a `M/D/YYYY` date cell. The date must exist in the calendar.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pricebook_core::import::parse_csv_date;
///
/// assert_eq!(parse_csv_date("1/14/2023"), NaiveDate::from_ymd_opt(2023, 1, 14));
/// assert_eq!(parse_csv_date("2/30/2023"), None);
/// ```
pub fn parse_csv_date(value: &str) -> Option<NaiveDate> {
    let captures = date_pattern().captures(value.trim())?;
    let month: u32 = captures.get(1)?.as_str().parse().ok()?;
    let day: u32 = captures.get(2)?.as_str().parse().ok()?;
    let year: i32 = captures.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// =============================================================================
// Rows
// =============================================================================

/// Raw cells of one import row. A missing cell is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub name: Option<String>,
    pub price: Option<String>,
    pub expiration: Option<String>,
}

impl CsvRow {
    fn is_blank(&self) -> bool {
        [&self.name, &self.price, &self.expiration]
            .iter()
            .all(|cell| cell.as_deref().map_or(true, |cell| cell.trim().is_empty()))
    }
}

fn is_header(cells: &[String]) -> bool {
    let lowered: Vec<String> = cells.iter().map(|cell| cell.trim().to_lowercase()).collect();
    EXPECTED_FIELDS
        .iter()
        .all(|field| lowered.iter().any(|cell| cell == field))
}

fn file_issue(message: &str) -> ValidationReport {
    ValidationReport::new(
        RequestSegment::MultipartFile,
        vec![ValidationIssue::new(message, None, "invalid_format")],
    )
}

/// Decodes an uploaded file.
///
/// [`ImportStrategy::Atomic`] requires valid UTF-8. [`ImportStrategy::Partial`]
/// replaces invalid sequences with U+FFFD so the remaining rows still import.
///
/// ## Errors
/// A `MULTIPART_FILE` report when an atomic import is not UTF-8.
pub fn decode_csv_bytes(
    bytes: &[u8],
    strategy: ImportStrategy,
) -> Result<Cow<'_, str>, ValidationReport> {
    match strategy {
        ImportStrategy::Atomic => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| file_issue("Expected file must be UTF-8 encoded")),
        ImportStrategy::Partial => Ok(String::from_utf8_lossy(bytes)),
    }
}

/// Splits text into records of `;`-delimited cells.
///
/// A cell starting with `"` is quoted: it may contain `;` and line breaks, and
/// `""` inside it stands for one `"`. An empty line yields an empty record.
fn split_records(text: &str) -> Option<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut at_cell_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if at_cell_start => {
                in_quotes = true;
                at_cell_start = false;
            }
            CSV_DELIMITER => {
                record.push(std::mem::take(&mut cell));
                at_cell_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                // an empty line has no cells at all
                if !(record.is_empty() && cell.is_empty() && at_cell_start) {
                    record.push(std::mem::take(&mut cell));
                }
                records.push(std::mem::take(&mut record));
                at_cell_start = true;
            }
            _ => {
                cell.push(c);
                at_cell_start = false;
            }
        }
    }

    if in_quotes {
        return None;
    }
    if !(record.is_empty() && cell.is_empty() && at_cell_start) {
        record.push(cell);
        records.push(record);
    }

    Some(records)
}

/// Splits import file text into numbered rows.
///
/// When the first record names every expected field (in any order and case),
/// it is used as the header. Otherwise cells are read positionally as
/// `name;price;expiration`. Rows are numbered from 1, excluding the header.
/// Empty lines are skipped and not counted. Rows whose cells are all blank are
/// skipped but still counted.
///
/// ## Errors
/// A `MULTIPART_FILE` report when a quoted cell is never closed.
///
/// ## Example
/// ```rust
/// use pricebook_core::import::read_csv;
///
/// let rows = read_csv("\"Cheese; aged\";$1.00;1/2/2025\n").unwrap();
/// assert_eq!(rows[0].1.name.as_deref(), Some("Cheese; aged"));
/// ```
pub fn read_csv(text: &str) -> Result<Vec<(usize, CsvRow)>, ValidationReport> {
    let records = split_records(text)
        .ok_or_else(|| file_issue("Expected file must be a valid CSV file delimited by ;"))?;
    let mut records = records.into_iter().filter(|record| !record.is_empty()).peekable();

    let columns: HashMap<String, usize> = match records.peek() {
        Some(first) if is_header(first) => {
            let header = first
                .iter()
                .enumerate()
                .map(|(index, cell)| (cell.trim().to_lowercase(), index))
                .collect();
            records.next();
            header
        }
        _ => EXPECTED_FIELDS
            .iter()
            .enumerate()
            .map(|(index, field)| (field.to_string(), index))
            .collect(),
    };

    let rows = records
        .enumerate()
        .map(|(index, cells)| {
            let cell = |field: &str| {
                columns
                    .get(field)
                    .and_then(|&column| cells.get(column))
                    .cloned()
            };
            let row = CsvRow {
                name: cell("name"),
                price: cell("price"),
                expiration: cell("expiration"),
            };
            (index + 1, row)
        })
        .filter(|(_, row)| !row.is_blank())
        .collect();

    Ok(rows)
}

fn row_issue(row_index: usize, what: &str, value: Option<&str>) -> ValidationIssue {
    ValidationIssue::new(
        format!(
            "Expected {what} in row index {row_index} is invalid '{}'",
            value.unwrap_or_default()
        ),
        Some(format!("$.row.{row_index}")),
        "invalid_format",
    )
}

/// Parses one row into a product of `batch_id`, priced from its USD price.
///
/// ## Errors
/// An `invalid_format` issue at `$.row.<row_index>` naming the first bad
/// cell.
pub fn parse_product_row(
    row: &CsvRow,
    row_index: usize,
    batch_id: &str,
    rate: &ExchangeRate,
) -> Result<Product, ValidationIssue> {
    let name = row.name.as_deref();
    let name = name
        .and_then(parse_product_name)
        .ok_or_else(|| row_issue(row_index, "name", name))?;

    let price = row.price.as_deref();
    let usd = price
        .and_then(parse_csv_price)
        .ok_or_else(|| row_issue(row_index, "price in USD", price))?;

    let expiration = row.expiration.as_deref();
    let expiration = expiration
        .and_then(parse_csv_date)
        .and_then(start_of_day)
        .ok_or_else(|| row_issue(row_index, "expiration date", expiration))?;

    Ok(Product::new(
        name,
        ProductPrice::from_usd(&usd, rate),
        expiration,
        Some(batch_id.to_string()),
    ))
}

// =============================================================================
// Batch Import
// =============================================================================

/// Result of an accepted import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub batch: ProductBatch,
    pub products: Vec<Product>,
    /// Rows skipped by a partial import.
    pub issues: Vec<ValidationIssue>,
}

/// Response body of an accepted import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub batch: ProductBatch,
    pub issues: Vec<ValidationIssue>,
    pub imported: usize,
    pub strategy: ImportStrategy,
}

impl ImportOutcome {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            batch: self.batch.clone(),
            issues: self.issues.clone(),
            imported: self.products.len(),
            strategy: self.batch.strategy,
        }
    }
}

/// Parses every row into the batch.
///
/// ## Errors
/// With [`ImportStrategy::Atomic`], a report of every bad row when there is
/// at least one. [`ImportStrategy::Partial`] never fails.
pub fn import_rows<I>(
    rows: I,
    batch: ProductBatch,
    rate: &ExchangeRate,
) -> Result<ImportOutcome, ValidationReport>
where
    I: IntoIterator<Item = (usize, CsvRow)>,
{
    let mut products = Vec::new();
    let mut issues = Vec::new();

    for (row_index, row) in rows {
        match parse_product_row(&row, row_index, &batch.id, rate) {
            Ok(product) => products.push(product),
            Err(issue) => {
                warn!(
                    batch_id = %batch.id,
                    row_index,
                    message = %issue.message,
                    "Rejected import row"
                );
                issues.push(issue);
            }
        }
    }

    debug!(
        batch_id = %batch.id,
        strategy = %batch.strategy,
        imported = products.len(),
        rejected = issues.len(),
        "Parsed import batch"
    );

    if batch.strategy == ImportStrategy::Atomic && !issues.is_empty() {
        return Err(ValidationReport::new(RequestSegment::MultipartFile, issues));
    }

    Ok(ImportOutcome {
        batch,
        products,
        issues,
    })
}

/// Checks the uploaded file name before reading it.
pub fn validate_csv_filename(filename: &str) -> Result<(), ValidationReport> {
    let issue = if filename.is_empty() {
        ValidationIssue::new(
            "No file was found in the request multipart file",
            Some("$.file".to_string()),
            "not_found",
        )
    } else if !filename.to_lowercase().ends_with(".csv") {
        ValidationIssue::new(
            "Expected file must be a CSV",
            Some("$.file".to_string()),
            "invalid_format",
        )
    } else {
        return Ok(());
    };

    Err(ValidationReport::new(RequestSegment::MultipartFile, vec![issue]))
}

// =============================================================================
// Unit Tests
// =============================================================================
