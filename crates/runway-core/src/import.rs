//! CSV import into the transaction table
//!
//! Accepts any CSV with `date`, `amount` and `category` columns (header
//! case and surrounding whitespace don't matter, extra columns are ignored)
//! and normalizes each row into a [`TransactionRecord`].

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ImportSummary, TransactionRecord, DEFAULT_CATEGORY};

const REQUIRED_COLUMNS: [&str; 3] = ["date", "amount", "category"];

/// Raw spellings that map onto one canonical category
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("payroll", "Payroll"),
    ("salary", "Payroll"),
    ("salaries", "Payroll"),
    ("saas", "SaaS"),
    ("software", "SaaS"),
    ("cloud", "Cloud"),
    ("hosting", "Cloud"),
    ("ads", "Marketing"),
    ("marketing", "Marketing"),
    ("rent", "Rent"),
    ("office", "Rent"),
];

/// Parse CSV bytes into a normalized transaction table
pub fn parse_transactions_csv(bytes: &[u8]) -> Result<(Vec<TransactionRecord>, ImportSummary)> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::Import("File is not valid UTF-8 text.".into()))?;
    let text = text.trim_start_matches('\u{feff}');

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::locate(rdr.headers()?)?;
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result?;

        let date = parse_date(columns.get(&row, columns.date)).ok_or_else(|| {
            Error::Import("Column 'date' contains unparseable values.".into())
        })?;
        let amount = parse_amount(columns.get(&row, columns.amount)).ok_or_else(|| {
            Error::Import("Column 'amount' contains non-numeric values.".into())
        })?;
        let category = normalize_category(columns.get(&row, columns.category));

        records.push(TransactionRecord::new(date, amount, category));
    }

    let summary = summarize(&records);
    debug!(
        "Parsed {} transactions across {} months and {} categories",
        summary.rows, summary.months_detected, summary.categories_detected
    );

    Ok((records, summary))
}

/// Positions of the required columns in the header row
struct Columns {
    date: usize,
    amount: usize,
    category: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let mut missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();

        match (find("date"), find("amount"), find("category")) {
            (Some(date), Some(amount), Some(category)) => Ok(Self {
                date,
                amount,
                category,
            }),
            _ => {
                missing.sort_unstable();
                Err(Error::Import(format!(
                    "Missing required columns: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Field at `index`, empty when a short row doesn't reach it
    fn get<'r>(&self, row: &'r StringRecord, index: usize) -> &'r str {
        row.get(index).unwrap_or("")
    }
}

fn summarize(records: &[TransactionRecord]) -> ImportSummary {
    let months: HashSet<&str> = records.iter().map(|r| r.month.as_str()).collect();
    let categories: HashSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

    ImportSummary {
        rows: records.len(),
        months_detected: months.len(),
        categories_detected: categories.len(),
    }
}

/// Parse a date in one of the supported formats
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map a raw category label onto its canonical name
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }

    let key = trimmed.to_lowercase();
    CATEGORY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| title_case(trimmed))
}

/// Uppercase the first letter of every word, lowercase the rest
///
/// A word starts after any non-alphabetic character, so "food & drink"
/// becomes "Food & Drink" and "e-commerce" becomes "E-Commerce".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_alpha = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if previous_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(ch);
            previous_alpha = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("01/15/24"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("01-15-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T09:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 09:30:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("-123.45"), Some(-123.45));
        assert_eq!(parse_amount("(100.00)"), Some(-100.00));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("salaries"), "Payroll");
        assert_eq!(normalize_category("  SOFTWARE "), "SaaS");
        assert_eq!(normalize_category("Hosting"), "Cloud");
        assert_eq!(normalize_category("ads"), "Marketing");
        assert_eq!(normalize_category("office"), "Rent");
        assert_eq!(normalize_category("travel"), "Travel");
        assert_eq!(normalize_category("food & DRINK"), "Food & Drink");
        assert_eq!(normalize_category("e-commerce"), "E-Commerce");
        assert_eq!(normalize_category("   "), "Other");
        assert_eq!(normalize_category(""), "Other");
    }

    #[test]
    fn test_parse_transactions_csv() {
        let csv = "date,amount,category,memo
2024-01-05,-50000,salary,January payroll
2024-01-20,\"$12,000.00\",Revenue,
01/03/2024,-1200,hosting,
2024-02-05,(70000),Payroll,
2024-02-11,-300,,misc";

        let (records, summary) = parse_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].category, "Payroll");
        assert_eq!(records[0].month, "2024-01");
        assert_eq!(records[1].amount, 12000.0);
        assert!(records[1].is_revenue());
        assert_eq!(records[2].category, "Cloud");
        assert_eq!(records[3].amount, -70000.0);
        assert_eq!(records[3].month, "2024-02");
        assert_eq!(records[4].category, "Other");

        assert_eq!(
            summary,
            ImportSummary {
                rows: 5,
                months_detected: 2,
                categories_detected: 4,
            }
        );
    }

    #[test]
    fn test_headers_are_case_and_whitespace_insensitive() {
        let csv = " Category , AMOUNT ,Date\nrent,-900,2024-03-01\n";
        let (records, _) = parse_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].category, "Rent");
        assert_eq!(records[0].amount, -900.0);
        assert_eq!(records[0].date, ymd(2024, 3, 1));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let csv = "\u{feff}date,amount,category\n2024-03-01,-10,saas\n";
        let (records, _) = parse_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].category, "SaaS");
    }

    #[test]
    fn test_missing_columns_are_named() {
        let err = parse_transactions_csv(b"when,amount\n2024-01-01,-5\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Import error: Missing required columns: category, date"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = parse_transactions_csv(b"date,amount,category\nsoon,-5,Rent\n").unwrap_err();
        assert!(err
            .to_string()
            .contains("Column 'date' contains unparseable values."));

        let err =
            parse_transactions_csv(b"date,amount,category\n2024-01-01,lots,Rent\n").unwrap_err();
        assert!(err
            .to_string()
            .contains("Column 'amount' contains non-numeric values."));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = parse_transactions_csv(&[0x64, 0xff, 0xfe, 0x0a]).unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_header_only_file_is_empty_table() {
        let (records, summary) = parse_transactions_csv(b"date,amount,category\n").unwrap();
        assert!(records.is_empty());
        assert_eq!(summary.rows, 0);
    }
}
