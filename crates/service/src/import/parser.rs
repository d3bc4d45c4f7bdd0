//! Phase 1 of the bulk import: turn the uploaded CSV bytes into validated
//! rows, with no store access.
//!
//! Column order is `title, kind, value, category`; the first row is a header
//! and is skipped. Incidental whitespace is trimmed from every field. A row
//! is dropped (never aborting the batch) when it is missing title, kind or
//! value, when its kind is not literally `income`/`outcome`, when its value
//! is not a positive decimal, or when its category is empty.

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;

use models::transaction::{self, TransactionKind};

/// One surviving CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvEntry {
    pub title: String,
    pub kind: TransactionKind,
    pub value: Decimal,
    pub category: String,
}

/// Surviving rows plus the raw category-title sequence. Duplicates are
/// retained here; phase 2 reduces them to the set of new titles.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub entries: Vec<CsvEntry>,
    pub category_titles: Vec<String>,
}

pub fn parse(bytes: &[u8]) -> ParsedBatch {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let mut batch = ParsedBatch::default();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let title = record.get(0).unwrap_or("");
        let kind = record.get(1).unwrap_or("");
        let value = record.get(2).unwrap_or("");
        let category = record.get(3).unwrap_or("");

        if title.is_empty() || kind.is_empty() || value.is_empty() {
            continue;
        }
        let Ok(kind) = transaction::parse_kind(kind) else { continue };
        let Ok(value) = value.parse::<Decimal>() else { continue };
        if value <= Decimal::ZERO || category.is_empty() {
            continue;
        }

        batch.category_titles.push(category.to_string());
        batch.entries.push(CsvEntry {
            title: title.to_string(),
            kind,
            value,
            category: category.to_string(),
        });
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_skipped_and_fields_trimmed() {
        let csv = b"title, kind, value, category\nSalary , income , 5000 , Job \n";
        let batch = parse(csv);
        assert_eq!(batch.entries.len(), 1);
        let entry = &batch.entries[0];
        assert_eq!(entry.title, "Salary");
        assert_eq!(entry.kind, TransactionKind::Income);
        assert_eq!(entry.value, Decimal::new(5000, 0));
        assert_eq!(entry.category, "Job");
    }

    #[test]
    fn rows_missing_required_fields_are_dropped() {
        let csv = b"title,kind,value,category\n\
            ,outcome,50,Food\n\
            Rent,,1200,Housing\n\
            Rent,outcome,,Housing\n\
            Rent,outcome,1200,Housing\n";
        let batch = parse(csv);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.entries[0].title, "Rent");
        assert_eq!(batch.category_titles, vec!["Housing".to_string()]);
    }

    #[test]
    fn unknown_kind_and_bad_value_are_dropped() {
        let csv = b"title,kind,value,category\n\
            Transfer,transfer,100,Misc\n\
            Typo,Income,100,Misc\n\
            Free,income,0,Misc\n\
            Debt,outcome,-5,Misc\n\
            Junk,income,abc,Misc\n\
            Salary,income,5000.50,Job\n";
        let batch = parse(csv);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.entries[0].value, Decimal::new(500050, 2));
    }

    #[test]
    fn empty_category_is_dropped_and_short_rows_tolerated() {
        let csv = b"title,kind,value,category\n\
            Salary,income,5000\n\
            Rent,outcome,1200,Housing\n";
        let batch = parse(csv);
        assert_eq!(batch.entries.len(), 1);
        assert_eq!(batch.entries[0].category, "Housing");
    }

    #[test]
    fn duplicate_category_titles_are_retained_in_sequence() {
        let csv = b"title,kind,value,category\n\
            Salary,income,5000,Job\n\
            Bonus,income,500,Job\n\
            Rent,outcome,1200,Housing\n";
        let batch = parse(csv);
        assert_eq!(batch.entries.len(), 3);
        assert_eq!(
            batch.category_titles,
            vec!["Job".to_string(), "Job".to_string(), "Housing".to_string()]
        );
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let batch = parse(b"");
        assert!(batch.entries.is_empty());
        assert!(batch.category_titles.is_empty());
    }
}
