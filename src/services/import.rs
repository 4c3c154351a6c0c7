//! Import service for re-reading exported expenses
//!
//! CSV files are mapped by header name. Rows that fail validation are
//! reported by line number and skipped; the rest are appended in one save.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::{debug, warn};

use super::expense::ExpenseService;
use crate::error::{ExpenseError, ExpenseResult};
use crate::export::json::ExpenseExport;
use crate::models::{Expense, ExpenseDraft};
use crate::storage::ExpensePersistence;

/// Column positions of a CSV export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date: usize,
    pub amount: usize,
    pub category: usize,
    pub description: usize,
    pub created_at: Option<usize>,
}

impl ColumnMapping {
    /// Locate the columns by (case-insensitive) header name
    pub fn from_headers(headers: &StringRecord) -> ExpenseResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date = find("date");
        let amount = find("amount");
        let category = find("category");
        let description = find("description");

        match (date, amount, category, description) {
            (Some(date), Some(amount), Some(category), Some(description)) => Ok(Self {
                date,
                amount,
                category,
                description,
                created_at: find("created at"),
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("Date", date),
                    ("Amount", amount),
                    ("Category", category),
                    ("Description", description),
                ]
                .iter()
                .filter(|(_, position)| position.is_none())
                .map(|(name, _)| *name)
                .collect();
                Err(ExpenseError::Import(format!(
                    "Missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }

    fn parse_record(&self, record: &StringRecord) -> Result<Expense, String> {
        let field = |index: usize| record.get(index).unwrap_or("").to_string();

        let draft = ExpenseDraft::new(
            field(self.amount),
            field(self.category),
            field(self.description),
            field(self.date),
        );
        let mut expense = draft.into_expense().map_err(|e| e.to_string())?;

        if let Some(index) = self.created_at {
            let raw = field(index);
            if !raw.trim().is_empty() {
                expense.created_at = DateTime::parse_from_rfc3339(raw.trim())
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| format!("created at: invalid timestamp '{}'", raw.trim()))?;
            }
        }

        Ok(expense)
    }
}

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    /// Expenses added to the store
    pub imported: usize,
    /// Records skipped because their id was already present
    pub duplicates_skipped: usize,
    /// Rejected rows keyed by line number (CSV) or record number (JSON)
    pub errors: BTreeMap<usize, String>,
}

impl ImportResult {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Expenses parsed from a file, before they reach the store
#[derive(Debug, Default)]
struct ParsedBatch {
    expenses: Vec<Expense>,
    errors: BTreeMap<usize, String>,
}

/// Supported import file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
    Yaml,
}

impl ImportFormat {
    /// Guess from the file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Csv,
        }
    }
}

/// Service for importing expenses into an expense store
pub struct ImportService<'s, 'a, P: ExpensePersistence + ?Sized> {
    store: &'s mut ExpenseService<'a, P>,
}

impl<'s, 'a, P: ExpensePersistence + ?Sized> ImportService<'s, 'a, P> {
    pub fn new(store: &'s mut ExpenseService<'a, P>) -> Self {
        Self { store }
    }

    /// Import a CSV export
    pub fn import_csv<R: Read>(&mut self, reader: R) -> ExpenseResult<ImportResult> {
        let batch = parse_csv(reader)?;
        self.commit(batch)
    }

    /// Import a JSON export, keeping the recorded ids
    pub fn import_json(&mut self, json_str: &str) -> ExpenseResult<ImportResult> {
        let export: ExpenseExport =
            serde_json::from_str(json_str).map_err(|e| ExpenseError::Import(e.to_string()))?;
        self.commit(parse_export(&export)?)
    }

    /// Import a YAML export, keeping the recorded ids
    pub fn import_yaml(&mut self, yaml_str: &str) -> ExpenseResult<ImportResult> {
        let export: ExpenseExport =
            serde_yaml::from_str(yaml_str).map_err(|e| ExpenseError::Import(e.to_string()))?;
        self.commit(parse_export(&export)?)
    }

    /// Import a file, choosing the parser from its extension
    pub fn import_file(&mut self, path: &Path) -> ExpenseResult<ImportResult> {
        let format = ImportFormat::from_path(path);
        debug!(path = %path.display(), ?format, "importing file");

        match format {
            ImportFormat::Csv => {
                let file = std::fs::File::open(path)?;
                self.import_csv(file)
            }
            ImportFormat::Json => self.import_json(&std::fs::read_to_string(path)?),
            ImportFormat::Yaml => self.import_yaml(&std::fs::read_to_string(path)?),
        }
    }

    fn commit(&mut self, batch: ParsedBatch) -> ExpenseResult<ImportResult> {
        for (line, message) in &batch.errors {
            warn!(line, %message, "skipping import row");
        }

        let candidates = batch.expenses.len();
        let imported = self.store.add_many(batch.expenses)?;

        Ok(ImportResult {
            imported,
            duplicates_skipped: candidates - imported,
            errors: batch.errors,
        })
    }
}

fn parse_csv<R: Read>(reader: R) -> ExpenseResult<ParsedBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ExpenseError::Import(e.to_string()))?
        .clone();
    let mapping = ColumnMapping::from_headers(&headers)?;

    let mut batch = ParsedBatch::default();
    for (index, record) in csv_reader.records().enumerate() {
        // Header is line 1
        let fallback_line = index + 2;
        match record {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                if record.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }
                match mapping.parse_record(&record) {
                    Ok(expense) => batch.expenses.push(expense),
                    Err(message) => {
                        batch.errors.insert(line, message);
                    }
                }
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                batch.errors.insert(line, e.to_string());
            }
        }
    }

    Ok(batch)
}

fn parse_export(export: &ExpenseExport) -> ExpenseResult<ParsedBatch> {
    export.check_version().map_err(ExpenseError::Import)?;

    let mut batch = ParsedBatch::default();
    for (index, record) in export.expenses.iter().enumerate() {
        match record.to_expense() {
            Ok(expense) => batch.expenses.push(expense),
            Err(message) => {
                batch.errors.insert(index + 1, message);
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_expenses, ExportFormat, ExportOptions};
    use crate::models::{ExpenseCategory, Money};
    use crate::storage::MemoryPersistence;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            Expense::new(Money::from_cents(1250), ExpenseCategory::Food, "Coffee and pastry", date(2025, 8, 15)),
            Expense::new(Money::from_cents(4500), ExpenseCategory::Transportation, "Mario's \"special\" gas", date(2025, 8, 14)),
        ]
    }

    fn exported(format: ExportFormat, expenses: &[Expense]) -> Vec<u8> {
        let mut buffer = Vec::new();
        export_expenses(expenses, format, &mut buffer, &ExportOptions::default()).unwrap();
        buffer
    }

    #[test]
    fn test_header_mapping() {
        let headers = StringRecord::from(vec!["Description", "date", "AMOUNT", "Category"]);
        let mapping = ColumnMapping::from_headers(&headers).unwrap();
        assert_eq!(mapping.description, 0);
        assert_eq!(mapping.date, 1);
        assert_eq!(mapping.amount, 2);
        assert_eq!(mapping.created_at, None);

        let err = ColumnMapping::from_headers(&StringRecord::from(vec!["Date", "Amount"])).unwrap_err();
        assert!(err.to_string().contains("Category, Description"));
    }

    #[test]
    fn test_csv_roundtrip_through_store() {
        let source = sample();
        let csv = exported(ExportFormat::Csv, &source);

        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let result = ImportService::new(&mut store).import_csv(csv.as_slice()).unwrap();

        assert_eq!(result.imported, 2);
        assert!(result.is_clean());
        assert_eq!(persistence.write_count(), 1);

        let imported = store.get_all();
        assert_eq!(imported[1].description, "Mario's \"special\" gas");
        assert_eq!(imported[1].amount, Money::from_cents(4500));
        assert_eq!(imported[0].created_at.timestamp_millis(), source[0].created_at.timestamp_millis());
        // CSV rows carry no id, so they get fresh ones
        assert_ne!(imported[0].id, source[0].id);
    }

    #[test]
    fn test_bad_rows_reported_by_line() {
        let csv = "Date,Amount,Category,Description\n\
                   2025-08-01,12.50,Food,Lunch\n\
                   2025-08-02,-4,Food,Refund\n\
                   08/03/2025,3.00,Snacks,\n\
                   2025-08-04,7.25,bills,Water\n";

        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let result = ImportService::new(&mut store).import_csv(csv.as_bytes()).unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.error_count(), 2);
        assert!(result.errors[&3].contains("positive"));
        let line_four = &result.errors[&4];
        assert!(line_four.contains("date"));
        assert!(line_four.contains("category"));
        assert!(line_four.contains("description"));
        assert_eq!(store.get_all()[1].category, ExpenseCategory::Bills);
    }

    #[test]
    fn test_invalid_created_at_rejects_row() {
        let csv = "Date,Amount,Category,Description,Created At\n\
                   2025-08-01,1.00,Food,Tea,yesterday\n";
        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let result = ImportService::new(&mut store).import_csv(csv.as_bytes()).unwrap();
        assert_eq!(result.imported, 0);
        assert!(result.errors[&2].contains("timestamp"));
        assert_eq!(persistence.write_count(), 0);
    }

    #[test]
    fn test_missing_columns_fail_whole_import() {
        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let err = ImportService::new(&mut store)
            .import_csv("Date,Amount\n2025-08-01,1.00\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ExpenseError::Import(_)));
    }

    #[test]
    fn test_json_keeps_ids_and_skips_duplicates() {
        let source = sample();
        let json = String::from_utf8(exported(ExportFormat::Json, &source)).unwrap();

        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let mut importer = ImportService::new(&mut store);

        let first = importer.import_json(&json).unwrap();
        assert_eq!(first.imported, 2);

        let second = importer.import_json(&json).unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates_skipped, 2);

        assert_eq!(store.get_all(), source.as_slice());
    }

    #[test]
    fn test_json_bad_record_skipped() {
        let json = String::from_utf8(exported(ExportFormat::Json, &sample()))
            .unwrap()
            .replacen("\"amount\": 12.5", "\"amount\": 0.0", 1);

        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let result = ImportService::new(&mut store).import_json(&json).unwrap();
        assert_eq!(result.imported, 1);
        assert!(result.errors.contains_key(&1));
    }

    #[test]
    fn test_import_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&exported(ExportFormat::Yaml, &sample())).unwrap();

        assert_eq!(ImportFormat::from_path(&path), ImportFormat::Yaml);
        assert_eq!(ImportFormat::from_path(Path::new("a.JSON")), ImportFormat::Json);
        assert_eq!(ImportFormat::from_path(Path::new("a.txt")), ImportFormat::Csv);

        let persistence = MemoryPersistence::new();
        let mut store = ExpenseService::load(&persistence);
        let result = ImportService::new(&mut store).import_file(&path).unwrap();
        assert_eq!(result.imported, 2);
    }
}
