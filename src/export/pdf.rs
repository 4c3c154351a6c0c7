//! PDF Export functionality
//!
//! A small PDF 1.4 writer: A4 pages, the three standard Type1 fonts and a
//! handful of drawing operators. Enough for a tabular report, nothing more.
//!
//! Object layout:
//!
//! ```text
//! 1        Catalog
//! 2        Pages
//! 3..=5    Fonts (Helvetica, Helvetica-Bold, Courier)
//! 6 + 2i   Page i
//! 7 + 2i   Content stream of page i
//! ```

use std::io::Write;

use super::ExportOptions;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, Money};
use crate::reports::CategoryBreakdown;

/// A4 portrait, in points
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 50.0;

/// Descriptions longer than this are cut and suffixed with "..."
pub const DESCRIPTION_DISPLAY_LEN: usize = 40;

const FIRST_PAGE_OBJECT: usize = 6;
const FOOTER_Y: f64 = 30.0;
const ROW_HEIGHT: f64 = 16.0;
const TABLE_FONT_SIZE: f64 = 10.0;
/// Courier glyphs are 600/1000 em wide
const MONO_CHAR_WIDTH: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Mono => "F3",
        }
    }
}

/// Pages of drawing operators waiting to be serialized
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pages: Vec<String>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// A document with one blank page
    pub fn new() -> Self {
        Self {
            pages: vec![String::new()],
        }
    }

    /// Append a page and return its index
    pub fn add_page(&mut self) -> usize {
        self.pages.push(String::new());
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Draw text with its baseline starting at (x, y)
    pub fn text(&mut self, page: usize, x: f64, y: f64, font: Font, size: f64, text: &str) {
        if let Some(content) = self.pages.get_mut(page) {
            content.push_str(&format!(
                "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET\n",
                font.resource(),
                size,
                x,
                y,
                escape_text(text)
            ));
        }
    }

    /// Monospaced text whose right edge ends at `right`
    pub fn text_right(&mut self, page: usize, right: f64, y: f64, size: f64, text: &str) {
        let width = text.chars().count() as f64 * size * MONO_CHAR_WIDTH;
        self.text(page, right - width, y, Font::Mono, size, text);
    }

    pub fn line(&mut self, page: usize, x1: f64, y1: f64, x2: f64, y2: f64) {
        if let Some(content) = self.pages.get_mut(page) {
            content.push_str(&format!(
                "0.5 w {:.2} {:.2} m {:.2} {:.2} l S\n",
                x1, y1, x2, y2
            ));
        }
    }

    /// Gray-filled rectangle; `gray` 0.0 is black, 1.0 white
    pub fn fill_rect(&mut self, page: usize, x: f64, y: f64, width: f64, height: f64, gray: f64) {
        if let Some(content) = self.pages.get_mut(page) {
            content.push_str(&format!(
                "q {:.2} g {:.2} {:.2} {:.2} {:.2} re f Q\n",
                gray.clamp(0.0, 1.0),
                x,
                y,
                width,
                height
            ));
        }
    }

    /// Serialize the document
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * i))
            .collect();

        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            ),
        ];
        for base_font in ["Helvetica", "Helvetica-Bold", "Courier"] {
            objects.push(format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                base_font
            ));
        }
        for (i, content) in self.pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R /F3 5 0 R >> >> \
                 /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                FIRST_PAGE_OBJECT + 2 * i + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        writer.write_all(&out)
    }
}

/// Escape a string for a PDF literal
///
/// Latin-1 characters and the euro sign map onto WinAnsi codes; anything
/// else outside ASCII becomes '?'.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '€' => escaped.push_str("\\200"),
            ' '..='~' => escaped.push(c),
            '\u{a0}'..='\u{ff}' => escaped.push_str(&format!("\\{:03o}", c as u32)),
            _ => escaped.push('?'),
        }
    }
    escaped
}

/// Cut a description to the display width
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_DISPLAY_LEN {
        let cut: String = description.chars().take(DESCRIPTION_DISPLAY_LEN).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

/// A table column: left edge and whether the cell is right-aligned money/numbers
struct Column {
    title: &'static str,
    x: f64,
    right: Option<f64>,
}

/// Top-down layout cursor that starts new pages as needed
struct Layout {
    doc: PdfDocument,
    y: f64,
}

impl Layout {
    fn new() -> Self {
        Self {
            doc: PdfDocument::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn page(&self) -> usize {
        self.doc.page_count() - 1
    }

    /// Start a new page unless `height` still fits above the bottom margin
    fn ensure_space(&mut self, height: f64) -> bool {
        if self.y - height < MARGIN {
            self.doc.add_page();
            self.y = PAGE_HEIGHT - MARGIN;
            return true;
        }
        false
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space(22.0 + 2.0 * ROW_HEIGHT);
        self.y -= 18.0;
        let page = self.page();
        self.doc.text(page, MARGIN, self.y, Font::Bold, 14.0, text);
        self.y -= 8.0;
    }

    fn table_header(&mut self, columns: &[Column]) {
        self.y -= ROW_HEIGHT;
        let page = self.page();
        self.doc.fill_rect(
            page,
            MARGIN,
            self.y - 4.0,
            PAGE_WIDTH - 2.0 * MARGIN,
            ROW_HEIGHT,
            0.85,
        );
        for column in columns {
            self.doc
                .text(page, column.x + 2.0, self.y, Font::Bold, TABLE_FONT_SIZE, column.title);
        }
    }

    /// Draw a row, repeating the header on a fresh page
    fn table_row(&mut self, columns: &[Column], cells: &[String]) {
        if self.ensure_space(ROW_HEIGHT + 4.0) {
            self.table_header(columns);
        }
        self.y -= ROW_HEIGHT;
        let page = self.page();
        for (column, cell) in columns.iter().zip(cells) {
            match column.right {
                Some(right) => self.doc.text_right(page, right, self.y, TABLE_FONT_SIZE, cell),
                None => self.doc.text(
                    page,
                    column.x + 2.0,
                    self.y,
                    Font::Regular,
                    TABLE_FONT_SIZE,
                    cell,
                ),
            }
        }
        self.doc.line(
            page,
            MARGIN,
            self.y - 4.0,
            PAGE_WIDTH - MARGIN,
            self.y - 4.0,
        );
    }

    fn finish(mut self) -> PdfDocument {
        let total = self.doc.page_count();
        for page in 0..total {
            let label = format!("Page {} of {}", page + 1, total);
            self.doc
                .text(page, PAGE_WIDTH / 2.0 - 30.0, FOOTER_Y, Font::Regular, 9.0, &label);
        }
        self.doc
    }
}

/// Lay out the expense report
pub fn render_expense_report(expenses: &[Expense], options: &ExportOptions) -> PdfDocument {
    let money = |amount: Money| amount.format_with_symbol(&options.currency_symbol);
    let breakdown = CategoryBreakdown::from_expenses(expenses);
    let mut layout = Layout::new();

    let page = layout.page();
    layout.y -= 20.0;
    layout
        .doc
        .text(page, MARGIN, layout.y, Font::Bold, 20.0, "Expense Report");
    for line in [
        format!(
            "Generated on: {}",
            options.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        format!("Total Records: {}", expenses.len()),
        format!("Total Amount: {}", money(breakdown.total())),
    ] {
        layout.y -= 14.0;
        layout
            .doc
            .text(page, MARGIN, layout.y, Font::Regular, 10.0, &line);
    }
    layout.y -= 10.0;

    if !breakdown.is_empty() {
        let columns = [
            Column { title: "Category", x: MARGIN, right: None },
            Column { title: "Count", x: 220.0, right: Some(270.0) },
            Column { title: "Total Amount", x: 300.0, right: Some(400.0) },
            Column { title: "Percentage", x: 430.0, right: Some(PAGE_WIDTH - MARGIN - 4.0) },
        ];
        layout.heading("Summary by Category");
        layout.table_header(&columns);
        for row in breakdown.rows() {
            layout.table_row(
                &columns,
                &[
                    row.category.to_string(),
                    row.count.to_string(),
                    money(row.total),
                    format!("{:.1}%", row.percentage),
                ],
            );
        }
        layout.y -= 10.0;
    }

    let columns = [
        Column { title: "Date", x: MARGIN, right: None },
        Column { title: "Amount", x: 130.0, right: Some(200.0) },
        Column { title: "Category", x: 215.0, right: None },
        Column { title: "Description", x: 310.0, right: None },
    ];
    layout.heading("Detailed Expenses");
    layout.table_header(&columns);
    for expense in expenses {
        layout.table_row(
            &columns,
            &[
                expense.date.to_string(),
                money(expense.amount),
                expense.category.to_string(),
                truncate_description(&expense.description),
            ],
        );
    }

    layout.finish()
}

/// Export expenses to a PDF report
pub fn export_expenses_pdf<W: Write>(
    expenses: &[Expense],
    writer: &mut W,
    options: &ExportOptions,
) -> ExpenseResult<()> {
    render_expense_report(expenses, options)
        .write_to(writer)
        .map_err(|e| ExpenseError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseCategory;
    use chrono::NaiveDate;

    fn expenses(count: usize) -> Vec<Expense> {
        (0..count)
            .map(|i| {
                Expense::new(
                    Money::from_cents(100 + i as i64),
                    ExpenseCategory::ALL[i % 6],
                    format!("Expense number {}", i),
                    NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                )
            })
            .collect()
    }

    fn render(expenses: &[Expense]) -> Vec<u8> {
        let mut buffer = Vec::new();
        export_expenses_pdf(expenses, &mut buffer, &ExportOptions::default()).unwrap();
        buffer
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_framing() {
        let bytes = render(&expenses(3));
        let text = as_text(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Expense Report)"));
        assert!(text.contains("(Summary by Category)"));
        assert!(text.contains("(Detailed Expenses)"));
        assert!(text.contains("(Page 1 of 1)"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render(&expenses(2));
        // Byte offsets are only meaningful on the raw bytes, not on lossy text
        let tail = as_text(&bytes[bytes.len() - 40..]);
        let startxref = tail.rfind("startxref\n").unwrap() + "startxref\n".len();
        let xref_offset: usize = tail[startxref..].lines().next().unwrap().parse().unwrap();

        let xref = std::str::from_utf8(&bytes[xref_offset..]).unwrap();
        assert!(xref.starts_with("xref\n0 8\n"));

        let entries: Vec<&str> = xref.lines().skip(3).take(7).collect();
        assert_eq!(entries.len(), 7);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.len() + 1, 20);
            let offset: usize = entry[..10].parse().unwrap();
            assert!(bytes[offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }

    #[test]
    fn test_paginates() {
        let text = as_text(&render(&expenses(120)));
        assert!(text.contains("(Page 1 of "));
        assert!(!text.contains("(Page 1 of 1)"));
        let count: usize = text
            .split("/Count ")
            .nth(1)
            .and_then(|rest| rest.split(' ').next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(count >= 3);
        assert!(text.contains(&format!("(Page {} of {})", count, count)));
    }

    #[test]
    fn test_empty_report_has_one_page() {
        let text = as_text(&render(&[]));
        assert!(text.contains("(Page 1 of 1)"));
        assert!(text.contains("(Total Records: 0)"));
        assert!(!text.contains("(Summary by Category)"));
    }

    #[test]
    fn test_truncate_description() {
        let long = "a".repeat(45);
        assert_eq!(truncate_description(&long), format!("{}...", "a".repeat(40)));
        assert_eq!(truncate_description("short"), "short");
        assert_eq!(truncate_description(&"b".repeat(40)), "b".repeat(40));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a (b) \\ c"), "a \\(b\\) \\\\ c");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("€5"), "\\2005");
        assert_eq!(escape_text("日本"), "??");
    }
}
