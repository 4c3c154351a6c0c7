//! Built-in export templates
//!
//! A template decides the file name of an export and the shape of the payload
//! handed to the (simulated) destination.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{Expense, ExpenseCategory, Money, Month};
use crate::reports::CategoryBreakdown;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [&'static str],
    /// May contain `{year}`, `{month}`, `{dateRange}`, `{timestamp}`, `{period}`
    pub default_filename: &'static str,
    pub target_audience: &'static str,
}

pub const TEMPLATES: [ExportTemplate; 5] = [
    ExportTemplate {
        id: "tax-report",
        name: "Tax Report",
        description: "Detailed report for tax filing with categorized deductions",
        fields: &["date", "amount", "category", "description", "taxDeductible"],
        default_filename: "tax-report-{year}",
        target_audience: "Accountants & Tax Professionals",
    },
    ExportTemplate {
        id: "monthly-summary",
        name: "Monthly Summary",
        description: "Executive summary with key metrics and trends",
        fields: &["monthlyTotals", "categoryBreakdown", "trends"],
        default_filename: "monthly-summary-{month}-{year}",
        target_audience: "Management & Finance Teams",
    },
    ExportTemplate {
        id: "category-analysis",
        name: "Category Analysis",
        description: "Deep dive into spending patterns by category",
        fields: &["categoryTotals", "percentages", "trends", "recommendations"],
        default_filename: "category-analysis-{dateRange}",
        target_audience: "Budget Analysts",
    },
    ExportTemplate {
        id: "receipt-backup",
        name: "Receipt Backup",
        description: "Complete transaction log for backup and compliance",
        fields: &["all"],
        default_filename: "expense-backup-{timestamp}",
        target_audience: "Compliance & Audit",
    },
    ExportTemplate {
        id: "personal-budget",
        name: "Personal Budget Review",
        description: "Personal finance overview with insights",
        fields: &["simplified", "insights", "goals"],
        default_filename: "budget-review-{period}",
        target_audience: "Personal Use",
    },
];

pub fn templates() -> &'static [ExportTemplate] {
    &TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static ExportTemplate> {
    TEMPLATES.iter().find(|t| t.id.eq_ignore_ascii_case(id.trim()))
}

impl ExportTemplate {
    /// Expand the filename pattern
    pub fn filename(&self, expenses: &[Expense], now: DateTime<Utc>) -> String {
        let date_range = match (
            expenses.iter().map(|e| e.date).min(),
            expenses.iter().map(|e| e.date).max(),
        ) {
            (Some(first), Some(last)) => format!("{}_{}", first, last),
            _ => "all".to_string(),
        };

        self.default_filename
            .replace("{year}", &now.year().to_string())
            .replace("{month}", &format!("{:02}", now.month()))
            .replace("{dateRange}", &date_range)
            .replace("{timestamp}", &now.format("%Y%m%d%H%M%S").to_string())
            .replace("{period}", &Month::of(now.date_naive()).to_string())
    }

    /// Build the payload this template delivers
    pub fn build_payload(&self, expenses: &[Expense], today: NaiveDate) -> Value {
        let breakdown = CategoryBreakdown::from_expenses(expenses);
        let total = breakdown.total();

        match self.id {
            "tax-report" => {
                let deductible: Money = breakdown
                    .rows()
                    .iter()
                    .filter(|row| row.category.is_tax_deductible())
                    .map(|row| row.total)
                    .sum();
                json!({
                    "summary": {
                        "totalAmount": total.as_f64(),
                        "totalDeductions": deductible.as_f64(),
                        "recordCount": expenses.len(),
                        "taxYear": today.year(),
                    },
                    "byCategory": breakdown.rows().iter().map(|row| json!({
                        "category": row.category,
                        "amount": row.total.as_f64(),
                        "percentage": row.percentage,
                        "deductible": row.category.is_tax_deductible(),
                    })).collect::<Vec<_>>(),
                    "transactions": expenses,
                })
            }
            "monthly-summary" => {
                let breakdown_map: serde_json::Map<String, Value> = breakdown
                    .rows()
                    .iter()
                    .map(|row| (row.category.to_string(), json!(row.total.as_f64())))
                    .collect();
                json!({
                    "period": {
                        "start": expenses.iter().map(|e| e.date).min(),
                        "end": expenses.iter().map(|e| e.date).max(),
                    },
                    "metrics": {
                        "totalSpent": total.as_f64(),
                        "averageTransaction": total.average_over(expenses.len()).as_f64(),
                        "transactionCount": expenses.len(),
                    },
                    "breakdown": breakdown_map,
                })
            }
            "category-analysis" => {
                let this_month = Month::of(today);
                let last_month = this_month.prev();
                let month_total = |month: Month, category: ExpenseCategory| -> Money {
                    expenses
                        .iter()
                        .filter(|e| e.category == category && month.contains(e.date))
                        .map(|e| e.amount)
                        .sum()
                };

                let insights: Vec<Value> = breakdown
                    .ranked()
                    .iter()
                    .enumerate()
                    .map(|(index, row)| {
                        let current = month_total(this_month, row.category);
                        let previous = month_total(last_month, row.category);
                        let trend = match current.cmp(&previous) {
                            std::cmp::Ordering::Greater => "increasing",
                            std::cmp::Ordering::Less => "decreasing",
                            std::cmp::Ordering::Equal => "steady",
                        };
                        json!({
                            "rank": index + 1,
                            "category": row.category,
                            "amount": row.total.as_f64(),
                            "percentage": row.percentage,
                            "trend": trend,
                        })
                    })
                    .collect();
                json!({ "insights": insights })
            }
            _ => json!({
                "expenses": expenses,
                "summary": {
                    "total": total.as_f64(),
                    "count": expenses.len(),
                },
            }),
        }
    }
}
