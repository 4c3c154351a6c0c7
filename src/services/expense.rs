//! Expense service
//!
//! Owns the canonical in-memory collection for a session. Every mutation
//! updates the collection first and then mirrors the whole collection to the
//! persistence layer; a failed save never undoes or fails the mutation.

use chrono::NaiveDate;
use tracing::debug;

use super::filter::ExpenseFilter;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseDraft, ExpenseId};
use crate::reports::DashboardReport;
use crate::storage::ExpensePersistence;

/// Service for expense management
pub struct ExpenseService<'a, P: ExpensePersistence + ?Sized> {
    persistence: &'a P,
    expenses: Vec<Expense>,
}

impl<'a, P: ExpensePersistence + ?Sized> ExpenseService<'a, P> {
    /// Read the collection once from `persistence`
    pub fn load(persistence: &'a P) -> Self {
        let expenses = persistence.load();
        debug!(count = expenses.len(), "expense store loaded");
        Self {
            persistence,
            expenses,
        }
    }

    fn persist(&self) {
        self.persistence.save(&self.expenses);
    }

    /// Append a fully-formed expense
    pub fn add(&mut self, expense: Expense) -> ExpenseResult<()> {
        expense.validate()?;
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(ExpenseError::Duplicate {
                entity_type: "Expense",
                identifier: expense.id.to_string(),
            });
        }

        debug!(id = %expense.id, amount = %expense.amount, "adding expense");
        self.expenses.push(expense);
        self.persist();
        Ok(())
    }

    /// Validate raw form input and add the resulting expense
    pub fn create(&mut self, draft: ExpenseDraft) -> ExpenseResult<Expense> {
        let expense = draft.into_expense()?;
        self.add(expense.clone())?;
        Ok(expense)
    }

    /// Replace the entry with the same id
    ///
    /// The stored `created_at` is kept. Returns `false` (and saves nothing)
    /// when no entry matches.
    pub fn update(&mut self, expense: Expense) -> ExpenseResult<bool> {
        expense.validate()?;
        let Some(slot) = self.expenses.iter_mut().find(|e| e.id == expense.id) else {
            debug!(id = %expense.id, "update skipped, no such expense");
            return Ok(false);
        };

        let created_at = slot.created_at;
        *slot = Expense {
            created_at,
            ..expense
        };
        debug!(id = %slot.id, "updated expense");
        self.persist();
        Ok(true)
    }

    /// Apply a draft to an existing expense
    pub fn edit(&mut self, id: ExpenseId, draft: &ExpenseDraft) -> ExpenseResult<Expense> {
        let existing = self
            .get(id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.to_string()))?;
        let updated = draft.apply_to(existing)?;
        self.update(updated.clone())?;
        Ok(updated)
    }

    /// Remove the entry with this id; `false` when absent
    pub fn delete(&mut self, id: ExpenseId) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() == before {
            debug!(%id, "delete skipped, no such expense");
            return false;
        }

        debug!(%id, "deleted expense");
        self.persist();
        true
    }

    /// Append many expenses with a single save, skipping ids already present
    ///
    /// Returns how many were added.
    pub fn add_many(&mut self, expenses: impl IntoIterator<Item = Expense>) -> ExpenseResult<usize> {
        let mut added = 0;
        for expense in expenses {
            expense.validate()?;
            if self.expenses.iter().any(|e| e.id == expense.id) {
                debug!(id = %expense.id, "skipping duplicate expense");
                continue;
            }
            self.expenses.push(expense);
            added += 1;
        }

        if added > 0 {
            debug!(added, "bulk add");
            self.persist();
        }
        Ok(added)
    }

    /// The live collection in insertion order
    pub fn get_all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Look up by full id, short display id or id prefix
    pub fn find(&self, identifier: &str) -> ExpenseResult<&Expense> {
        let matches: Vec<&Expense> = self
            .expenses
            .iter()
            .filter(|e| e.id.matches_identifier(identifier))
            .collect();

        match matches.as_slice() {
            [expense] => Ok(expense),
            [] => Err(ExpenseError::expense_not_found(identifier)),
            _ => Err(ExpenseError::Validation(format!(
                "'{}' matches {} expenses, use a longer id",
                identifier,
                matches.len()
            ))),
        }
    }

    pub fn filtered(&self, filter: &ExpenseFilter) -> Vec<Expense> {
        filter.apply(&self.expenses)
    }

    /// Dashboard over the whole collection
    pub fn dashboard(&self, as_of: NaiveDate) -> DashboardReport {
        DashboardReport::generate(&self.expenses, as_of)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Money};
    use crate::storage::{ExpenseRepository, MemoryPersistence};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(cents: i64, description: &str) -> Expense {
        Expense::new(
            Money::from_cents(cents),
            ExpenseCategory::Food,
            description,
            date(2025, 8, 1),
        )
    }

    #[test]
    fn test_add_persists() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);

        let lunch = expense(1575, "Lunch at restaurant");
        service.add(lunch.clone()).unwrap();

        assert_eq!(service.get_all(), std::slice::from_ref(&lunch));
        assert_eq!(persistence.load(), vec![lunch]);
        assert_eq!(persistence.write_count(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_and_duplicates() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);

        assert!(service.add(expense(0, "Free lunch")).unwrap_err().is_validation());
        assert!(service.add(expense(100, "   ")).is_err());

        let gum = expense(100, "Gum");
        service.add(gum.clone()).unwrap();
        let err = service.add(gum).unwrap_err();
        assert!(matches!(err, ExpenseError::Duplicate { .. }));
        assert_eq!(service.len(), 1);
        assert_eq!(persistence.write_count(), 1);
    }

    #[test]
    fn test_create_from_draft() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);

        let created = service
            .create(ExpenseDraft::new("12.50", "Food", "Coffee and pastry", "2025-08-15"))
            .unwrap();
        assert_eq!(created.amount.cents(), 1250);
        assert_eq!(service.get(created.id), Some(&created));

        let err = service
            .create(ExpenseDraft::new("-1", "Snacks", "", "yesterday"))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_update_keeps_created_at() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        let original = expense(1000, "Lunch");
        service.add(original.clone()).unwrap();

        let mut changed = original.clone();
        changed.amount = Money::from_cents(2000);
        changed.description = "Dinner".to_string();
        changed.created_at = chrono::Utc::now() + chrono::Duration::days(1);

        assert!(service.update(changed).unwrap());
        let stored = service.get(original.id).unwrap();
        assert_eq!(stored.amount.cents(), 2000);
        assert_eq!(stored.description, "Dinner");
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(persistence.write_count(), 2);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        service.add(expense(1000, "Lunch")).unwrap();

        assert!(!service.update(expense(500, "Ghost")).unwrap());
        assert_eq!(service.len(), 1);
        assert_eq!(persistence.write_count(), 1);
    }

    #[test]
    fn test_edit_with_draft() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        let original = expense(1000, "Lunch");
        service.add(original.clone()).unwrap();

        let draft = ExpenseDraft::new("11.00", "Bills", "Phone", "2025-08-02");
        let updated = service.edit(original.id, &draft).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.category, ExpenseCategory::Bills);
        assert_eq!(service.get(original.id).unwrap().date, date(2025, 8, 2));

        assert!(service
            .edit(ExpenseId::new(), &draft)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        let keep = expense(1000, "Keep");
        let drop = expense(2000, "Drop");
        service.add(keep.clone()).unwrap();
        service.add(drop.clone()).unwrap();

        assert!(service.delete(drop.id));
        assert_eq!(service.get_all(), std::slice::from_ref(&keep));
        assert_eq!(persistence.write_count(), 3);

        assert!(!service.delete(drop.id));
        assert_eq!(persistence.write_count(), 3);
        assert_eq!(persistence.load(), vec![keep]);
    }

    #[test]
    fn test_add_many_single_save() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        let first = expense(100, "A");
        service.add(first.clone()).unwrap();

        let added = service
            .add_many(vec![first, expense(200, "B"), expense(300, "C")])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(service.len(), 3);
        assert_eq!(persistence.write_count(), 2);
    }

    #[test]
    fn test_find_by_short_id() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        let lunch = expense(1000, "Lunch");
        service.add(lunch.clone()).unwrap();

        assert_eq!(service.find(&lunch.id.to_string()).unwrap().id, lunch.id);
        assert_eq!(
            service.find(&lunch.id.as_uuid().to_string()).unwrap().id,
            lunch.id
        );
        assert!(service.find("exp-zzzzzzzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reload_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));

        let lunch = expense(1000, "Lunch");
        {
            let mut service = ExpenseService::load(&repo);
            service.add(lunch.clone()).unwrap();
        }

        let service = ExpenseService::load(&repo);
        assert_eq!(service.get_all(), &[lunch]);
    }

    #[test]
    fn test_mutations_survive_failed_saves() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let repo = ExpenseRepository::new(blocker.join("expenses.json"));

        let mut service = ExpenseService::load(&repo);
        service.add(expense(1000, "Lunch")).unwrap();
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_dashboard_and_filter() {
        let persistence = MemoryPersistence::new();
        let mut service = ExpenseService::load(&persistence);
        service.add(expense(1000, "Lunch")).unwrap();
        service.add(expense(2000, "Dinner")).unwrap();

        let report = service.dashboard(date(2025, 8, 15));
        assert_eq!(report.monthly_spending.cents(), 3000);

        let filtered = service.filtered(&ExpenseFilter::new().search("din"));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_trait_object_persistence() {
        let persistence = MemoryPersistence::new();
        let dynamic: &dyn ExpensePersistence = &persistence;
        let mut service = ExpenseService::load(dynamic);
        service.add(expense(1000, "Lunch")).unwrap();
        assert_eq!(persistence.write_count(), 1);
    }
}
