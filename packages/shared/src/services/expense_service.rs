use async_trait::async_trait;
use chrono::Local;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::models::expense::{CreateExpensePayload, Expense, UpdateExpensePayload};
use crate::models::month::ReportingMonth;
use crate::models::salary::{Salary, SalaryPayload};
use crate::repositories::errors::api_client_errors::ApiClientError;
use crate::repositories::expense_repository::ExpenseRepository;
use crate::repositories::salary_repository::SalaryRepository;
use crate::services::context::ContextRefresh;
use crate::services::errors::ledger_service_errors::LedgerError;
use crate::services::ledger_views::{self, MonthTotals};

/// Cached expenses and salaries plus the reporting cursor they are viewed by.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerState {
    pub expenses: Vec<Expense>,
    pub salaries: Vec<Salary>,
    pub selected_month: ReportingMonth,
    pub expenses_loaded: bool,
    pub salaries_loaded: bool,
    pub loading_expenses: bool,
    pub loading_salaries: bool,
    /// Last failed expense read. Cleared only by the next expense fetch.
    pub expenses_error: Option<String>,
    /// Last failed salary read. Cleared only by the next salary fetch.
    pub salaries_error: Option<String>,
    /// Last failed write.
    pub error: Option<String>,
}

impl LedgerState {
    pub fn new(selected_month: ReportingMonth) -> Self {
        Self {
            expenses: Vec::new(),
            salaries: Vec::new(),
            selected_month,
            expenses_loaded: false,
            salaries_loaded: false,
            loading_expenses: false,
            loading_salaries: false,
            expenses_error: None,
            salaries_error: None,
            error: None,
        }
    }

    /// The first read failure still on record, expenses before salaries.
    pub fn fetch_error(&self) -> Option<&str> {
        self.expenses_error
            .as_deref()
            .or(self.salaries_error.as_deref())
    }
}

struct LedgerInner {
    state: LedgerState,
    // bumped on forced refresh and reset; a fetch that resolves under an
    // older generation is dropped
    expense_generation: u64,
    salary_generation: u64,
}

/// Expense and salary ledger for the active household.
pub struct ExpenseLedger {
    expense_repository: Arc<dyn ExpenseRepository>,
    salary_repository: Arc<dyn SalaryRepository>,
    inner: Mutex<LedgerInner>,
}

impl ExpenseLedger {
    pub fn new(
        expense_repository: Arc<dyn ExpenseRepository>,
        salary_repository: Arc<dyn SalaryRepository>,
    ) -> Self {
        Self::with_month(
            expense_repository,
            salary_repository,
            ReportingMonth::current(),
        )
    }

    pub fn with_month(
        expense_repository: Arc<dyn ExpenseRepository>,
        salary_repository: Arc<dyn SalaryRepository>,
        selected_month: ReportingMonth,
    ) -> Self {
        ExpenseLedger {
            expense_repository,
            salary_repository,
            inner: Mutex::new(LedgerInner {
                state: LedgerState::new(selected_month),
                expense_generation: 0,
                salary_generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> LedgerState {
        self.lock().state.clone()
    }

    fn record_failure(&self, context: &str, err: &ApiClientError) {
        let message = format!("{}: {}", context, err.user_message());
        error!("{}", message);
        self.lock().state.error = Some(message);
    }

    /// Loads all expenses once. Later calls are no-ops unless `force` is set;
    /// calls made while a load is in flight are dropped.
    pub async fn fetch_expenses(&self, force: bool) {
        let generation = {
            let mut inner = self.lock();
            if !force && (inner.state.loading_expenses || inner.state.expenses_loaded) {
                debug!("Skipping expense fetch, already cached or in flight");
                return;
            }
            if force {
                inner.expense_generation += 1;
            }
            inner.state.loading_expenses = true;
            inner.state.expenses_error = None;
            inner.expense_generation
        };

        let result = self.expense_repository.list_expenses().await;

        let mut inner = self.lock();
        if inner.expense_generation != generation {
            debug!("Discarding superseded expense fetch");
            return;
        }
        inner.state.loading_expenses = false;
        match result {
            Ok(expenses) => {
                debug!("Loaded {} expenses", expenses.len());
                inner.state.expenses = expenses;
                inner.state.expenses_loaded = true;
            }
            Err(e) => {
                let message = format!("Failed to fetch expenses: {}", e.user_message());
                error!("{}", message);
                inner.state.expenses_error = Some(message);
            }
        }
    }

    pub async fn add_expense(&self, payload: CreateExpensePayload) -> Result<Expense, LedgerError> {
        if payload.value <= Decimal::ZERO {
            return Err(LedgerError::ValidationError(
                "Expense value must be greater than zero".to_string(),
            ));
        }
        if payload.category_id.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "Expense category cannot be empty".to_string(),
            ));
        }
        if payload.installments == 0 {
            return Err(LedgerError::ValidationError(
                "Installments must be at least 1".to_string(),
            ));
        }

        self.lock().state.error = None;
        match self.expense_repository.create_expense(&payload).await {
            Ok(expense) => {
                info!("Added expense {} on {}", expense.id, expense.date);
                self.lock().state.expenses.push(expense.clone());
                Ok(expense)
            }
            Err(e) => {
                self.record_failure("Failed to add expense", &e);
                Err(LedgerError::from(e))
            }
        }
    }

    pub async fn update_expense(
        &self,
        expense_id: &str,
        payload: UpdateExpensePayload,
    ) -> Result<(), LedgerError> {
        if expense_id.is_empty() {
            return Err(LedgerError::ValidationError(
                "Expense ID cannot be empty".to_string(),
            ));
        }

        self.lock().state.error = None;
        if let Err(e) = self
            .expense_repository
            .update_expense(expense_id, &payload)
            .await
        {
            self.record_failure("Failed to update expense", &e);
            return Err(LedgerError::from(e));
        }

        let mut inner = self.lock();
        match inner
            .state
            .expenses
            .iter_mut()
            .find(|expense| expense.id == expense_id)
        {
            Some(expense) => payload.apply_to(expense),
            None => warn!("Updated expense {} is not cached", expense_id),
        }
        info!("Updated expense {}", expense_id);
        Ok(())
    }

    pub async fn set_expense_paid(&self, expense_id: &str, paid: bool) -> Result<(), LedgerError> {
        self.update_expense(expense_id, UpdateExpensePayload::mark_paid(paid))
            .await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<(), LedgerError> {
        if expense_id.is_empty() {
            return Err(LedgerError::ValidationError(
                "Expense ID cannot be empty".to_string(),
            ));
        }

        self.lock().state.error = None;
        if let Err(e) = self.expense_repository.delete_expense(expense_id).await {
            self.record_failure("Failed to delete expense", &e);
            return Err(LedgerError::from(e));
        }

        self.lock()
            .state
            .expenses
            .retain(|expense| expense.id != expense_id);
        info!("Deleted expense {}", expense_id);
        Ok(())
    }

    /// Same caching rules as [`ExpenseLedger::fetch_expenses`].
    pub async fn fetch_salary(&self, force: bool) {
        let generation = {
            let mut inner = self.lock();
            if !force && (inner.state.loading_salaries || inner.state.salaries_loaded) {
                debug!("Skipping salary fetch, already cached or in flight");
                return;
            }
            if force {
                inner.salary_generation += 1;
            }
            inner.state.loading_salaries = true;
            inner.state.salaries_error = None;
            inner.salary_generation
        };

        let result = self.salary_repository.list_salaries().await;

        let mut inner = self.lock();
        if inner.salary_generation != generation {
            debug!("Discarding superseded salary fetch");
            return;
        }
        inner.state.loading_salaries = false;
        match result {
            Ok(salaries) => {
                debug!("Loaded {} salaries", salaries.len());
                inner.state.salaries = salaries;
                inner.state.salaries_loaded = true;
            }
            Err(e) => {
                let message = format!("Failed to fetch salary: {}", e.user_message());
                error!("{}", message);
                inner.state.salaries_error = Some(message);
            }
        }
    }

    /// Records the salary of the selected month, dated on its first day.
    pub async fn set_salary(&self, value: Decimal) -> Result<Salary, LedgerError> {
        if value < Decimal::ZERO {
            return Err(LedgerError::ValidationError(
                "Salary cannot be negative".to_string(),
            ));
        }

        let payload = {
            let mut inner = self.lock();
            inner.state.error = None;
            SalaryPayload {
                value,
                date: inner.state.selected_month.first_day(),
            }
        };

        match self.salary_repository.upsert_salary(&payload).await {
            Ok(salary) => {
                info!("Salary for {} set to {}", salary.date, salary.value);
                let month = ReportingMonth::from_date(salary.date);
                let mut inner = self.lock();
                inner
                    .state
                    .salaries
                    .retain(|existing| !month.contains(existing.date));
                inner.state.salaries.push(salary.clone());
                Ok(salary)
            }
            Err(e) => {
                self.record_failure("Failed to update salary", &e);
                Err(LedgerError::from(e))
            }
        }
    }

    pub fn selected_month(&self) -> ReportingMonth {
        self.lock().state.selected_month
    }

    pub fn set_selected_month(&self, month: ReportingMonth) {
        self.lock().state.selected_month = month;
    }

    pub fn next_month(&self) -> ReportingMonth {
        let mut inner = self.lock();
        inner.state.selected_month = inner.state.selected_month.next();
        inner.state.selected_month
    }

    pub fn previous_month(&self) -> ReportingMonth {
        let mut inner = self.lock();
        inner.state.selected_month = inner.state.selected_month.previous();
        inner.state.selected_month
    }

    pub fn expenses_for_selected_month(&self) -> Vec<Expense> {
        let inner = self.lock();
        ledger_views::expenses_for_selected_month(&inner.state)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn totals_for_selected_month(&self) -> MonthTotals {
        ledger_views::totals_for_selected_month(&self.lock().state)
    }

    pub fn average_expense(&self) -> Decimal {
        let today = Local::now().date_naive();
        ledger_views::average_expense(&self.lock().state, today)
    }

    pub fn salary_for_selected_month(&self) -> Decimal {
        ledger_views::salary_for_selected_month(&self.lock().state)
    }
}

#[async_trait]
impl ContextRefresh for ExpenseLedger {
    async fn refresh_context(&self) {
        self.fetch_expenses(true).await;
        self.fetch_salary(true).await;
    }

    fn reset(&self) {
        let mut inner = self.lock();
        let month = inner.state.selected_month;
        inner.state = LedgerState::new(month);
        inner.expense_generation += 1;
        inner.salary_generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::expense_repository::MockExpenseRepository;
    use crate::repositories::salary_repository::MockSalaryRepository;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn january() -> ReportingMonth {
        ReportingMonth::new(2025, 1).unwrap()
    }

    fn expense(id: &str, value: i64, day: NaiveDate, paid: bool) -> Expense {
        Expense {
            id: id.to_string(),
            category_id: "1".to_string(),
            value: Decimal::from(value),
            date: day,
            payment_method: "DEBIT".to_string(),
            card: None,
            installments: 1,
            paid,
            description: format!("expense {}", id),
        }
    }

    fn create_payload(value: i64) -> CreateExpensePayload {
        CreateExpensePayload {
            category_id: "1".to_string(),
            value: Decimal::from(value),
            date: date(2025, 1, 12),
            payment_method: "DEBIT".to_string(),
            card: None,
            installments: 1,
            paid: false,
            description: "Lunch".to_string(),
        }
    }

    fn ledger(expenses: MockExpenseRepository, salaries: MockSalaryRepository) -> ExpenseLedger {
        ExpenseLedger::with_month(Arc::new(expenses), Arc::new(salaries), january())
    }

    #[tokio::test]
    async fn test_fetch_expenses_twice_calls_backend_once() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .times(1)
            .returning(|| Ok(vec![expense("1", 10, date(2025, 1, 2), false)]));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        ledger.fetch_expenses(false).await;

        let state = ledger.state();
        assert!(state.expenses_loaded);
        assert_eq!(state.expenses.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_still_counts_as_cached() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .times(1)
            .returning(|| Ok(Vec::new()));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        ledger.fetch_expenses(false).await;

        assert!(ledger.state().expenses_loaded);
    }

    #[tokio::test]
    async fn test_forced_fetch_reloads() {
        let mut expenses = MockExpenseRepository::new();
        let mut calls = 0;
        expenses.expect_list_expenses().times(2).returning(move || {
            calls += 1;
            Ok((0..calls)
                .map(|i| expense(&i.to_string(), 10, date(2025, 1, 2), false))
                .collect())
        });
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        ledger.fetch_expenses(true).await;

        assert_eq!(ledger.state().expenses.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_recorded_not_raised() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .returning(|| Err(ApiClientError::Transport("timeout".to_string())));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;

        let state = ledger.state();
        assert!(!state.expenses_loaded);
        assert!(!state.loading_expenses);
        assert!(state
            .expenses_error
            .as_deref()
            .unwrap()
            .starts_with("Failed to fetch expenses"));
        assert_eq!(state.fetch_error(), state.expenses_error.as_deref());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_salary_fetch_keeps_expense_failure() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .returning(|| Err(ApiClientError::Transport("offline".to_string())));
        let mut salaries = MockSalaryRepository::new();
        salaries.expect_list_salaries().returning(|| Ok(Vec::new()));
        let ledger = ledger(expenses, salaries);

        ledger.fetch_expenses(false).await;
        ledger.fetch_salary(false).await;

        let state = ledger.state();
        assert!(state.salaries_loaded);
        assert!(!state.expenses_loaded);
        assert!(state.salaries_error.is_none());
        assert_eq!(
            state.fetch_error(),
            Some("Failed to fetch expenses: Transport error: offline")
        );
    }

    #[tokio::test]
    async fn test_refresh_context_keeps_expense_failure() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .returning(|| Err(ApiClientError::Transport("offline".to_string())));
        let mut salaries = MockSalaryRepository::new();
        salaries.expect_list_salaries().returning(|| Ok(Vec::new()));
        let ledger = ledger(expenses, salaries);

        ledger.refresh_context().await;

        assert!(ledger
            .state()
            .fetch_error()
            .unwrap()
            .starts_with("Failed to fetch expenses"));
    }

    struct BlockingExpenses {
        calls: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl ExpenseRepository for BlockingExpenses {
        async fn list_expenses(&self) -> Result<Vec<Expense>, ApiClientError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.release.notified().await;
                Ok(vec![expense("stale", 1, date(2025, 1, 1), false)])
            } else {
                Ok(vec![expense("fresh", 2, date(2025, 1, 1), false)])
            }
        }

        async fn create_expense(
            &self,
            _payload: &CreateExpensePayload,
        ) -> Result<Expense, ApiClientError> {
            unreachable!()
        }

        async fn update_expense(
            &self,
            _expense_id: &str,
            _payload: &UpdateExpensePayload,
        ) -> Result<(), ApiClientError> {
            unreachable!()
        }

        async fn delete_expense(&self, _expense_id: &str) -> Result<(), ApiClientError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_concurrent_fetch_is_suppressed_while_in_flight() {
        let repository = Arc::new(BlockingExpenses {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
        });
        let ledger = ExpenseLedger::with_month(
            repository.clone(),
            Arc::new(MockSalaryRepository::new()),
            january(),
        );

        let first = ledger.fetch_expenses(false);
        let second = async {
            tokio::task::yield_now().await;
            ledger.fetch_expenses(false).await;
            repository.release.notify_one();
        };
        tokio::join!(first, second);

        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.state().expenses[0].id, "stale");
    }

    #[tokio::test]
    async fn test_superseded_fetch_result_is_discarded() {
        let repository = Arc::new(BlockingExpenses {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
        });
        let ledger = ExpenseLedger::with_month(
            repository.clone(),
            Arc::new(MockSalaryRepository::new()),
            january(),
        );

        let first = ledger.fetch_expenses(false);
        let forced = async {
            tokio::task::yield_now().await;
            ledger.fetch_expenses(true).await;
            repository.release.notify_one();
        };
        tokio::join!(first, forced);

        let state = ledger.state();
        assert_eq!(repository.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.expenses.len(), 1);
        assert_eq!(state.expenses[0].id, "fresh");
        assert!(!state.loading_expenses);
    }

    #[tokio::test]
    async fn test_add_then_delete_restores_total() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .returning(|| Ok(vec![expense("1", 100, date(2025, 1, 2), true)]));
        expenses
            .expect_create_expense()
            .times(1)
            .returning(|payload| {
                Ok(Expense {
                    id: "99".to_string(),
                    category_id: payload.category_id.clone(),
                    value: payload.value,
                    date: payload.date,
                    payment_method: payload.payment_method.clone(),
                    card: payload.card.clone(),
                    installments: payload.installments,
                    paid: payload.paid,
                    description: payload.description.clone(),
                })
            });
        expenses
            .expect_delete_expense()
            .withf(|id| id == "99")
            .times(1)
            .returning(|_| Ok(()));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        let before = ledger.totals_for_selected_month();

        let added = ledger.add_expense(create_payload(40)).await.unwrap();
        assert_eq!(
            ledger.totals_for_selected_month().total,
            before.total + Decimal::from(40)
        );

        ledger.delete_expense(&added.id).await.unwrap();
        assert_eq!(ledger.totals_for_selected_month(), before);
    }

    #[tokio::test]
    async fn test_add_expense_validation_skips_backend() {
        let mut expenses = MockExpenseRepository::new();
        expenses.expect_create_expense().never();
        let ledger = ledger(expenses, MockSalaryRepository::new());

        assert!(matches!(
            ledger.add_expense(create_payload(0)).await,
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_add_expense_failure_is_rethrown() {
        let mut expenses = MockExpenseRepository::new();
        expenses.expect_create_expense().returning(|_| {
            Err(ApiClientError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let ledger = ledger(expenses, MockSalaryRepository::new());

        let result = ledger.add_expense(create_payload(10)).await;

        assert!(matches!(result, Err(LedgerError::Api(_))));
        assert_eq!(
            ledger.state().error.as_deref(),
            Some("Failed to add expense: boom")
        );
        assert!(ledger.state().expenses.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_in_place() {
        let mut expenses = MockExpenseRepository::new();
        expenses.expect_list_expenses().returning(|| {
            Ok(vec![
                expense("1", 100, date(2025, 1, 2), false),
                expense("2", 50, date(2025, 1, 3), false),
            ])
        });
        expenses
            .expect_update_expense()
            .withf(|id, payload| id == "2" && payload.paid == Some(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        ledger.set_expense_paid("2", true).await.unwrap();

        let state = ledger.state();
        assert_eq!(state.expenses[1].id, "2");
        assert!(state.expenses[1].paid);
        assert!(!state.expenses[0].paid);
        let totals = ledger.totals_for_selected_month();
        assert_eq!(totals.paid, Decimal::from(50));
        assert_eq!(totals.unpaid, Decimal::from(100));
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_cache() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .returning(|| Ok(vec![expense("1", 100, date(2025, 1, 2), false)]));
        expenses
            .expect_delete_expense()
            .returning(|_| Err(ApiClientError::Transport("offline".to_string())));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        assert!(ledger.delete_expense("1").await.is_err());
        assert_eq!(ledger.state().expenses.len(), 1);
    }

    #[tokio::test]
    async fn test_set_salary_dates_first_of_month_and_replaces_entry() {
        let mut salaries = MockSalaryRepository::new();
        salaries.expect_list_salaries().returning(|| {
            Ok(vec![
                Salary {
                    id: "1".to_string(),
                    value: Decimal::from(1000),
                    date: date(2025, 1, 1),
                },
                Salary {
                    id: "2".to_string(),
                    value: Decimal::from(800),
                    date: date(2024, 12, 1),
                },
            ])
        });
        salaries
            .expect_upsert_salary()
            .withf(|payload| payload.date == date(2025, 1, 1))
            .times(1)
            .returning(|payload| {
                Ok(Salary {
                    id: "1".to_string(),
                    value: payload.value,
                    date: payload.date,
                })
            });
        let ledger = ledger(MockExpenseRepository::new(), salaries);

        ledger.fetch_salary(false).await;
        assert_eq!(ledger.salary_for_selected_month(), Decimal::from(1000));

        ledger.set_salary(Decimal::from(1200)).await.unwrap();

        let state = ledger.state();
        assert_eq!(state.salaries.len(), 2);
        assert_eq!(ledger.salary_for_selected_month(), Decimal::from(1200));
    }

    #[tokio::test]
    async fn test_set_salary_appends_for_new_month() {
        let mut salaries = MockSalaryRepository::new();
        salaries.expect_upsert_salary().returning(|payload| {
            Ok(Salary {
                id: "7".to_string(),
                value: payload.value,
                date: payload.date,
            })
        });
        let ledger = ledger(MockExpenseRepository::new(), salaries);

        ledger.next_month();
        ledger.set_salary(Decimal::from(3000)).await.unwrap();

        let state = ledger.state();
        assert_eq!(state.salaries.len(), 1);
        assert_eq!(state.salaries[0].date, date(2025, 2, 1));
        assert_eq!(ledger.salary_for_selected_month(), Decimal::from(3000));
        ledger.previous_month();
        assert_eq!(ledger.salary_for_selected_month(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_month_cursor_moves_views() {
        let mut expenses = MockExpenseRepository::new();
        expenses.expect_list_expenses().returning(|| {
            Ok(vec![
                expense("1", 100, date(2025, 1, 2), false),
                expense("2", 50, date(2025, 2, 3), false),
            ])
        });
        let ledger = ledger(expenses, MockSalaryRepository::new());
        ledger.fetch_expenses(false).await;

        assert_eq!(ledger.expenses_for_selected_month().len(), 1);
        assert_eq!(ledger.next_month(), ReportingMonth::new(2025, 2).unwrap());
        assert_eq!(ledger.expenses_for_selected_month()[0].id, "2");
        ledger.previous_month();
        assert_eq!(
            ledger.previous_month(),
            ReportingMonth::new(2024, 12).unwrap()
        );
        assert!(ledger.expenses_for_selected_month().is_empty());
        assert_eq!(ledger.average_expense(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_refresh_context_forces_both_fetches() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .times(2)
            .returning(|| Ok(Vec::new()));
        let mut salaries = MockSalaryRepository::new();
        salaries
            .expect_list_salaries()
            .times(2)
            .returning(|| Ok(Vec::new()));
        let ledger = ledger(expenses, salaries);

        ledger.fetch_expenses(false).await;
        ledger.fetch_salary(false).await;
        ledger.refresh_context().await;
    }

    #[tokio::test]
    async fn test_reset_clears_cache_but_keeps_cursor() {
        let mut expenses = MockExpenseRepository::new();
        expenses
            .expect_list_expenses()
            .times(2)
            .returning(|| Ok(vec![expense("1", 100, date(2025, 1, 2), false)]));
        let ledger = ledger(expenses, MockSalaryRepository::new());

        ledger.fetch_expenses(false).await;
        ledger.next_month();
        ledger.reset();

        let state = ledger.state();
        assert!(state.expenses.is_empty());
        assert!(!state.expenses_loaded);
        assert_eq!(state.selected_month, ReportingMonth::new(2025, 2).unwrap());

        ledger.fetch_expenses(false).await;
        assert!(ledger.state().expenses_loaded);
    }
}
