//! Pure derivations over a [`LedgerState`] snapshot.
//!
//! Everything here is a function of the state passed in (plus `today` where
//! the current date matters), so views can be recomputed freely.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::category::Category;
use crate::models::expense::Expense;
use crate::models::month::ReportingMonth;
use crate::services::expense_service::LedgerState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthTotals {
    pub total: Decimal,
    pub paid: Decimal,
    pub unpaid: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_id: String,
    pub total: Decimal,
}

/// Spending of one category set against its ideal share of the salary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetLine {
    pub category_id: String,
    pub name: String,
    pub spent: Decimal,
    pub ideal_percentage: Option<Decimal>,
    pub ideal_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Decimal,
}

/// Optional bounds on an expense listing. Both dates are inclusive; unset
/// fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<String>,
}

impl ExpenseFilter {
    pub fn for_month(month: ReportingMonth) -> Self {
        Self {
            from: Some(month.first_day()),
            to: Some(month.last_day()),
            category_id: None,
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.from.map_or(true, |from| expense.date >= from)
            && self.to.map_or(true, |to| expense.date <= to)
            && self
                .category_id
                .as_deref()
                .map_or(true, |category_id| expense.category_id == category_id)
    }
}

pub fn expenses_for_selected_month(state: &LedgerState) -> Vec<&Expense> {
    state
        .expenses
        .iter()
        .filter(|expense| state.selected_month.contains(expense.date))
        .collect()
}

pub fn totals_for_selected_month(state: &LedgerState) -> MonthTotals {
    expenses_for_selected_month(state)
        .into_iter()
        .fold(MonthTotals::default(), |mut totals, expense| {
            totals.total += expense.value;
            if expense.paid {
                totals.paid += expense.value;
            } else {
                totals.unpaid += expense.value;
            }
            totals
        })
}

/// Daily average of the selected month's spending. The current month is
/// divided by the days elapsed so far, any other month by its full length.
pub fn average_expense(state: &LedgerState, today: NaiveDate) -> Decimal {
    let total = totals_for_selected_month(state).total;
    if total.is_zero() {
        return Decimal::ZERO;
    }

    let month = state.selected_month;
    let days = if month == ReportingMonth::from_date(today) {
        today.day()
    } else {
        month.days_in_month()
    };

    total / Decimal::from(days.max(1))
}

/// Most recent salary dated inside the selected month, or zero.
pub fn salary_for_selected_month(state: &LedgerState) -> Decimal {
    let mut salaries: Vec<_> = state
        .salaries
        .iter()
        .filter(|salary| state.selected_month.contains(salary.date))
        .collect();
    salaries.sort_by(|a, b| b.date.cmp(&a.date));
    salaries
        .first()
        .map(|salary| salary.value)
        .unwrap_or(Decimal::ZERO)
}

/// Expenses of any month that pass `filter`, oldest first.
pub fn filter_expenses<'a>(state: &'a LedgerState, filter: &ExpenseFilter) -> Vec<&'a Expense> {
    let mut expenses: Vec<&Expense> = state
        .expenses
        .iter()
        .filter(|expense| filter.matches(expense))
        .collect();
    expenses.sort_by_key(|expense| expense.date);
    expenses
}

/// Selected-month spending summed per calendar day, in date order.
pub fn totals_by_day(state: &LedgerState) -> Vec<DailyTotal> {
    let mut grouped: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for expense in expenses_for_selected_month(state) {
        *grouped.entry(expense.date).or_default() += expense.value;
    }
    grouped
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Distinct category ids across every cached expense, sorted.
pub fn unique_categories(state: &LedgerState) -> Vec<String> {
    let ids: BTreeSet<&str> = state
        .expenses
        .iter()
        .map(|expense| expense.category_id.as_str())
        .collect();
    ids.into_iter().map(str::to_string).collect()
}

pub fn expenses_by_month(state: &LedgerState) -> BTreeMap<ReportingMonth, Vec<&Expense>> {
    let mut grouped: BTreeMap<ReportingMonth, Vec<&Expense>> = BTreeMap::new();
    for expense in &state.expenses {
        grouped
            .entry(ReportingMonth::from_date(expense.date))
            .or_default()
            .push(expense);
    }
    grouped
}

/// Selected-month spending per category, largest first.
pub fn totals_by_category(state: &LedgerState) -> Vec<CategoryTotal> {
    let mut grouped: BTreeMap<&str, Decimal> = BTreeMap::new();
    for expense in expenses_for_selected_month(state) {
        *grouped.entry(expense.category_id.as_str()).or_default() += expense.value;
    }

    let mut totals: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_id: category_id.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    totals
}

/// One line per known category plus one per unknown category id that has
/// spending this month.
pub fn budget_breakdown(state: &LedgerState, categories: &[Category]) -> Vec<BudgetLine> {
    let salary = salary_for_selected_month(state);
    let spent: BTreeMap<String, Decimal> = totals_by_category(state)
        .into_iter()
        .map(|line| (line.category_id, line.total))
        .collect();

    let mut lines: Vec<BudgetLine> = categories
        .iter()
        .map(|category| BudgetLine {
            category_id: category.id.clone(),
            name: category.name.clone(),
            spent: spent.get(&category.id).copied().unwrap_or(Decimal::ZERO),
            ideal_percentage: category.ideal_percentage,
            ideal_amount: category
                .ideal_percentage
                .map(|percentage| salary * percentage / Decimal::from(100)),
        })
        .collect();

    for (category_id, total) in &spent {
        if !categories.iter().any(|category| &category.id == category_id) {
            lines.push(BudgetLine {
                category_id: category_id.clone(),
                name: format!("#{}", category_id),
                spent: *total,
                ideal_percentage: None,
                ideal_amount: None,
            });
        }
    }

    lines.sort_by(|a, b| b.spent.cmp(&a.spent).then_with(|| a.name.cmp(&b.name)));
    lines
}
