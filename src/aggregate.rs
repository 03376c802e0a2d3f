//! The aggregator: per-day transaction totals for one customer.

use crate::model::{RecordId, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The sum of a customer's transaction amounts on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyTotal {
    date: NaiveDate,
    total: i64,
}

impl DailyTotal {
    pub fn new(date: NaiveDate, total: i64) -> Self {
        Self { date, total }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn total(&self) -> i64 {
        self.total
    }
}

/// An ordered series of `DailyTotal` values with at most one entry per day.
///
/// Entries come in the order their day was first seen in the transactions, which is chronological
/// only if the transactions were. An empty series means there is nothing to chart.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries(Vec<DailyTotal>);

impl DailySeries {
    pub fn points(&self) -> &[DailyTotal] {
        &self.0
    }

    pub fn into_points(self) -> Vec<DailyTotal> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyTotal> {
        self.0.iter()
    }

    /// Reorders the series by date, oldest first.
    pub fn sorted_by_date(mut self) -> Self {
        self.0.sort_by_key(DailyTotal::date);
        self
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyTotal;
    type IntoIter = std::slice::Iter<'a, DailyTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Groups the transactions of `customer_id` by calendar day and sums their amounts.
///
/// Transactions of other customers are skipped. Sums saturate at the bounds of `i64`.
pub fn daily_totals(transactions: &[Transaction], customer_id: &RecordId) -> DailySeries {
    let mut totals: Vec<DailyTotal> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();
    for tx in transactions.iter().filter(|t| t.customer_id() == customer_id) {
        let day = tx.day();
        match index.get(&day) {
            Some(&ix) => totals[ix].total = totals[ix].total.saturating_add(tx.amount()),
            None => {
                index.insert(day, totals.len());
                totals.push(DailyTotal::new(day, tx.amount()));
            }
        }
    }
    DailySeries(totals)
}
