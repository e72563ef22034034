//! The ledger: owns transfer templates, materializes them over an analysis
//! interval, and caches the result until the next mutation.

use std::collections::BTreeMap;

use budgetbook_core::{AnalysisInterval, IntervalError, TransactionRecord, Transfer};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::recurrence;

/// An explicitly owned, explicitly constructed ledger instance. Callers
/// hold it by reference; there is no process-wide singleton.
#[derive(Debug, Default)]
pub struct Ledger {
    transfers: Vec<Transfer>,
    interval: Option<AnalysisInterval>,
    /// `None` marks the cache dirty; every mutating call resets it.
    cache: Option<Vec<TransactionRecord>>,
    rebuilds: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn add(&mut self, transfer: impl Into<Transfer>) {
        self.transfers.push(transfer.into());
        self.cache = None;
    }

    pub fn add_many<T: Into<Transfer>>(&mut self, transfers: impl IntoIterator<Item = T>) {
        self.transfers.extend(transfers.into_iter().map(Into::into));
        self.cache = None;
    }

    /// Removes all transfers and derived state.
    pub fn clear(&mut self) {
        self.transfers.clear();
        self.interval = None;
        self.cache = None;
    }

    /// Sets the analysis interval. A rejected interval leaves all prior
    /// state, including the cache, untouched.
    pub fn set_interval(&mut self, from: NaiveDate, to: NaiveDate) -> Result<(), IntervalError> {
        let interval = AnalysisInterval::new(from, to)?;
        self.interval = Some(interval);
        self.cache = None;
        Ok(())
    }

    pub fn interval(&self) -> Option<AnalysisInterval> {
        self.interval
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Whether derived views may be read: the ledger holds transfers and
    /// a materialized cache exists for the current interval.
    pub fn is_valid(&self) -> bool {
        !self.transfers.is_empty() && self.cache.is_some()
    }

    /// Number of cache rebuilds performed so far. Reads without an
    /// intervening mutation do not increase this.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// The merged, date-sorted expansion of every transfer over the
    /// current interval. Rebuilt lazily on the first read after a
    /// mutation; same-date records keep their insertion order. Without an
    /// interval the ledger materializes to nothing.
    pub fn materialize(&mut self) -> &[TransactionRecord] {
        if self.cache.is_none() {
            self.rebuild();
        }
        self.cache.as_deref().unwrap_or(&[])
    }

    fn rebuild(&mut self) {
        let Some(window) = self.interval else {
            return;
        };
        let mut records = Vec::new();
        for transfer in &self.transfers {
            records.extend(recurrence::expand(transfer, &window));
        }
        // Stable sort: ties keep template insertion order.
        records.sort_by_key(|r| r.date);
        self.rebuilds += 1;
        tracing::debug!(
            records = records.len(),
            transfers = self.transfers.len(),
            window = %window,
            rebuilds = self.rebuilds,
            "materialized ledger cache"
        );
        self.cache = Some(records);
    }

    /// Earliest date in the materialized set. Collaborators use this pair
    /// to auto-suggest a display window after loading a dataset.
    pub fn first_date(&mut self) -> Option<NaiveDate> {
        self.materialize().first().map(|r| r.date)
    }

    /// Latest date in the materialized set.
    pub fn last_date(&mut self) -> Option<NaiveDate> {
        self.materialize().last().map(|r| r.date)
    }

    /// Net sum of all materialized amounts.
    pub fn balance(&mut self) -> Decimal {
        self.materialize().iter().map(|r| r.amount).sum()
    }

    /// Absolute payment volume per category (outflows only), sorted by
    /// category name.
    pub fn payments_per_category(&mut self) -> Vec<(String, Decimal)> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for record in self.materialize() {
            if record.amount >= Decimal::ZERO {
                continue;
            }
            let category = record.category.clone().unwrap_or_default();
            *totals.entry(category).or_default() += record.amount.abs();
        }
        totals.into_iter().collect()
    }

    /// Income volume per category (inflows only), sorted by category name.
    pub fn income_per_category(&mut self) -> Vec<(String, Decimal)> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for record in self.materialize() {
            if record.amount <= Decimal::ZERO {
                continue;
            }
            let category = record.category.clone().unwrap_or_default();
            *totals.entry(category).or_default() += record.amount;
        }
        totals.into_iter().collect()
    }

    /// Net amount per calendar month, keyed by the first of the month.
    pub fn monthly_totals(&mut self) -> Vec<(NaiveDate, Decimal)> {
        let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for record in self.materialize() {
            let month = NaiveDate::from_ymd_opt(record.date.year(), record.date.month(), 1)
                .expect("first of month is always valid");
            *totals.entry(month).or_default() += record.amount;
        }
        totals.into_iter().collect()
    }
}
