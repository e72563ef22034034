//! Inference of regular-transfer templates from categorized history.
//!
//! Groups records by payee and category, estimates each group's period
//! from the median inter-occurrence gap, and projects one template forward
//! from the last known occurrence. Medians are used over means so a single
//! skipped or duplicated payment does not skew the estimate.

use std::collections::HashMap;

use budgetbook_core::{RecurrenceStep, RegularTransfer, TransactionRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Infers regular-transfer templates from dated, categorized records.
#[derive(Debug, Clone)]
pub struct RecurrencePredictor {
    /// Minimum occurrences a group needs before any period can be
    /// inferred. Below two there are no gaps to measure.
    pub min_occurrences: usize,
    /// Upper bound on the coefficient of variation of a group's gaps.
    /// Groups above it are excluded instead of producing a misleading
    /// periodic template. The default is a tuning starting point, not a
    /// calibrated constant.
    pub max_gap_cv: f64,
}

impl Default for RecurrencePredictor {
    fn default() -> Self {
        RecurrencePredictor {
            min_occurrences: 2,
            max_gap_cv: 0.35,
        }
    }
}

/// Outcome of a prediction run. The number of groups excluded for
/// irregular spacing is reported so the policy stays observable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prediction {
    pub templates: Vec<RegularTransfer>,
    pub excluded_groups: usize,
}

impl RecurrencePredictor {
    /// Produces one template per sufficiently regular `(payment_party,
    /// category)` group. Deterministic for identical input ordering:
    /// groups are emitted in first-seen order.
    pub fn predict(&self, records: &[TransactionRecord]) -> Prediction {
        let mut groups: Vec<((String, String), Vec<&TransactionRecord>)> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        for record in records {
            let key = (
                record.payment_party.clone(),
                record.category.clone().unwrap_or_default(),
            );
            match index.get(&key) {
                Some(&i) => groups[i].1.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }

        let mut prediction = Prediction::default();
        for ((party, category), mut entries) in groups {
            if entries.len() < self.min_occurrences {
                continue;
            }
            entries.sort_by_key(|r| r.date);

            let gaps: Vec<i64> = entries
                .windows(2)
                .map(|pair| (pair[1].date - pair[0].date).num_days())
                .collect();

            let Some(cv) = gap_variation(&gaps) else {
                prediction.excluded_groups += 1;
                tracing::debug!(%party, %category, "excluded group with zero-length gaps");
                continue;
            };
            if cv > self.max_gap_cv {
                prediction.excluded_groups += 1;
                tracing::debug!(%party, %category, cv, "excluded irregular group");
                continue;
            }

            let period = median_i64(&gaps);
            let step = step_for_gap(period);
            let amount = median_decimal(entries.iter().map(|r| r.amount));
            let last_seen = entries.last().expect("group is non-empty").date;

            let template = RegularTransfer::new(
                category,
                party,
                String::new(),
                amount,
                step,
                // Project forward: the next expected occurrence.
                step.advance(last_seen),
                None,
            )
            .expect("open-ended template has no bounds to violate");
            prediction.templates.push(template);
        }

        prediction
    }
}

/// Coefficient of variation of the gaps, or `None` when the mean gap is
/// zero (all occurrences on one date).
fn gap_variation(gaps: &[i64]) -> Option<f64> {
    let n = gaps.len() as f64;
    let mean = gaps.iter().sum::<i64>() as f64 / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = gaps
        .iter()
        .map(|&g| {
            let d = g as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Some(variance.sqrt() / mean)
}

/// Maps a median gap onto the nearest standard calendar period. This is an
/// approximation by design, not an exact inverse of expansion.
fn step_for_gap(days: i64) -> RecurrenceStep {
    match days {
        6..=8 => RecurrenceStep::weekly(),
        28..=31 => RecurrenceStep::monthly(),
        360..=370 => RecurrenceStep::yearly(),
        other => RecurrenceStep::days(other.max(1) as u32)
            .expect("gap is at least one day"),
    }
}

fn median_i64(values: &[i64]) -> i64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2
    }
}

fn median_decimal(values: impl Iterator<Item = Decimal>) -> Decimal {
    let mut sorted: Vec<Decimal> = values.collect();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / Decimal::from(2)
    }
}
