//! Expansion of transfer templates into concrete dated records.

use budgetbook_core::{AnalysisInterval, RegularTransfer, TransactionRecord, Transfer};

/// Expands a transfer over an analysis window.
///
/// Regular transfers emit one record per grid point inside the half-open
/// window and inside the template's own bounds; dated transfers emit zero
/// or one record. Output is ordered ascending by date.
pub fn expand(transfer: &Transfer, window: &AnalysisInterval) -> Vec<TransactionRecord> {
    match transfer {
        Transfer::Regular(template) => expand_regular(template, window),
        Transfer::Dated(single) => {
            if window.contains(single.date) {
                vec![single.to_record()]
            } else {
                Vec::new()
            }
        }
    }
}

fn expand_regular(template: &RegularTransfer, window: &AnalysisInterval) -> Vec<TransactionRecord> {
    let mut records = Vec::new();

    // The grid is anchored at first_occurrence; each point is the anchor
    // advanced N whole steps. Steps are strictly positive in at least one
    // unit, so the walk terminates at the window's upper bound.
    for index in 0u32.. {
        let point = template.step.advance_from(template.first_occurrence, index);
        if point >= window.to_date() {
            break;
        }
        if let Some(last) = template.last_occurrence {
            if point > last {
                break;
            }
        }
        if point >= window.from_date() {
            records.push(template.record_on(point));
        }
    }

    records
}
