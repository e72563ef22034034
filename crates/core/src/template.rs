use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::shift_months;
use crate::record::TransactionRecord;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("recurrence step must be positive in at least one unit")]
    ZeroStep,
    #[error("first occurrence {first} is after last occurrence {last}")]
    BoundsReversed { first: NaiveDate, last: NaiveDate },
}

/// Calendar step between two occurrences of a regular transfer.
///
/// Years and months are added calendar-wise with day-of-month clamping,
/// then days are added as an exact duration. The all-zero step is rejected
/// at construction; a template with it would occur infinitely often on a
/// single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecurrenceStep")]
pub struct RecurrenceStep {
    years: u32,
    months: u32,
    days: u32,
}

/// Unvalidated wire form; deserialization routes through
/// [`RecurrenceStep::new`] so the zero-step guard holds for decoded input
/// as well as constructed values.
#[derive(Deserialize)]
struct RawRecurrenceStep {
    years: u32,
    months: u32,
    days: u32,
}

impl TryFrom<RawRecurrenceStep> for RecurrenceStep {
    type Error = TemplateError;

    fn try_from(raw: RawRecurrenceStep) -> Result<Self, Self::Error> {
        RecurrenceStep::new(raw.years, raw.months, raw.days)
    }
}

impl RecurrenceStep {
    pub fn new(years: u32, months: u32, days: u32) -> Result<Self, TemplateError> {
        if years == 0 && months == 0 && days == 0 {
            return Err(TemplateError::ZeroStep);
        }
        Ok(RecurrenceStep { years, months, days })
    }

    pub fn weekly() -> Self {
        RecurrenceStep { years: 0, months: 0, days: 7 }
    }

    pub fn monthly() -> Self {
        RecurrenceStep { years: 0, months: 1, days: 0 }
    }

    pub fn yearly() -> Self {
        RecurrenceStep { years: 1, months: 0, days: 0 }
    }

    /// Exact day-count step. Fails for zero days.
    pub fn days(days: u32) -> Result<Self, TemplateError> {
        RecurrenceStep::new(0, 0, days)
    }

    pub fn years_part(&self) -> u32 {
        self.years
    }

    pub fn months_part(&self) -> u32 {
        self.months
    }

    pub fn days_part(&self) -> u32 {
        self.days
    }

    /// The date one step after `from`.
    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        self.advance_from(from, 1)
    }

    /// The date `steps` steps after `anchor`.
    ///
    /// The step is always applied to the anchor, not to a previously
    /// clamped result, so a monthly grid anchored on Jan 31 stays on the
    /// 31st where the month has one (Jan 31, Feb 28, Mar 31, ...) instead
    /// of decaying to the 28th after February.
    pub fn advance_from(&self, anchor: NaiveDate, steps: u32) -> NaiveDate {
        let months = (self.years * 12 + self.months) as i32 * steps as i32;
        shift_months(anchor, months) + Duration::days((self.days * steps) as i64)
    }
}

/// A recurring transfer definition: fixed amount on a calendar grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularTransfer {
    pub category: String,
    pub name: String,
    pub description: String,
    pub amount: Decimal,
    pub step: RecurrenceStep,
    pub first_occurrence: NaiveDate,
    /// `None` means open-ended.
    pub last_occurrence: Option<NaiveDate>,
}

impl RegularTransfer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        step: RecurrenceStep,
        first_occurrence: NaiveDate,
        last_occurrence: Option<NaiveDate>,
    ) -> Result<Self, TemplateError> {
        if let Some(last) = last_occurrence {
            if first_occurrence > last {
                return Err(TemplateError::BoundsReversed {
                    first: first_occurrence,
                    last,
                });
            }
        }
        Ok(RegularTransfer {
            category: category.into(),
            name: name.into(),
            description: description.into(),
            amount,
            step,
            first_occurrence,
            last_occurrence,
        })
    }

    /// Builds the concrete record for one grid point. All template fields
    /// are inherited verbatim; only the date varies.
    pub fn record_on(&self, date: NaiveDate) -> TransactionRecord {
        TransactionRecord {
            date,
            payment_party: self.name.clone(),
            amount: self.amount,
            description: self.description.clone(),
            type_of_transfer: String::new(),
            category: Some(self.category.clone()),
        }
    }
}

/// A one-off transfer pinned to a single date. Structurally a degenerate
/// template that occurs at most once in any window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedTransfer {
    pub date: NaiveDate,
    pub payment_party: String,
    pub amount: Decimal,
    pub description: String,
    pub type_of_transfer: String,
    pub category: Option<String>,
}

impl DatedTransfer {
    pub fn to_record(&self) -> TransactionRecord {
        TransactionRecord {
            date: self.date,
            payment_party: self.payment_party.clone(),
            amount: self.amount,
            description: self.description.clone(),
            type_of_transfer: self.type_of_transfer.clone(),
            category: self.category.clone(),
        }
    }
}

/// The unit the ledger stores: either a recurring template or a one-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transfer {
    Regular(RegularTransfer),
    Dated(DatedTransfer),
}

impl From<RegularTransfer> for Transfer {
    fn from(t: RegularTransfer) -> Self {
        Transfer::Regular(t)
    }
}

impl From<DatedTransfer> for Transfer {
    fn from(t: DatedTransfer) -> Self {
        Transfer::Dated(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_step_is_rejected() {
        assert_eq!(RecurrenceStep::new(0, 0, 0), Err(TemplateError::ZeroStep));
        assert_eq!(RecurrenceStep::days(0), Err(TemplateError::ZeroStep));
    }

    #[test]
    fn single_unit_steps_are_valid() {
        assert!(RecurrenceStep::new(1, 0, 0).is_ok());
        assert!(RecurrenceStep::new(0, 1, 0).is_ok());
        assert!(RecurrenceStep::new(0, 0, 1).is_ok());
    }

    #[test]
    fn monthly_advance_clamps_and_recovers() {
        let step = RecurrenceStep::monthly();
        let anchor = date(2022, 1, 31);
        assert_eq!(step.advance_from(anchor, 0), date(2022, 1, 31));
        assert_eq!(step.advance_from(anchor, 1), date(2022, 2, 28));
        // Stepping from the anchor, not the clamped February date.
        assert_eq!(step.advance_from(anchor, 2), date(2022, 3, 31));
    }

    #[test]
    fn zero_step_does_not_deserialize() {
        let json = r#"{"years":0,"months":0,"days":0}"#;
        assert!(serde_json::from_str::<RecurrenceStep>(json).is_err());

        let template = r#"{
            "category": "Rent",
            "name": "Landlord",
            "description": "",
            "amount": "-950.00",
            "step": {"years": 0, "months": 0, "days": 0},
            "first_occurrence": "2022-01-01",
            "last_occurrence": null
        }"#;
        assert!(serde_json::from_str::<RegularTransfer>(template).is_err());
    }

    #[test]
    fn valid_step_round_trips_through_serde() {
        let step = RecurrenceStep::new(1, 2, 3).unwrap();
        let json = serde_json::to_string(&step).unwrap();
        assert_eq!(serde_json::from_str::<RecurrenceStep>(&json).unwrap(), step);
    }

    #[test]
    fn day_steps_are_exact() {
        let step = RecurrenceStep::weekly();
        assert_eq!(step.advance(date(2022, 2, 25)), date(2022, 3, 4));
    }

    #[test]
    fn mixed_step_applies_months_then_days() {
        let step = RecurrenceStep::new(0, 1, 3).unwrap();
        assert_eq!(step.advance(date(2022, 1, 31)), date(2022, 3, 3));
    }

    #[test]
    fn yearly_advance() {
        let step = RecurrenceStep::yearly();
        assert_eq!(step.advance_from(date(2020, 2, 29), 1), date(2021, 2, 28));
        assert_eq!(step.advance_from(date(2020, 2, 29), 4), date(2024, 2, 29));
    }

    #[test]
    fn regular_transfer_rejects_reversed_bounds() {
        let result = RegularTransfer::new(
            "Rent",
            "Landlord",
            "",
            Decimal::new(-95000, 2),
            RecurrenceStep::monthly(),
            date(2022, 5, 1),
            Some(date(2022, 1, 1)),
        );
        assert!(matches!(result, Err(TemplateError::BoundsReversed { .. })));
    }

    #[test]
    fn regular_transfer_accepts_equal_bounds() {
        let result = RegularTransfer::new(
            "Rent",
            "Landlord",
            "",
            Decimal::new(-95000, 2),
            RecurrenceStep::monthly(),
            date(2022, 1, 1),
            Some(date(2022, 1, 1)),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn record_inherits_template_fields() {
        let template = RegularTransfer::new(
            "Salary",
            "Employer GmbH",
            "Monthly wage",
            Decimal::new(310000, 2),
            RecurrenceStep::monthly(),
            date(2022, 1, 1),
            None,
        )
        .unwrap();
        let record = template.record_on(date(2022, 4, 1));
        assert_eq!(record.date, date(2022, 4, 1));
        assert_eq!(record.payment_party, "Employer GmbH");
        assert_eq!(record.amount, Decimal::new(310000, 2));
        assert_eq!(record.category.as_deref(), Some("Salary"));
    }
}
