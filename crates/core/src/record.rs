use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of fields a bank statement record carries.
///
/// Category rules may only reference these names; anything else is a
/// configuration error caught at rule-set load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PaymentParty,
    Amount,
    Description,
    TypeOfTransfer,
    Date,
    Category,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::PaymentParty,
        Field::Amount,
        Field::Description,
        Field::TypeOfTransfer,
        Field::Date,
        Field::Category,
    ];

    /// Whether the field holds free text that substring rules can match on.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::PaymentParty | Field::Description | Field::TypeOfTransfer | Field::Category
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::PaymentParty => "payment_party",
            Field::Amount => "amount",
            Field::Description => "description",
            Field::TypeOfTransfer => "type_of_transfer",
            Field::Date => "date",
            Field::Category => "category",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_party" => Ok(Field::PaymentParty),
            "amount" => Ok(Field::Amount),
            "description" => Ok(Field::Description),
            "type_of_transfer" => Ok(Field::TypeOfTransfer),
            "date" => Ok(Field::Date),
            "category" => Ok(Field::Category),
            other => Err(format!("unknown field: '{other}'")),
        }
    }
}

/// One immutable statement line: a dated, signed money movement.
///
/// Negative amounts are outflows, positive amounts are inflows. A zero
/// amount is legal and simply contributes nothing to aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub payment_party: String,
    pub amount: Decimal,
    pub description: String,
    pub type_of_transfer: String,
    /// `None` until a classifier has assigned one, or the source system
    /// delivered the record pre-categorized.
    pub category: Option<String>,
}

impl TransactionRecord {
    /// Returns the value of a text field, or `None` for non-text fields
    /// and for an unassigned category.
    pub fn text_field(&self, field: Field) -> Option<&str> {
        match field {
            Field::PaymentParty => Some(&self.payment_party),
            Field::Description => Some(&self.description),
            Field::TypeOfTransfer => Some(&self.type_of_transfer),
            Field::Category => self.category.as_deref(),
            Field::Amount | Field::Date => None,
        }
    }
}
