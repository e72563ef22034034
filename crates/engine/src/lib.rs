pub mod ledger;
pub mod predict;
pub mod recurrence;
pub mod rules;

pub use ledger::Ledger;
pub use predict::{Prediction, RecurrencePredictor};
pub use recurrence::expand;
pub use rules::{Rule, RuleError, RuleSet, UNKNOWN_INCOME, UNKNOWN_PAYMENT};
