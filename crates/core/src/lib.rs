pub mod dates;
pub mod interval;
pub mod record;
pub mod template;

pub use interval::{AnalysisInterval, IntervalError};
pub use record::{Field, TransactionRecord};
pub use template::{
    DatedTransfer, RecurrenceStep, RegularTransfer, TemplateError, Transfer,
};
