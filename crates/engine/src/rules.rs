//! Rule-based transaction categorization.
//!
//! A rule set maps category names to boolean rule trees. Trees are built
//! once at load time and validated eagerly against the record schema, so a
//! misspelled field name is a load-time error instead of a silent
//! non-match at classification time.

use budgetbook_core::{Field, TransactionRecord};
use rust_decimal::Decimal;
use thiserror::Error;

pub const UNKNOWN_INCOME: &str = "Unknown Income";
pub const UNKNOWN_PAYMENT: &str = "Unknown Payment";

const AND_KEY: &str = "and";
const OR_KEY: &str = "or";

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule for category '{category}' references unknown field '{field}'")]
    UnknownField { category: String, field: String },
    #[error("invalid rule for category '{category}': {reason}")]
    InvalidRule { category: String, reason: String },
    #[error("rule set is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One node of a category rule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Matches when the record's field contains any candidate, case-folded.
    Leaf {
        field: Field,
        candidates: Vec<String>,
    },
    /// Matches when every child matches. Empty `And` never matches — a
    /// vacuous true here would make the category match every record.
    And(Vec<Rule>),
    /// Matches when at least one child matches.
    Or(Vec<Rule>),
}

impl Rule {
    pub fn leaf(field: Field, candidates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Rule::Leaf {
            field,
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(&self, record: &TransactionRecord) -> bool {
        match self {
            Rule::Leaf { field, candidates } => {
                let Some(value) = record.text_field(*field) else {
                    return false;
                };
                let value = value.to_lowercase();
                candidates.iter().any(|c| value.contains(&c.to_lowercase()))
            }
            Rule::And(children) => !children.is_empty() && children.iter().all(|r| r.matches(record)),
            Rule::Or(children) => children.iter().any(|r| r.matches(record)),
        }
    }

    fn validate(&self, category: &str) -> Result<(), RuleError> {
        match self {
            Rule::Leaf { field, .. } => {
                if !field.is_text() {
                    return Err(RuleError::InvalidRule {
                        category: category.to_string(),
                        reason: format!("substring rules cannot match on field '{field}'"),
                    });
                }
                Ok(())
            }
            Rule::And(children) | Rule::Or(children) => {
                children.iter().try_for_each(|r| r.validate(category))
            }
        }
    }
}

/// An ordered set of category rules. Declaration order is the tie-break:
/// the first category whose tree matches wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, Rule)>,
}

impl RuleSet {
    pub fn new(rules: Vec<(String, Rule)>) -> Result<Self, RuleError> {
        for (category, rule) in &rules {
            rule.validate(category)?;
        }
        Ok(RuleSet { rules })
    }

    /// Loads a rule set from its TOML form: a table mapping each category
    /// name to a rule table. A rule table is either a set of
    /// `field = [candidates]` entries (any-of), or a single `and`/`or` key
    /// whose entries recurse. Mixing field entries with `and`/`or` in one
    /// table is rejected.
    pub fn from_toml(content: &str) -> Result<Self, RuleError> {
        let table: toml::Table = content.parse()?;
        let mut rules = Vec::with_capacity(table.len());
        for (category, value) in &table {
            rules.push((category.clone(), parse_rule(category, value)?));
        }
        RuleSet::new(rules)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(category, _)| category.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the category for a record.
    ///
    /// A pre-categorized record keeps its category unchanged, which makes
    /// classification idempotent. Otherwise the first matching category in
    /// declaration order wins; with no match the record falls back to
    /// [`UNKNOWN_INCOME`] or [`UNKNOWN_PAYMENT`] by the sign of its amount.
    pub fn classify(&self, record: &TransactionRecord) -> String {
        if let Some(existing) = &record.category {
            return existing.clone();
        }
        for (category, rule) in &self.rules {
            if rule.matches(record) {
                return category.clone();
            }
        }
        if record.amount > Decimal::ZERO {
            UNKNOWN_INCOME.to_string()
        } else {
            UNKNOWN_PAYMENT.to_string()
        }
    }

    /// Assigns a category to every record that does not have one yet.
    pub fn classify_all(&self, records: &mut [TransactionRecord]) {
        for record in records {
            if record.category.is_none() {
                record.category = Some(self.classify(record));
            }
        }
    }
}

fn parse_rule(category: &str, value: &toml::Value) -> Result<Rule, RuleError> {
    let table = value.as_table().ok_or_else(|| RuleError::InvalidRule {
        category: category.to_string(),
        reason: "rule must be a table".to_string(),
    })?;

    let has_composite = table.contains_key(AND_KEY) || table.contains_key(OR_KEY);
    if has_composite && table.len() > 1 {
        return Err(RuleError::InvalidRule {
            category: category.to_string(),
            reason: "a rule node is either field entries or a single 'and'/'or' key, not both"
                .to_string(),
        });
    }

    if let Some(children) = table.get(AND_KEY) {
        return Ok(Rule::And(parse_children(category, children)?));
    }
    if let Some(children) = table.get(OR_KEY) {
        return Ok(Rule::Or(parse_children(category, children)?));
    }

    // Plain field entries: any one of them matching is enough.
    let mut leaves = parse_children(category, value)?;
    if leaves.len() == 1 {
        Ok(leaves.remove(0))
    } else {
        Ok(Rule::Or(leaves))
    }
}

fn parse_children(category: &str, value: &toml::Value) -> Result<Vec<Rule>, RuleError> {
    let table = value.as_table().ok_or_else(|| RuleError::InvalidRule {
        category: category.to_string(),
        reason: "expected a table of sub-rules".to_string(),
    })?;

    let mut children = Vec::with_capacity(table.len());
    for (key, entry) in table {
        let child = match key.as_str() {
            AND_KEY => Rule::And(parse_children(category, entry)?),
            OR_KEY => Rule::Or(parse_children(category, entry)?),
            field_name => parse_leaf(category, field_name, entry)?,
        };
        children.push(child);
    }
    Ok(children)
}

fn parse_leaf(category: &str, field_name: &str, value: &toml::Value) -> Result<Rule, RuleError> {
    let field: Field = field_name.parse().map_err(|_| RuleError::UnknownField {
        category: category.to_string(),
        field: field_name.to_string(),
    })?;

    let candidates = match value {
        toml::Value::String(s) => vec![s.clone()],
        toml::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| RuleError::InvalidRule {
                    category: category.to_string(),
                    reason: format!("candidates for field '{field_name}' must be strings"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(RuleError::InvalidRule {
                category: category.to_string(),
                reason: format!("field '{field_name}' must map to a string or list of strings"),
            })
        }
    };

    let leaf = Rule::Leaf { field, candidates };
    leaf.validate(category)?;
    Ok(leaf)
}
