//! The filter engine: narrows the customer list with a single active criterion.

use crate::model::{Customer, RecordId, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which field the active filter looks at.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Case-insensitive substring of the customer name.
    #[default]
    Name,
    /// Exact amount of any of the customer's transactions.
    Amount,
}

serde_plain::derive_display_from_serialize!(FilterKind);
serde_plain::derive_fromstr_from_deserialize!(FilterKind);

/// The single active filter: a kind plus the value as the user typed it.
///
/// The value is kept as text for both kinds. For `FilterKind::Amount` it is parsed when the filter
/// is applied, and a value that does not parse means "no filter".
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriterion {
    kind: FilterKind,
    value: String,
}

impl FilterCriterion {
    pub fn new(kind: FilterKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(FilterKind::Name, value)
    }

    pub fn amount(value: impl Into<String>) -> Self {
        Self::new(FilterKind::Amount, value)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Returns the customers that pass `criterion`, in their original order.
///
/// - `FilterKind::Name`: the name contains the value, ignoring case. An empty value passes
///   everyone.
/// - `FilterKind::Amount`: some transaction of the customer has exactly the parsed amount. A value
///   that is not an integer passes everyone. A number too large for an `i64` equals no amount, so
///   it passes nobody.
pub fn apply<'a>(
    customers: &'a [Customer],
    transactions: &[Transaction],
    criterion: &FilterCriterion,
) -> Vec<&'a Customer> {
    match criterion.kind() {
        FilterKind::Name => by_name(customers, criterion.value()),
        FilterKind::Amount => match parse_amount(criterion.value()) {
            AmountQuery::Exact(amount) => by_amount(customers, transactions, amount),
            AmountQuery::OutOfRange => Vec::new(),
            AmountQuery::Invalid => customers.iter().collect(),
        },
    }
}

fn by_name<'a>(customers: &'a [Customer], needle: &str) -> Vec<&'a Customer> {
    let needle = needle.to_lowercase();
    customers
        .iter()
        .filter(|c| c.name().to_lowercase().contains(&needle))
        .collect()
}

fn by_amount<'a>(
    customers: &'a [Customer],
    transactions: &[Transaction],
    amount: i64,
) -> Vec<&'a Customer> {
    let matching: HashSet<&RecordId> = transactions
        .iter()
        .filter(|t| t.amount() == amount)
        .map(|t| t.customer_id())
        .collect();
    customers
        .iter()
        .filter(|c| matching.contains(c.id()))
        .collect()
}

/// The outcome of reading an amount filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountQuery {
    /// Match transactions with exactly this amount.
    Exact(i64),
    /// The value is a number, but beyond the range of any amount.
    OutOfRange,
    /// The value does not start with a number.
    Invalid,
}

/// Parses the leading integer of `value`, the way a search box is usually read: leading
/// whitespace and a sign are accepted and anything after the digits is ignored, so `"30 usd"` is
/// 30 and `"3.7"` is 3.
pub fn parse_amount(value: &str) -> AmountQuery {
    let trimmed = value.trim_start();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_len == 0 {
        return AmountQuery::Invalid;
    }
    match format!("{sign}{}", &rest[..digits_len]).parse() {
        Ok(amount) => AmountQuery::Exact(amount),
        Err(_) => AmountQuery::OutOfRange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Vec<Customer> {
        vec![
            Customer::new(1, "Alice"),
            Customer::new(2, "Bob"),
            Customer::new(3, "Malik"),
            Customer::new(4, "ÉLODIE"),
        ]
    }

    fn transactions() -> Vec<Transaction> {
        vec![
            Transaction::new(1, 1, "2024-01-01T10:00".parse().unwrap(), 50),
            Transaction::new(2, 1, "2024-01-01T15:00".parse().unwrap(), 30),
            Transaction::new(3, 1, "2024-01-02T09:00".parse().unwrap(), 20),
            Transaction::new(4, "2", "2024-01-03T09:00".parse().unwrap(), -30),
            Transaction::new(5, 99, "2024-01-03T09:00".parse().unwrap(), 70),
            Transaction::new(6, "3", "2024-01-04".parse().unwrap(), 20),
        ]
    }

    fn ids(customers: &[&Customer]) -> Vec<String> {
        customers.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn test_name_substring_case_insensitive() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::name("ali"));
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn test_name_unicode_case() {
        let customers = customers();
        let result = apply(&customers, &[], &FilterCriterion::name("élo"));
        assert_eq!(ids(&result), vec!["4"]);
    }

    #[test]
    fn test_empty_name_matches_all_in_order() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::name(""));
        assert_eq!(ids(&result), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_name_no_match() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::name("zed"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_amount_exact_match() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::amount("30"));
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn test_amount_negative() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::amount("-30"));
        assert_eq!(ids(&result), vec!["2"]);
    }

    #[test]
    fn test_amount_shared_by_several_customers() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::amount("20"));
        assert_eq!(ids(&result), vec!["1", "3"]);
    }

    #[test]
    fn test_amount_of_dangling_transaction_matches_nobody() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::amount("70"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_amount_unparsable_passes_everyone() {
        let customers = customers();
        for value in ["", "abc", "-", " ", "$30", "--3"] {
            let result = apply(&customers, &transactions(), &FilterCriterion::amount(value));
            assert_eq!(
                ids(&result),
                vec!["1", "2", "3", "4"],
                "value {value:?} should not filter"
            );
        }
    }

    #[test]
    fn test_amount_out_of_range_passes_nobody() {
        let customers = customers();
        for value in ["99999999999999999999", "-99999999999999999999", "9223372036854775808x"] {
            let result = apply(&customers, &transactions(), &FilterCriterion::amount(value));
            assert!(result.is_empty(), "value {value:?} should match nobody");
        }
    }

    #[test]
    fn test_name_value_is_not_parsed_as_amount() {
        let customers = customers();
        let result = apply(&customers, &transactions(), &FilterCriterion::name("30"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("30"), AmountQuery::Exact(30));
        assert_eq!(parse_amount("  30"), AmountQuery::Exact(30));
        assert_eq!(parse_amount("+30"), AmountQuery::Exact(30));
        assert_eq!(parse_amount("-30"), AmountQuery::Exact(-30));
        assert_eq!(parse_amount("30abc"), AmountQuery::Exact(30));
        assert_eq!(parse_amount("3.7"), AmountQuery::Exact(3));
        assert_eq!(parse_amount("-0"), AmountQuery::Exact(0));
        assert_eq!(
            parse_amount("-9223372036854775808"),
            AmountQuery::Exact(i64::MIN)
        );
        assert_eq!(parse_amount("abc"), AmountQuery::Invalid);
        assert_eq!(parse_amount("--3"), AmountQuery::Invalid);
        assert_eq!(parse_amount("99999999999999999999"), AmountQuery::OutOfRange);
    }

    #[test]
    fn test_apply_is_deterministic() {
        let customers = customers();
        let transactions = transactions();
        let criterion = FilterCriterion::amount("20");
        let a = apply(&customers, &transactions, &criterion);
        let b = apply(&customers, &transactions, &criterion);
        assert_eq!(a, b);
    }

    #[test]
    fn test_filter_kind_strings() {
        assert_eq!(FilterKind::Amount.to_string(), "amount");
        assert_eq!("name".parse::<FilterKind>().unwrap(), FilterKind::Name);
    }
}
