//! Filter predicate functions.
//!
//! One pure function per column type decides whether a record's field value
//! satisfies a filter. All of them follow the same vacuous-truth rule: a
//! filter without values (or a text filter whose string is blank) matches
//! everything, so a half-filled filter never hides rows.
//!
//! Number and date predicates read their values through [`Operand`], which
//! enforces the operator's arity: single-target operators take exactly one
//! value, range operators exactly two. Anything else is an
//! [`FilterError::Arity`] error.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::column::ColumnDataType;
use crate::error::{FilterError, Result};
use crate::filter::{dedup, FilterModel, FilterValues};
use crate::operators::{operator_details, FilterOperator, OperatorDetails, OperatorTarget};
use crate::value::Value;

/// The value(s) a scalar or range operator compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<T> {
    /// Single-target operators.
    Single(T),
    /// Range operators, always `(min, max)`.
    Range(T, T),
}

impl<T: Copy + PartialOrd> Operand<T> {
    /// Reads the operand for `details` from `values`.
    ///
    /// Returns `None` when there are no values (the filter is vacuous).
    pub fn from_values(details: &OperatorDetails, values: &[T]) -> Result<Option<Self>> {
        match (details.target, values) {
            (_, []) => Ok(None),
            (OperatorTarget::Single, [v]) => Ok(Some(Operand::Single(*v))),
            (OperatorTarget::Multiple, [a, b]) => {
                let (lo, hi) = if b < a { (*b, *a) } else { (*a, *b) };
                Ok(Some(Operand::Range(lo, hi)))
            }
            (OperatorTarget::Single, _) => Err(FilterError::Arity {
                operator: details.value,
                expected: "exactly one",
                actual: values.len(),
            }),
            (OperatorTarget::Multiple, _) => Err(FilterError::Arity {
                operator: details.value,
                expected: "exactly two",
                actual: values.len(),
            }),
        }
    }
}

/// Case-insensitive, whitespace-trimmed substring test.
pub fn text_filter_fn(input: &str, filter: &FilterModel) -> Result<bool> {
    let FilterValues::Text(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::Text, filter));
    };
    operator_details(ColumnDataType::Text, filter.operator())?;

    let Some(first) = values.first() else {
        return Ok(true);
    };
    let needle = first.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(true);
    }

    let found = input.trim().to_lowercase().contains(&needle);
    match filter.operator() {
        FilterOperator::Contains => Ok(found),
        FilterOperator::DoesNotContain => Ok(!found),
        other => Err(unsupported(other, ColumnDataType::Text)),
    }
}

/// Numeric comparison; ranges are inclusive.
pub fn number_filter_fn(input: f64, filter: &FilterModel) -> Result<bool> {
    let FilterValues::Number(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::Number, filter));
    };
    let details = operator_details(ColumnDataType::Number, filter.operator())?;
    let Some(operand) = Operand::from_values(details, values.as_slice())? else {
        return Ok(true);
    };

    use FilterOperator as Op;
    match (filter.operator(), operand) {
        (Op::Is, Operand::Single(v)) => Ok(input == v),
        (Op::IsNot, Operand::Single(v)) => Ok(input != v),
        (Op::IsGreaterThan, Operand::Single(v)) => Ok(input > v),
        (Op::IsGreaterThanOrEqualTo, Operand::Single(v)) => Ok(input >= v),
        (Op::IsLessThan, Operand::Single(v)) => Ok(input < v),
        (Op::IsLessThanOrEqualTo, Operand::Single(v)) => Ok(input <= v),
        (Op::IsBetween, Operand::Range(lo, hi)) => Ok(input >= lo && input <= hi),
        (Op::IsNotBetween, Operand::Range(lo, hi)) => Ok(input < lo || input > hi),
        (other, _) => Err(unsupported(other, ColumnDataType::Number)),
    }
}

/// Day-granularity date comparison.
///
/// `is between` runs from the start of the first day to the end of the
/// second, both inclusive.
pub fn date_filter_fn(input: NaiveDateTime, filter: &FilterModel) -> Result<bool> {
    let FilterValues::Date(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::Date, filter));
    };
    let details = operator_details(ColumnDataType::Date, filter.operator())?;
    let Some(operand) = Operand::from_values(details, values.as_slice())? else {
        return Ok(true);
    };

    let day = input.date();
    use FilterOperator as Op;
    match (filter.operator(), operand) {
        (Op::Is, Operand::Single(d)) => Ok(day == d.date()),
        (Op::IsNot, Operand::Single(d)) => Ok(day != d.date()),
        (Op::IsBefore, Operand::Single(d)) => Ok(day < d.date()),
        (Op::IsOnOrAfter, Operand::Single(d)) => Ok(day >= d.date()),
        (Op::IsAfter, Operand::Single(d)) => Ok(day > d.date()),
        (Op::IsOnOrBefore, Operand::Single(d)) => Ok(day <= d.date()),
        (Op::IsBetween, Operand::Range(start, end)) => Ok(start.date() <= day && day <= end.date()),
        (Op::IsNotBetween, Operand::Range(start, end)) => {
            Ok(day < start.date() || day > end.date())
        }
        (other, _) => Err(unsupported(other, ColumnDataType::Date)),
    }
}

/// Case-insensitive membership of one option value in the filter's set.
pub fn option_filter_fn(input: &str, filter: &FilterModel) -> Result<bool> {
    let FilterValues::Option(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::Option, filter));
    };
    operator_details(ColumnDataType::Option, filter.operator())?;
    if values.is_empty() {
        return Ok(true);
    }

    let needle = input.to_lowercase();
    let found = values.iter().any(|v| v.to_lowercase() == needle);
    match filter.operator() {
        FilterOperator::Is | FilterOperator::IsAnyOf => Ok(found),
        FilterOperator::IsNot | FilterOperator::IsNoneOf => Ok(!found),
        other => Err(unsupported(other, ColumnDataType::Option)),
    }
}

/// Set comparison between a record's option values and the filter's.
///
/// Values compare case-insensitively, as in [`option_filter_fn`].
///
/// - `include`, `include any of`: the sets intersect
/// - `exclude`: the sets don't intersect
/// - `exclude if any of`: negation of `include any of`
/// - `include all of`: every filter value is on the record
/// - `exclude if all`: negation of `include all of`
pub fn multi_option_filter_fn<S: AsRef<str>>(input: &[S], filter: &FilterModel) -> Result<bool> {
    let FilterValues::MultiOption(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::MultiOption, filter));
    };
    operator_details(ColumnDataType::MultiOption, filter.operator())?;
    if values.is_empty() {
        return Ok(true);
    }

    let record: HashSet<String> = input.iter().map(|v| v.as_ref().to_lowercase()).collect();
    let wanted = dedup(values.iter().map(|v| v.to_lowercase()).collect());
    let hits = wanted.iter().filter(|v| record.contains(*v)).count();

    use FilterOperator as Op;
    match filter.operator() {
        Op::Include | Op::IncludeAnyOf => Ok(hits > 0),
        Op::Exclude | Op::ExcludeIfAnyOf => Ok(hits == 0),
        Op::IncludeAllOf => Ok(hits == wanted.len()),
        Op::ExcludeIfAll => Ok(hits != wanted.len()),
        other => Err(unsupported(other, ColumnDataType::MultiOption)),
    }
}

/// Equality against a single boolean.
pub fn boolean_filter_fn(input: bool, filter: &FilterModel) -> Result<bool> {
    let FilterValues::Boolean(values) = filter.values() else {
        return Err(values_mismatch(ColumnDataType::Boolean, filter));
    };
    let details = operator_details(ColumnDataType::Boolean, filter.operator())?;
    let Some(operand) = Operand::from_values(details, values.as_slice())? else {
        return Ok(true);
    };

    match (filter.operator(), operand) {
        (FilterOperator::Is, Operand::Single(v)) => Ok(input == v),
        (FilterOperator::IsNot, Operand::Single(v)) => Ok(input != v),
        (other, _) => Err(unsupported(other, ColumnDataType::Boolean)),
    }
}

/// Returns `true` when `filter` matches every record regardless of value.
pub fn is_vacuous(filter: &FilterModel) -> bool {
    match filter.values() {
        FilterValues::Text(values) => values.first().map_or(true, |s| s.trim().is_empty()),
        values => values.is_empty(),
    }
}

/// Evaluates `filter` against a field value, dispatching on the filter type.
///
/// Option values may be raw strings or [`Value::Option`]; a missing value
/// only matches a vacuous filter.
pub fn matches_value(value: &Value, filter: &FilterModel) -> Result<bool> {
    if is_vacuous(filter) {
        return Ok(true);
    }

    match (filter.data_type(), value) {
        (_, Value::None) => Ok(false),
        (ColumnDataType::Text, Value::String(s)) => text_filter_fn(s, filter),
        (ColumnDataType::Number, Value::Number(n)) => number_filter_fn(n.to_f64(), filter),
        (ColumnDataType::Date, Value::Date(d)) => date_filter_fn(*d, filter),
        (ColumnDataType::Boolean, Value::Bool(b)) => boolean_filter_fn(*b, filter),
        (ColumnDataType::Option, v) if v.option_key().is_some() => {
            option_filter_fn(v.option_key().unwrap_or_default(), filter)
        }
        (ColumnDataType::MultiOption, Value::List(items)) => {
            let keys = items
                .iter()
                .filter(|item| !item.is_none())
                .map(|item| {
                    item.option_key()
                        .ok_or_else(|| FilterError::type_mismatch("option value", item.kind()))
                })
                .collect::<Result<Vec<_>>>()?;
            multi_option_filter_fn(keys.as_slice(), filter)
        }
        (ColumnDataType::MultiOption, v) if v.option_key().is_some() => {
            multi_option_filter_fn(&[v.option_key().unwrap_or_default()], filter)
        }
        (data_type, v) => Err(FilterError::type_mismatch(
            format!("{data_type} value"),
            v.kind(),
        )),
    }
}

fn values_mismatch(expected: ColumnDataType, filter: &FilterModel) -> FilterError {
    FilterError::type_mismatch(
        format!("{expected} filter"),
        format!("{} filter", filter.data_type()),
    )
}

fn unsupported(operator: FilterOperator, data_type: ColumnDataType) -> FilterError {
    FilterError::operator_not_found(operator.as_str(), data_type)
}
