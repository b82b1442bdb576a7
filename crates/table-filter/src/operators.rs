//! Operator catalog.
//!
//! Every operator a filter can carry is listed here, one static table per
//! [`ColumnDataType`]. The tables are the single source of truth for an
//! operator's label, arity target and relations (negation, singular/plural
//! counterpart); nothing else in the crate hard-codes those relations.
//!
//! | Type | Single target | Multiple target |
//! |------|---------------|-----------------|
//! | text | `contains`, `does not contain` | |
//! | number | `is`, `is not`, `is greater than`, `is greater than or equal to`, `is less than`, `is less than or equal to` | `is between`, `is not between` |
//! | date | `is`, `is not`, `is before`, `is on or after`, `is after`, `is on or before` | `is between`, `is not between` |
//! | option | `is`, `is not` | `is any of`, `is none of` |
//! | multiOption | `include`, `exclude` | `include any of`, `exclude if all`, `include all of`, `exclude if any of` |
//! | boolean | `is`, `is not` | |

use std::fmt;

use crate::column::ColumnDataType;
use crate::error::{FilterError, Result};

/// A named comparison mode.
///
/// The same operator can appear in several type tables (`is` exists for
/// number, date, option and boolean columns); its meaning is always read
/// together with the column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    // Text
    Contains,
    DoesNotContain,

    // Shared scalar equality
    Is,
    IsNot,

    // Number comparisons
    IsGreaterThan,
    IsGreaterThanOrEqualTo,
    IsLessThan,
    IsLessThanOrEqualTo,

    // Date comparisons
    IsBefore,
    IsOnOrAfter,
    IsAfter,
    IsOnOrBefore,

    // Ranges
    IsBetween,
    IsNotBetween,

    // Option sets
    IsAnyOf,
    IsNoneOf,

    // Multi-option sets
    Include,
    Exclude,
    IncludeAnyOf,
    ExcludeIfAll,
    IncludeAllOf,
    ExcludeIfAnyOf,
}

impl FilterOperator {
    /// Every operator, in catalog order.
    pub const ALL: [FilterOperator; 22] = [
        FilterOperator::Contains,
        FilterOperator::DoesNotContain,
        FilterOperator::Is,
        FilterOperator::IsNot,
        FilterOperator::IsGreaterThan,
        FilterOperator::IsGreaterThanOrEqualTo,
        FilterOperator::IsLessThan,
        FilterOperator::IsLessThanOrEqualTo,
        FilterOperator::IsBefore,
        FilterOperator::IsOnOrAfter,
        FilterOperator::IsAfter,
        FilterOperator::IsOnOrBefore,
        FilterOperator::IsBetween,
        FilterOperator::IsNotBetween,
        FilterOperator::IsAnyOf,
        FilterOperator::IsNoneOf,
        FilterOperator::Include,
        FilterOperator::Exclude,
        FilterOperator::IncludeAnyOf,
        FilterOperator::ExcludeIfAll,
        FilterOperator::IncludeAllOf,
        FilterOperator::ExcludeIfAnyOf,
    ];

    /// Returns the canonical operator string.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "does not contain",
            FilterOperator::Is => "is",
            FilterOperator::IsNot => "is not",
            FilterOperator::IsGreaterThan => "is greater than",
            FilterOperator::IsGreaterThanOrEqualTo => "is greater than or equal to",
            FilterOperator::IsLessThan => "is less than",
            FilterOperator::IsLessThanOrEqualTo => "is less than or equal to",
            FilterOperator::IsBefore => "is before",
            FilterOperator::IsOnOrAfter => "is on or after",
            FilterOperator::IsAfter => "is after",
            FilterOperator::IsOnOrBefore => "is on or before",
            FilterOperator::IsBetween => "is between",
            FilterOperator::IsNotBetween => "is not between",
            FilterOperator::IsAnyOf => "is any of",
            FilterOperator::IsNoneOf => "is none of",
            FilterOperator::Include => "include",
            FilterOperator::Exclude => "exclude",
            FilterOperator::IncludeAnyOf => "include any of",
            FilterOperator::ExcludeIfAll => "exclude if all",
            FilterOperator::IncludeAllOf => "include all of",
            FilterOperator::ExcludeIfAnyOf => "exclude if any of",
        }
    }

    /// Parses an operator string in the context of a column type.
    ///
    /// Fails with [`FilterError::OperatorNotFound`] when the string is not an
    /// operator at all, or is one that the type's table doesn't list.
    pub fn parse(data_type: ColumnDataType, s: &str) -> Result<FilterOperator> {
        let op = FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterError::operator_not_found(s, data_type))?;
        operator_details(data_type, op).map(|details| details.value)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an operator compares against one value or a set/range of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorTarget {
    Single,
    Multiple,
}

impl OperatorTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorTarget::Single => "single",
            OperatorTarget::Multiple => "multiple",
        }
    }
}

/// Catalog entry for one operator of one column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDetails {
    /// Human label shown in operator pickers.
    pub label: &'static str,
    /// The operator this entry describes.
    pub value: FilterOperator,
    /// Arity target.
    pub target: OperatorTarget,
    /// On a single-target entry: the multiple-target operator to promote to.
    pub singular_of: Option<FilterOperator>,
    /// On a multiple-target entry: the single-target operator to demote to.
    pub plural_of: Option<FilterOperator>,
    /// Operators offered as alternatives to this one.
    pub relative_of: &'static [FilterOperator],
    /// Whether this operator inverts a positive test.
    pub is_negated: bool,
    /// The operator that negates this one.
    pub negation: Option<FilterOperator>,
    /// The operator this one negates.
    pub negation_of: Option<FilterOperator>,
}

impl OperatorDetails {
    const fn single(value: FilterOperator, label: &'static str) -> Self {
        OperatorDetails {
            label,
            value,
            target: OperatorTarget::Single,
            singular_of: None,
            plural_of: None,
            relative_of: &[],
            is_negated: false,
            negation: None,
            negation_of: None,
        }
    }

    const fn multiple(value: FilterOperator, label: &'static str) -> Self {
        OperatorDetails {
            target: OperatorTarget::Multiple,
            ..OperatorDetails::single(value, label)
        }
    }

    const fn promotes_to(self, op: FilterOperator) -> Self {
        OperatorDetails {
            singular_of: Some(op),
            ..self
        }
    }

    const fn demotes_to(self, op: FilterOperator) -> Self {
        OperatorDetails {
            plural_of: Some(op),
            ..self
        }
    }

    const fn relatives(self, ops: &'static [FilterOperator]) -> Self {
        OperatorDetails {
            relative_of: ops,
            ..self
        }
    }

    const fn negated_by(self, op: FilterOperator) -> Self {
        OperatorDetails {
            negation: Some(op),
            ..self
        }
    }

    const fn negates(self, op: FilterOperator) -> Self {
        OperatorDetails {
            is_negated: true,
            negation_of: Some(op),
            ..self
        }
    }
}

use FilterOperator as Op;

const NUMBER_SCALARS: &[FilterOperator] = &[
    Op::Is,
    Op::IsNot,
    Op::IsGreaterThan,
    Op::IsGreaterThanOrEqualTo,
    Op::IsLessThan,
    Op::IsLessThanOrEqualTo,
];

const DATE_SCALARS: &[FilterOperator] = &[
    Op::Is,
    Op::IsNot,
    Op::IsBefore,
    Op::IsOnOrAfter,
    Op::IsAfter,
    Op::IsOnOrBefore,
];

pub static TEXT_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Contains, "contains")
        .relatives(&[Op::DoesNotContain])
        .negated_by(Op::DoesNotContain),
    OperatorDetails::single(Op::DoesNotContain, "does not contain")
        .relatives(&[Op::Contains])
        .negates(Op::Contains),
];

pub static NUMBER_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Is, "is")
        .promotes_to(Op::IsBetween)
        .relatives(NUMBER_SCALARS)
        .negated_by(Op::IsNot),
    OperatorDetails::single(Op::IsNot, "is not")
        .promotes_to(Op::IsNotBetween)
        .relatives(NUMBER_SCALARS)
        .negates(Op::Is),
    OperatorDetails::single(Op::IsGreaterThan, "is greater than")
        .promotes_to(Op::IsBetween)
        .relatives(NUMBER_SCALARS)
        .negated_by(Op::IsLessThanOrEqualTo),
    OperatorDetails::single(Op::IsGreaterThanOrEqualTo, "is greater than or equal to")
        .promotes_to(Op::IsBetween)
        .relatives(NUMBER_SCALARS)
        .negated_by(Op::IsLessThan),
    OperatorDetails::single(Op::IsLessThan, "is less than")
        .promotes_to(Op::IsBetween)
        .relatives(NUMBER_SCALARS)
        .negated_by(Op::IsGreaterThanOrEqualTo),
    OperatorDetails::single(Op::IsLessThanOrEqualTo, "is less than or equal to")
        .promotes_to(Op::IsBetween)
        .relatives(NUMBER_SCALARS)
        .negated_by(Op::IsGreaterThan),
    OperatorDetails::multiple(Op::IsBetween, "is between")
        .demotes_to(Op::Is)
        .relatives(&[Op::IsNotBetween])
        .negated_by(Op::IsNotBetween),
    OperatorDetails::multiple(Op::IsNotBetween, "is not between")
        .demotes_to(Op::IsNot)
        .relatives(&[Op::IsBetween])
        .negates(Op::IsBetween),
];

pub static DATE_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Is, "is")
        .promotes_to(Op::IsBetween)
        .relatives(DATE_SCALARS)
        .negated_by(Op::IsNot),
    OperatorDetails::single(Op::IsNot, "is not")
        .promotes_to(Op::IsNotBetween)
        .relatives(DATE_SCALARS)
        .negates(Op::Is),
    OperatorDetails::single(Op::IsBefore, "is before")
        .promotes_to(Op::IsBetween)
        .relatives(DATE_SCALARS)
        .negated_by(Op::IsOnOrAfter),
    OperatorDetails::single(Op::IsOnOrAfter, "is on or after")
        .promotes_to(Op::IsBetween)
        .relatives(DATE_SCALARS)
        .negated_by(Op::IsBefore),
    OperatorDetails::single(Op::IsAfter, "is after")
        .promotes_to(Op::IsBetween)
        .relatives(DATE_SCALARS)
        .negated_by(Op::IsOnOrBefore),
    OperatorDetails::single(Op::IsOnOrBefore, "is on or before")
        .promotes_to(Op::IsBetween)
        .relatives(DATE_SCALARS)
        .negated_by(Op::IsAfter),
    OperatorDetails::multiple(Op::IsBetween, "is between")
        .demotes_to(Op::Is)
        .relatives(&[Op::IsNotBetween])
        .negated_by(Op::IsNotBetween),
    OperatorDetails::multiple(Op::IsNotBetween, "is not between")
        .demotes_to(Op::IsNot)
        .relatives(&[Op::IsBetween])
        .negates(Op::IsBetween),
];

pub static OPTION_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Is, "is")
        .promotes_to(Op::IsAnyOf)
        .relatives(&[Op::IsNot])
        .negated_by(Op::IsNot),
    OperatorDetails::single(Op::IsNot, "is not")
        .promotes_to(Op::IsNoneOf)
        .relatives(&[Op::Is])
        .negates(Op::Is),
    OperatorDetails::multiple(Op::IsAnyOf, "is any of")
        .demotes_to(Op::Is)
        .relatives(&[Op::IsNoneOf])
        .negated_by(Op::IsNoneOf),
    OperatorDetails::multiple(Op::IsNoneOf, "is none of")
        .demotes_to(Op::IsNot)
        .relatives(&[Op::IsAnyOf])
        .negates(Op::IsAnyOf),
];

pub static MULTI_OPTION_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Include, "include")
        .promotes_to(Op::IncludeAnyOf)
        .relatives(&[Op::Exclude])
        .negated_by(Op::Exclude),
    OperatorDetails::single(Op::Exclude, "exclude")
        .promotes_to(Op::ExcludeIfAnyOf)
        .relatives(&[Op::Include])
        .negates(Op::Include),
    OperatorDetails::multiple(Op::IncludeAnyOf, "include any of")
        .demotes_to(Op::Include)
        .relatives(&[Op::ExcludeIfAll, Op::IncludeAllOf, Op::ExcludeIfAnyOf])
        .negated_by(Op::ExcludeIfAnyOf),
    OperatorDetails::multiple(Op::ExcludeIfAll, "exclude if all")
        .demotes_to(Op::Exclude)
        .relatives(&[Op::IncludeAnyOf, Op::IncludeAllOf, Op::ExcludeIfAnyOf])
        .negates(Op::IncludeAllOf),
    OperatorDetails::multiple(Op::IncludeAllOf, "include all of")
        .demotes_to(Op::Include)
        .relatives(&[Op::IncludeAnyOf, Op::ExcludeIfAll, Op::ExcludeIfAnyOf])
        .negated_by(Op::ExcludeIfAll),
    OperatorDetails::multiple(Op::ExcludeIfAnyOf, "exclude if any of")
        .demotes_to(Op::Exclude)
        .relatives(&[Op::IncludeAnyOf, Op::ExcludeIfAll, Op::IncludeAllOf])
        .negates(Op::IncludeAnyOf),
];

pub static BOOLEAN_OPERATORS: &[OperatorDetails] = &[
    OperatorDetails::single(Op::Is, "is")
        .relatives(&[Op::IsNot])
        .negated_by(Op::IsNot),
    OperatorDetails::single(Op::IsNot, "is not")
        .relatives(&[Op::Is])
        .negates(Op::Is),
];

/// Returns the operator table for a column type.
pub fn operators_for(data_type: ColumnDataType) -> &'static [OperatorDetails] {
    match data_type {
        ColumnDataType::Text => TEXT_OPERATORS,
        ColumnDataType::Number => NUMBER_OPERATORS,
        ColumnDataType::Date => DATE_OPERATORS,
        ColumnDataType::Option => OPTION_OPERATORS,
        ColumnDataType::MultiOption => MULTI_OPTION_OPERATORS,
        ColumnDataType::Boolean => BOOLEAN_OPERATORS,
    }
}

/// Looks up the catalog entry for `operator` on columns of `data_type`.
pub fn operator_details(
    data_type: ColumnDataType,
    operator: FilterOperator,
) -> Result<&'static OperatorDetails> {
    operators_for(data_type)
        .iter()
        .find(|details| details.value == operator)
        .ok_or_else(|| FilterError::operator_not_found(operator.as_str(), data_type))
}

/// Returns the operators of `data_type` with the given arity target.
pub fn operators_with_target(
    data_type: ColumnDataType,
    target: OperatorTarget,
) -> impl Iterator<Item = &'static OperatorDetails> {
    operators_for(data_type)
        .iter()
        .filter(move |details| details.target == target)
}

/// Operators a new filter starts with, by the number of initial values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultOperators {
    pub single: FilterOperator,
    pub multiple: FilterOperator,
}

impl DefaultOperators {
    /// Picks the default for a filter created with `count` values.
    pub fn for_count(self, count: usize) -> FilterOperator {
        if count > 1 {
            self.multiple
        } else {
            self.single
        }
    }
}

/// Default operators per column type.
pub fn default_operators(data_type: ColumnDataType) -> DefaultOperators {
    let (single, multiple) = match data_type {
        ColumnDataType::Text => (Op::Contains, Op::Contains),
        ColumnDataType::Number => (Op::Is, Op::IsBetween),
        ColumnDataType::Date => (Op::Is, Op::IsBetween),
        ColumnDataType::Option => (Op::Is, Op::IsAnyOf),
        ColumnDataType::MultiOption => (Op::Include, Op::IncludeAnyOf),
        ColumnDataType::Boolean => (Op::Is, Op::Is),
    };
    DefaultOperators { single, multiple }
}
