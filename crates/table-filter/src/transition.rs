//! Operator promotion and demotion.
//!
//! When a filter's value count crosses the single/multiple boundary the
//! operator moves to its counterpart in the catalog: selecting a second
//! status turns `is` into `is any of`, deselecting back to one turns it back.

use crate::column::ColumnDataType;
use crate::error::Result;
use crate::filter::FilterValues;
use crate::operators::{operator_details, FilterOperator};

/// Computes the operator that applies after the values change from
/// `old_values` to `new_values`.
///
/// The operator is kept when both sides are on the same side of the 1/2
/// boundary. Growing past it follows the current operator's `singular_of`
/// link, shrinking below it follows `plural_of`; a missing link keeps the
/// current operator.
pub fn determine_new_operator(
    data_type: ColumnDataType,
    old_values: &FilterValues,
    new_values: &FilterValues,
    current: FilterOperator,
) -> Result<FilterOperator> {
    resolve_by_count(data_type, old_values.len(), new_values.len(), current)
}

/// [`determine_new_operator`] on plain value counts.
pub fn resolve_by_count(
    data_type: ColumnDataType,
    old_count: usize,
    new_count: usize,
    current: FilterOperator,
) -> Result<FilterOperator> {
    let details = operator_details(data_type, current)?;

    let (a, b) = (old_count, new_count);
    if a == b || (a >= 2 && b >= 2) || (a <= 1 && b <= 1) {
        return Ok(current);
    }

    if a < b {
        Ok(details.singular_of.unwrap_or(current))
    } else {
        Ok(details.plural_of.unwrap_or(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn same_side_keeps_operator() {
        let op = determine_new_operator(
            ColumnDataType::Text,
            &FilterValues::text(["a"]),
            &FilterValues::text(["b"]),
            FilterOperator::Contains,
        )
        .unwrap();
        assert_eq!(op, FilterOperator::Contains);

        assert_eq!(
            resolve_by_count(ColumnDataType::Option, 2, 5, FilterOperator::IsNoneOf).unwrap(),
            FilterOperator::IsNoneOf
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::Option, 0, 1, FilterOperator::Is).unwrap(),
            FilterOperator::Is
        );
    }

    #[test]
    fn growing_promotes() {
        assert_eq!(
            resolve_by_count(ColumnDataType::Option, 1, 2, FilterOperator::Is).unwrap(),
            FilterOperator::IsAnyOf
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::Option, 1, 2, FilterOperator::IsNot).unwrap(),
            FilterOperator::IsNoneOf
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::MultiOption, 1, 3, FilterOperator::Exclude).unwrap(),
            FilterOperator::ExcludeIfAnyOf
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::Number, 1, 2, FilterOperator::IsNot).unwrap(),
            FilterOperator::IsNotBetween
        );
    }

    #[test]
    fn shrinking_demotes() {
        assert_eq!(
            resolve_by_count(ColumnDataType::Option, 2, 1, FilterOperator::IsAnyOf).unwrap(),
            FilterOperator::Is
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::MultiOption, 3, 1, FilterOperator::IncludeAllOf)
                .unwrap(),
            FilterOperator::Include
        );
        assert_eq!(
            resolve_by_count(ColumnDataType::Date, 2, 1, FilterOperator::IsNotBetween).unwrap(),
            FilterOperator::IsNot
        );
    }

    #[test]
    fn missing_link_keeps_operator() {
        assert_eq!(
            resolve_by_count(ColumnDataType::Text, 1, 2, FilterOperator::Contains).unwrap(),
            FilterOperator::Contains
        );
    }

    #[test]
    fn unknown_operator_fails() {
        let err = resolve_by_count(ColumnDataType::Text, 1, 2, FilterOperator::Is).unwrap_err();
        assert!(matches!(err, FilterError::OperatorNotFound { .. }));
    }
}
